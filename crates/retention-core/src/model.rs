use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A software project that owns releases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Project {
    pub id: String,
    pub name: String,
}

/// A deployment target such as "Staging" or "Production".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Environment {
    pub id: String,
    pub name: String,
}

/// A versioned build artifact belonging to exactly one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Release {
    pub id: String,
    pub version: String,
    pub project_id: String,
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,
}

/// One instant at which a release was deployed to one environment.
///
/// Deployments carry no project id; they belong to a project only through
/// the release they reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Deployment {
    pub id: String,
    pub release_id: String,
    pub environment_id: String,
    #[serde(with = "timestamp")]
    pub deployed_at: DateTime<Utc>,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl Environment {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

// Entity identity is the id alone; two values with the same id are the same entity.
macro_rules! identity_by_id {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl PartialEq for $ty {
                fn eq(&self, other: &Self) -> bool {
                    self.id == other.id
                }
            }

            impl Eq for $ty {}

            impl std::hash::Hash for $ty {
                fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                    self.id.hash(state);
                }
            }
        )+
    };
}

identity_by_id!(Project, Environment, Release, Deployment);

/// The four input collections the engine decides over.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetentionInputs {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub environments: Vec<Environment>,
    #[serde(default)]
    pub releases: Vec<Release>,
    #[serde(default)]
    pub deployments: Vec<Deployment>,
}

/// Serde adapter for timestamps.
///
/// Accepts RFC 3339 as well as zone-less ISO 8601, which is read as UTC:
/// `2024-01-01T10:00:00[.f]`, `2024-01-01 10:00:00[.f]`, `2024-01-01T10:00`
/// and a bare date (midnight). Always writes RFC 3339.
pub mod timestamp {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = raw.parse::<NaiveDateTime>() {
            return Some(naive.and_utc());
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(
        ts: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
    }
}
