//! Loading entity collections from JSON files.
//!
//! Failures never escape as errors: each collection resolves to a
//! [`LoadOutcome`], and callers that only want data take
//! [`LoadOutcome::into_items`], which degrades a failure to an empty
//! collection.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::errors::LoadError;
use crate::model::{Deployment, Environment, Project, Release, RetentionInputs};
use crate::schema::{self, SchemaKind};

/// An entity type that can be loaded from a JSON array file.
pub trait Loadable: DeserializeOwned {
    const KIND: SchemaKind;
}

impl Loadable for Project {
    const KIND: SchemaKind = SchemaKind::Projects;
}

impl Loadable for Environment {
    const KIND: SchemaKind = SchemaKind::Environments;
}

impl Loadable for Release {
    const KIND: SchemaKind = SchemaKind::Releases;
}

impl Loadable for Deployment {
    const KIND: SchemaKind = SchemaKind::Deployments;
}

/// Result of loading one collection.
#[derive(Debug, Clone)]
pub enum LoadOutcome<T> {
    Loaded(Vec<T>),
    Failed(LoadError),
}

impl<T> LoadOutcome<T> {
    pub fn is_failed(&self) -> bool {
        matches!(self, LoadOutcome::Failed(_))
    }

    pub fn error(&self) -> Option<&LoadError> {
        match self {
            LoadOutcome::Loaded(_) => None,
            LoadOutcome::Failed(e) => Some(e),
        }
    }

    pub fn items(&self) -> &[T] {
        match self {
            LoadOutcome::Loaded(items) => items,
            LoadOutcome::Failed(_) => &[],
        }
    }

    /// The loaded items, or an empty collection if loading failed.
    pub fn into_items(self) -> Vec<T> {
        match self {
            LoadOutcome::Loaded(items) => items,
            LoadOutcome::Failed(e) => {
                log_degraded(&e);
                Vec::new()
            }
        }
    }

    fn split(self) -> (Vec<T>, Option<LoadError>) {
        match self {
            LoadOutcome::Loaded(items) => (items, None),
            LoadOutcome::Failed(e) => {
                log_degraded(&e);
                (Vec::new(), Some(e))
            }
        }
    }
}

fn log_degraded(e: &LoadError) {
    warn!(
        path = e.path(),
        error = %e,
        "collection failed to load, using empty collection"
    );
}

/// Load one collection: read, parse, validate against the embedded schema,
/// then deserialize.
pub fn load_collection<T: Loadable>(path: impl AsRef<Path>) -> LoadOutcome<T> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            return LoadOutcome::Failed(LoadError::Read {
                path: display,
                reason: e.to_string(),
            })
        }
    };
    parse_collection(&display, &content)
}

/// Parse one collection from an in-memory JSON document. `origin` names the
/// source in any error.
pub fn parse_collection<T: Loadable>(origin: &str, content: &str) -> LoadOutcome<T> {
    let data: Value = match serde_json::from_str(content) {
        Ok(v) => v,
        Err(e) => {
            return LoadOutcome::Failed(LoadError::Parse {
                path: origin.to_string(),
                reason: e.to_string(),
            })
        }
    };

    match schema::violations(T::KIND, &data) {
        Ok(msgs) if msgs.is_empty() => {}
        Ok(msgs) => {
            return LoadOutcome::Failed(LoadError::Schema {
                path: origin.to_string(),
                reason: msgs.join("\n"),
            })
        }
        Err(e) => {
            return LoadOutcome::Failed(LoadError::Schema {
                path: origin.to_string(),
                reason: e.to_string(),
            })
        }
    }

    // Schema-valid data can still carry a malformed timestamp.
    match serde_json::from_value(data) {
        Ok(items) => LoadOutcome::Loaded(items),
        Err(e) => LoadOutcome::Failed(LoadError::Parse {
            path: origin.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Locations of the four input collections.
#[derive(Debug, Clone)]
pub struct InputPaths {
    pub projects: PathBuf,
    pub environments: PathBuf,
    pub releases: PathBuf,
    pub deployments: PathBuf,
}

impl InputPaths {
    /// Conventional file names inside one directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            projects: dir.join("Projects.json"),
            environments: dir.join("Environments.json"),
            releases: dir.join("Releases.json"),
            deployments: dir.join("Deployments.json"),
        }
    }
}

/// All four collections plus the failures that were replaced by empty ones.
#[derive(Debug, Clone, Default)]
pub struct LoadedInputs {
    pub inputs: RetentionInputs,
    pub failures: Vec<LoadError>,
}

impl LoadedInputs {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub fn load_inputs(paths: &InputPaths) -> LoadedInputs {
    let mut failures = Vec::new();
    let mut take = |err: Option<LoadError>| failures.extend(err);

    let (projects, e) = load_collection::<Project>(&paths.projects).split();
    take(e);
    let (environments, e) = load_collection::<Environment>(&paths.environments).split();
    take(e);
    let (releases, e) = load_collection::<Release>(&paths.releases).split();
    take(e);
    let (deployments, e) = load_collection::<Deployment>(&paths.deployments).split();
    take(e);

    LoadedInputs {
        inputs: RetentionInputs {
            projects,
            environments,
            releases,
            deployments,
        },
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Projects.json");
        std::fs::write(&path, r#"[{"Id":"Project-1","Name":"Random Quotes"}]"#).unwrap();

        let outcome = load_collection::<Project>(&path);
        assert!(!outcome.is_failed());
        assert_eq!(outcome.items().len(), 1);
        assert_eq!(outcome.items()[0].name, "Random Quotes");
    }

    #[test]
    fn missing_file_is_read_failure() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = load_collection::<Release>(dir.path().join("nope.json"));
        assert!(matches!(outcome.error(), Some(LoadError::Read { .. })));
        assert!(outcome.into_items().is_empty());
    }

    #[test]
    fn malformed_json_is_parse_failure() {
        let outcome = parse_collection::<Environment>("inline", "[{not json");
        assert!(matches!(outcome.error(), Some(LoadError::Parse { .. })));
    }

    #[test]
    fn schema_violation_is_schema_failure() {
        let outcome = parse_collection::<Deployment>(
            "inline",
            r#"[{"Id":"D1","ReleaseId":"R1","DeployedAt":"2024-01-01T10:00:00"}]"#,
        );
        match outcome.error() {
            Some(LoadError::Schema { reason, .. }) => assert!(reason.contains("EnvironmentId")),
            other => panic!("expected schema failure, got {other:?}"),
        }
    }

    #[test]
    fn lower_case_fields_fail_schema() {
        let outcome = parse_collection::<Project>("inline", r#"[{"id":"P1","name":"One"}]"#);
        assert!(matches!(outcome.error(), Some(LoadError::Schema { .. })));
    }

    #[test]
    fn bad_timestamp_is_parse_failure() {
        let outcome = parse_collection::<Deployment>(
            "inline",
            r#"[{"Id":"D1","ReleaseId":"R1","EnvironmentId":"E1","DeployedAt":"soon"}]"#,
        );
        assert!(matches!(outcome.error(), Some(LoadError::Parse { .. })));
    }

    #[test]
    fn loads_deployments_with_mixed_iso_forms() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Deployments.json");
        std::fs::write(
            &path,
            r#"[
                {"Id":"D1","ReleaseId":"R1","EnvironmentId":"E1","DeployedAt":"2024-01-01 10:00:00"},
                {"Id":"D2","ReleaseId":"R1","EnvironmentId":"E1","DeployedAt":"2024-01-02T11:30"},
                {"Id":"D3","ReleaseId":"R2","EnvironmentId":"E1","DeployedAt":"2024-01-03"},
                {"Id":"D4","ReleaseId":"R2","EnvironmentId":"E1","DeployedAt":"2024-01-04T09:00:00Z"}
            ]"#,
        )
        .unwrap();

        let outcome = load_collection::<Deployment>(&path);
        assert!(!outcome.is_failed(), "{:?}", outcome.error());
        let hours: Vec<_> = outcome
            .items()
            .iter()
            .map(|d| d.deployed_at.format("%d %H:%M").to_string())
            .collect();
        assert_eq!(hours, vec!["01 10:00", "02 11:30", "03 00:00", "04 09:00"]);
    }

    #[test]
    fn load_inputs_degrades_per_collection() {
        let dir = tempfile::tempdir().unwrap();
        let paths = InputPaths::in_dir(dir.path());
        std::fs::write(&paths.projects, r#"[{"Id":"P1","Name":"One"}]"#).unwrap();
        std::fs::write(&paths.environments, r#"[{"Id":"E1","Name":"Production"}]"#).unwrap();
        std::fs::write(&paths.releases, "garbage").unwrap();
        // deployments file missing

        let loaded = load_inputs(&paths);
        assert!(!loaded.is_complete());
        assert_eq!(loaded.failures.len(), 2);
        assert_eq!(loaded.inputs.projects.len(), 1);
        assert_eq!(loaded.inputs.environments.len(), 1);
        assert!(loaded.inputs.releases.is_empty());
        assert!(loaded.inputs.deployments.is_empty());
    }
}
