use anyhow::{bail, Context, Result};
use jsonschema::Validator;
use serde_json::Value;

const SCHEMA_PROJECTS: &str = include_str!("../schema/project.schema.json");
const SCHEMA_ENVIRONMENTS: &str = include_str!("../schema/environment.schema.json");
const SCHEMA_RELEASES: &str = include_str!("../schema/release.schema.json");
const SCHEMA_DEPLOYMENTS: &str = include_str!("../schema/deployment.schema.json");
const SCHEMA_CONFIG: &str = include_str!("../schema/config.schema.json");

/// Which embedded schema a document is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Projects,
    Environments,
    Releases,
    Deployments,
    Config,
}

impl SchemaKind {
    fn source(self) -> &'static str {
        match self {
            SchemaKind::Projects => SCHEMA_PROJECTS,
            SchemaKind::Environments => SCHEMA_ENVIRONMENTS,
            SchemaKind::Releases => SCHEMA_RELEASES,
            SchemaKind::Deployments => SCHEMA_DEPLOYMENTS,
            SchemaKind::Config => SCHEMA_CONFIG,
        }
    }
}

/// Create a validator for the given document kind.
pub fn validator_for(kind: SchemaKind) -> Result<Validator> {
    let schema: Value =
        serde_json::from_str(kind.source()).context("embedded schema is invalid JSON")?;
    Validator::new(&schema).map_err(|e| anyhow::anyhow!("schema compilation failed: {e}"))
}

/// All schema violations of `data`, one `location: message` line each.
pub fn violations(kind: SchemaKind, data: &Value) -> Result<Vec<String>> {
    let v = validator_for(kind)?;
    Ok(v.iter_errors(data)
        .map(|error| {
            let path = error.instance_path.to_string();
            let loc = if path.is_empty() {
                "(root)".into()
            } else {
                path
            };
            format!("  {loc}: {error}")
        })
        .collect())
}

/// Validate a single document.
pub fn validate(kind: SchemaKind, data: &Value) -> Result<()> {
    let msgs = violations(kind, data)?;
    if msgs.is_empty() {
        return Ok(());
    }
    bail!("validation failed:\n{}", msgs.join("\n"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn embedded_schemas_compile() {
        for kind in [
            SchemaKind::Projects,
            SchemaKind::Environments,
            SchemaKind::Releases,
            SchemaKind::Deployments,
            SchemaKind::Config,
        ] {
            assert!(validator_for(kind).is_ok(), "{kind:?} schema must compile");
        }
    }

    #[test]
    fn valid_releases_pass() {
        let data = json!([
            {"Id": "R1", "Version": "1.0.0", "ProjectId": "P1", "Created": "2024-01-01T08:00:00"}
        ]);
        assert!(validate(SchemaKind::Releases, &data).is_ok());
    }

    #[test]
    fn missing_field_reports_location() {
        let data = json!([
            {"Id": "D1", "ReleaseId": "R1", "DeployedAt": "2024-01-01T10:00:00"}
        ]);
        let msgs = violations(SchemaKind::Deployments, &data).unwrap();
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("/0"), "expected item path in: {}", msgs[0]);
        assert!(msgs[0].contains("EnvironmentId"));
    }

    #[test]
    fn object_instead_of_array_fails() {
        let data = json!({"Id": "P1", "Name": "Project-1"});
        let err = validate(SchemaKind::Projects, &data).unwrap_err();
        assert!(err.to_string().contains("(root)"));
    }

    #[test]
    fn unknown_policy_kind_fails() {
        let data = json!({"policy": {"kind": "keep_everything"}});
        assert!(validate(SchemaKind::Config, &data).is_err());
    }
}
