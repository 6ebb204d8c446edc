//! Optional referential-integrity check for callers that want strict input.
//!
//! The engine itself never calls this; it silently skips dangling references.

use std::collections::HashSet;

use crate::errors::{CheckIssue, CheckReport};
use crate::model::RetentionInputs;

/// Check ids and cross references across the four collections.
///
/// Duplicate ids are errors. Dangling references are warnings, and fail the
/// report only when `strict` is set.
pub fn check(inputs: &RetentionInputs, strict: bool) -> CheckReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let project_ids = unique_ids(
        "projects",
        inputs.projects.iter().map(|p| p.id.as_str()),
        &mut errors,
    );
    let environment_ids = unique_ids(
        "environments",
        inputs.environments.iter().map(|e| e.id.as_str()),
        &mut errors,
    );
    let release_ids = unique_ids(
        "releases",
        inputs.releases.iter().map(|r| r.id.as_str()),
        &mut errors,
    );
    unique_ids(
        "deployments",
        inputs.deployments.iter().map(|d| d.id.as_str()),
        &mut errors,
    );

    for (i, release) in inputs.releases.iter().enumerate() {
        if !project_ids.contains(release.project_id.as_str()) {
            warnings.push(CheckIssue {
                code: "W001".to_string(),
                check: "reference".to_string(),
                message: format!(
                    "release '{}' references unknown project '{}'",
                    release.id, release.project_id
                ),
                path: Some(format!("$.releases[{i}].ProjectId")),
            });
        }
    }

    for (i, deployment) in inputs.deployments.iter().enumerate() {
        if !release_ids.contains(deployment.release_id.as_str()) {
            warnings.push(CheckIssue {
                code: "W002".to_string(),
                check: "reference".to_string(),
                message: format!(
                    "deployment '{}' references unknown release '{}'",
                    deployment.id, deployment.release_id
                ),
                path: Some(format!("$.deployments[{i}].ReleaseId")),
            });
        }
        if !environment_ids.contains(deployment.environment_id.as_str()) {
            warnings.push(CheckIssue {
                code: "W003".to_string(),
                check: "reference".to_string(),
                message: format!(
                    "deployment '{}' references unknown environment '{}'",
                    deployment.id, deployment.environment_id
                ),
                path: Some(format!("$.deployments[{i}].EnvironmentId")),
            });
        }
    }

    let pass = errors.is_empty() && (!strict || warnings.is_empty());
    CheckReport {
        pass,
        errors,
        warnings,
    }
}

fn unique_ids<'a>(
    collection: &str,
    ids: impl Iterator<Item = &'a str>,
    errors: &mut Vec<CheckIssue>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    for (i, id) in ids.enumerate() {
        if !seen.insert(id) {
            errors.push(CheckIssue {
                code: "E001".to_string(),
                check: "identity".to_string(),
                message: format!("duplicate id '{id}' in {collection}"),
                path: Some(format!("$.{collection}[{i}].Id")),
            });
        }
    }
    seen
}
