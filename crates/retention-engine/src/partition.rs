//! Splitting the input collections into (project, environment) scopes.
//!
//! All filters preserve input order, which the tie-breaking of
//! [`crate::strategy::KeepMostRecentStrategy`] depends on.

use std::collections::{HashMap, HashSet};

use retention_core::{Deployment, Release};

/// Deployments targeting `environment_id` whose release is one of `releases`.
pub fn deployments_for_scope(
    deployments: &[Deployment],
    environment_id: &str,
    releases: &[Release],
) -> Vec<Deployment> {
    let release_ids: HashSet<&str> = releases.iter().map(|r| r.id.as_str()).collect();
    deployments
        .iter()
        .filter(|d| {
            d.environment_id == environment_id && release_ids.contains(d.release_id.as_str())
        })
        .cloned()
        .collect()
}

/// One (project, environment) slice of the inputs.
#[derive(Debug, Clone)]
pub struct Scope<'a> {
    pub releases: &'a [Release],
    pub deployments: Vec<Deployment>,
}

/// Inputs grouped once by project and by environment, so each pair is a
/// lookup plus an intersection instead of a scan over everything.
#[derive(Debug, Default)]
pub struct ScopeIndex {
    releases_by_project: HashMap<String, Vec<Release>>,
    deployments_by_environment: HashMap<String, Vec<Deployment>>,
}

impl ScopeIndex {
    pub fn build(releases: &[Release], deployments: &[Deployment]) -> Self {
        let mut releases_by_project: HashMap<String, Vec<Release>> = HashMap::new();
        for release in releases {
            releases_by_project
                .entry(release.project_id.clone())
                .or_default()
                .push(release.clone());
        }
        let mut deployments_by_environment: HashMap<String, Vec<Deployment>> = HashMap::new();
        for deployment in deployments {
            deployments_by_environment
                .entry(deployment.environment_id.clone())
                .or_default()
                .push(deployment.clone());
        }
        Self {
            releases_by_project,
            deployments_by_environment,
        }
    }

    pub fn releases(&self, project_id: &str) -> &[Release] {
        self.releases_by_project
            .get(project_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn scope(&self, project_id: &str, environment_id: &str) -> Scope<'_> {
        let releases = self.releases(project_id);
        let deployments = match self.deployments_by_environment.get(environment_id) {
            Some(env_deployments) if !releases.is_empty() => {
                deployments_for_scope(env_deployments, environment_id, releases)
            }
            _ => Vec::new(),
        };
        Scope {
            releases,
            deployments,
        }
    }
}
