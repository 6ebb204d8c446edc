use std::collections::HashSet;

use retention_core::{Release, ReleaseSet};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// What one (project, environment) scope contributed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeDecision {
    pub project_id: String,
    pub environment_id: String,
    /// Releases of the project.
    pub releases: usize,
    /// Deployments in scope after the release join.
    pub deployments: usize,
    pub kept: Vec<String>,
}

/// Keep/purge classification of every input release.
///
/// The engine only classifies; acting on `purge` is up to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct RetentionReport {
    pub strategy: String,
    pub keep: ReleaseSet,
    /// Releases not kept by any scope, in input order.
    pub purge: Vec<Release>,
    pub scopes: Vec<ScopeDecision>,
    pub fingerprint: String,
}

impl RetentionReport {
    pub fn new(
        strategy: &str,
        releases: &[Release],
        keep: ReleaseSet,
        scopes: Vec<ScopeDecision>,
    ) -> Self {
        let mut seen = HashSet::new();
        let purge = releases
            .iter()
            .filter(|r| !keep.contains(r) && seen.insert(r.id.as_str()))
            .cloned()
            .collect();
        let fingerprint = fingerprint(&keep);
        Self {
            strategy: strategy.to_string(),
            keep,
            purge,
            scopes,
            fingerprint,
        }
    }

    pub fn is_kept(&self, release_id: &str) -> bool {
        self.keep.contains_id(release_id)
    }
}

/// `sha256:<hex>` over the kept release ids in id order, newline separated.
pub fn fingerprint(keep: &ReleaseSet) -> String {
    let joined = keep.ids().collect::<Vec<_>>().join("\n");
    format!("sha256:{:x}", Sha256::digest(joined.as_bytes()))
}
