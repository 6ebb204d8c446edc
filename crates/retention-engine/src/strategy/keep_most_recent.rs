use std::collections::HashSet;

use retention_core::errors::RetentionError;
use retention_core::traits::{notify, KeptReleaseEvent, RetentionObserver, RetentionStrategy};
use retention_core::{Deployment, Environment, Project, Release, ReleaseSet};
use tracing::debug;

/// Keeps the releases behind the `N` most recent deployments in a scope.
///
/// The cut is taken over deployment records, not distinct releases: a release
/// redeployed within the top `N` occupies more than one slot, so fewer than
/// `N` distinct releases may be kept. Deployments with equal timestamps keep
/// their input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepMostRecentStrategy {
    num_to_keep: usize,
}

impl KeepMostRecentStrategy {
    pub const NAME: &'static str = "keep_most_recent";

    pub fn new(num_to_keep: usize) -> Self {
        Self { num_to_keep }
    }

    pub fn num_to_keep(&self) -> usize {
        self.num_to_keep
    }
}

impl TryFrom<i64> for KeepMostRecentStrategy {
    type Error = RetentionError;

    fn try_from(count: i64) -> Result<Self, Self::Error> {
        usize::try_from(count)
            .map(Self::new)
            .map_err(|_| RetentionError::InvalidKeepCount(count))
    }
}

impl RetentionStrategy for KeepMostRecentStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn determine_releases_to_keep(
        &self,
        project: &Project,
        environment: &Environment,
        releases: &[Release],
        deployments: &[Deployment],
        observer: Option<&dyn RetentionObserver>,
    ) -> ReleaseSet {
        if self.num_to_keep == 0 {
            return ReleaseSet::new();
        }

        let known: HashSet<&str> = releases.iter().map(|r| r.id.as_str()).collect();
        let mut candidates: Vec<&Deployment> = deployments
            .iter()
            .filter(|d| known.contains(d.release_id.as_str()))
            .collect();

        // sort_by is stable: ties stay in input order.
        candidates.sort_by(|a, b| b.deployed_at.cmp(&a.deployed_at));

        let recent: HashSet<&str> = candidates
            .iter()
            .take(self.num_to_keep)
            .map(|d| d.release_id.as_str())
            .collect();

        let mut kept = ReleaseSet::new();
        for release in releases.iter().filter(|r| recent.contains(r.id.as_str())) {
            if kept.insert(release.clone()) {
                notify(observer, || {
                    KeptReleaseEvent::new(Self::NAME, project, environment, release)
                });
            }
        }

        debug!(
            project = %project.id,
            environment = %environment.id,
            candidates = candidates.len(),
            kept = kept.len(),
            "keep_most_recent evaluated scope"
        );
        kept
    }
}
