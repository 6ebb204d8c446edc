use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use retention_core::errors::RetentionError;
use retention_core::traits::{notify, KeptReleaseEvent, RetentionObserver, RetentionStrategy};
use retention_core::{Deployment, Environment, Project, Release, ReleaseSet};
use tracing::debug;

/// Keeps every release deployed to the scope within a time window ending at
/// a fixed reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepDeployedWithinStrategy {
    cutoff: DateTime<Utc>,
}

impl KeepDeployedWithinStrategy {
    pub const NAME: &'static str = "keep_deployed_within";

    /// Window of `days` before `now`. Negative windows are rejected.
    pub fn new(days: i64, now: DateTime<Utc>) -> Result<Self, RetentionError> {
        if days < 0 {
            return Err(RetentionError::InvalidWindow(days));
        }
        let cutoff = Duration::try_days(days)
            .and_then(|window| now.checked_sub_signed(window))
            .ok_or(RetentionError::WindowOutOfRange(days))?;
        Ok(Self { cutoff })
    }

    /// Deployments at or after this instant are inside the window.
    pub fn cutoff(&self) -> DateTime<Utc> {
        self.cutoff
    }
}

impl RetentionStrategy for KeepDeployedWithinStrategy {
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
        let known: HashSet<&str> = releases.iter().map(|r| r.id.as_str()).collect();
        let recent: HashSet<&str> = deployments
            .iter()
            .filter(|d| known.contains(d.release_id.as_str()) && d.deployed_at >= self.cutoff)
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
            cutoff = %self.cutoff,
            kept = kept.len(),
            "keep_deployed_within evaluated scope"
        );
        kept
    }
}
