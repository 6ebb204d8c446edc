use serde::{Deserialize, Serialize};

use crate::model::{Deployment, Environment, Project, Release};
use crate::set::ReleaseSet;

/// Notification that a strategy decided to keep a release in one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeptReleaseEvent {
    pub strategy: String,
    pub project_id: String,
    pub project_name: String,
    pub environment_id: String,
    pub environment_name: String,
    pub release_id: String,
    pub release_version: String,
}

impl KeptReleaseEvent {
    pub fn new(
        strategy: &str,
        project: &Project,
        environment: &Environment,
        release: &Release,
    ) -> Self {
        Self {
            strategy: strategy.to_string(),
            project_id: project.id.clone(),
            project_name: project.name.clone(),
            environment_id: environment.id.clone(),
            environment_name: environment.name.clone(),
            release_id: release.id.clone(),
            release_version: release.version.clone(),
        }
    }
}

/// Receives informational retention notifications.
///
/// Observers cannot fail and cannot influence the decision.
pub trait RetentionObserver: Sync {
    fn release_kept(&self, event: &KeptReleaseEvent);
}

impl<F> RetentionObserver for F
where
    F: Fn(&KeptReleaseEvent) + Sync,
{
    fn release_kept(&self, event: &KeptReleaseEvent) {
        self(event)
    }
}

/// Forward an event to the observer, if there is one.
pub fn notify(observer: Option<&dyn RetentionObserver>, event: impl FnOnce() -> KeptReleaseEvent) {
    if let Some(observer) = observer {
        observer.release_kept(&event());
    }
}

/// Decides which releases to keep within a single (project, environment) scope.
///
/// Callers pass only releases of `project` and only deployments targeting
/// `environment`. Implementations must still ignore any deployment whose
/// release is not in `releases`, and must return a subset of `releases`.
pub trait RetentionStrategy: Send + Sync {
    /// Short policy name used in logs, events and reports.
    fn name(&self) -> &str;

    fn determine_releases_to_keep(
        &self,
        project: &Project,
        environment: &Environment,
        releases: &[Release],
        deployments: &[Deployment],
        observer: Option<&dyn RetentionObserver>,
    ) -> ReleaseSet;
}
