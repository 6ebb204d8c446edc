use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use retention_core::config::{load_config, RetentionConfig};
use retention_core::errors::RetentionError;
use retention_core::{
    Deployment, Environment, Project, Release, ReleaseSet, RetentionInputs, RetentionObserver,
    RetentionStrategy,
};
use tracing::{debug, info};

use crate::partition::{Scope, ScopeIndex};
use crate::report::{RetentionReport, ScopeDecision};
use crate::strategy;

/// Applies a retention strategy to every (project, environment) pair and
/// unions the per-pair results.
///
/// Pure over its inputs: nothing is mutated or deleted, and no state is
/// kept between calls.
pub struct RetentionService {
    strategy: Box<dyn RetentionStrategy>,
}

impl RetentionService {
    pub fn new<S: RetentionStrategy + 'static>(strategy: S) -> Self {
        Self {
            strategy: Box::new(strategy),
        }
    }

    pub fn from_boxed(strategy: Box<dyn RetentionStrategy>) -> Self {
        Self { strategy }
    }

    /// Build the service for a configured policy. `now` anchors time windows.
    pub fn from_config(
        config: &RetentionConfig,
        now: DateTime<Utc>,
    ) -> std::result::Result<Self, RetentionError> {
        strategy::from_config(&config.policy, now).map(Self::from_boxed)
    }

    /// Load a configuration file and build the service from it.
    pub fn from_config_file(path: &str, now: DateTime<Utc>) -> Result<Self> {
        let config = load_config(path)?;
        Self::from_config(&config, now).with_context(|| format!("{path}: invalid policy"))
    }

    pub fn strategy(&self) -> &dyn RetentionStrategy {
        self.strategy.as_ref()
    }

    /// Releases to keep across all projects and environments, deduplicated
    /// by release id.
    pub fn determine_releases_to_keep(
        &self,
        projects: &[Project],
        environments: &[Environment],
        releases: &[Release],
        deployments: &[Deployment],
        observer: Option<&dyn RetentionObserver>,
    ) -> ReleaseSet {
        let index = ScopeIndex::build(releases, deployments);
        let mut kept = ReleaseSet::new();
        for project in projects {
            for environment in environments {
                let (_, decided) = self.evaluate_scope(&index, project, environment, observer);
                kept.union(decided);
            }
        }
        self.log_summary(projects.len() * environments.len(), &kept);
        kept
    }

    /// Same result as [`Self::determine_releases_to_keep`], with pairs
    /// spread over up to `workers` threads. `0` is treated as `1`.
    pub fn determine_releases_to_keep_parallel(
        &self,
        projects: &[Project],
        environments: &[Environment],
        releases: &[Release],
        deployments: &[Deployment],
        observer: Option<&dyn RetentionObserver>,
        workers: usize,
    ) -> ReleaseSet {
        let index = ScopeIndex::build(releases, deployments);
        let pairs: Vec<(&Project, &Environment)> = projects
            .iter()
            .flat_map(|p| environments.iter().map(move |e| (p, e)))
            .collect();
        let workers = workers.clamp(1, pairs.len().max(1));
        let chunk_size = pairs.len().div_ceil(workers).max(1);
        let kept = Mutex::new(ReleaseSet::new());

        std::thread::scope(|s| {
            for chunk in pairs.chunks(chunk_size) {
                let index = &index;
                let kept = &kept;
                s.spawn(move || {
                    let mut local = ReleaseSet::new();
                    for (project, environment) in chunk {
                        let (_, decided) =
                            self.evaluate_scope(index, project, environment, observer);
                        local.union(decided);
                    }
                    kept.lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .union(local);
                });
            }
        });

        let kept = kept.into_inner().unwrap_or_else(PoisonError::into_inner);
        self.log_summary(pairs.len(), &kept);
        kept
    }

    /// Convenience over [`Self::determine_releases_to_keep`] for loaded inputs.
    pub fn evaluate(
        &self,
        inputs: &RetentionInputs,
        observer: Option<&dyn RetentionObserver>,
    ) -> ReleaseSet {
        self.determine_releases_to_keep(
            &inputs.projects,
            &inputs.environments,
            &inputs.releases,
            &inputs.deployments,
            observer,
        )
    }

    /// Full keep/purge classification with per-scope detail.
    pub fn classify(
        &self,
        inputs: &RetentionInputs,
        observer: Option<&dyn RetentionObserver>,
    ) -> RetentionReport {
        let index = ScopeIndex::build(&inputs.releases, &inputs.deployments);
        let mut kept = ReleaseSet::new();
        let mut scopes = Vec::new();

        for project in &inputs.projects {
            for environment in &inputs.environments {
                let (scope, decided) = self.evaluate_scope(&index, project, environment, observer);
                if !scope.deployments.is_empty() || !decided.is_empty() {
                    scopes.push(ScopeDecision {
                        project_id: project.id.clone(),
                        environment_id: environment.id.clone(),
                        releases: scope.releases.len(),
                        deployments: scope.deployments.len(),
                        kept: decided.ids().map(str::to_string).collect(),
                    });
                }
                kept.union(decided);
            }
        }

        self.log_summary(inputs.projects.len() * inputs.environments.len(), &kept);
        RetentionReport::new(self.strategy.name(), &inputs.releases, kept, scopes)
    }

    fn evaluate_scope<'i>(
        &self,
        index: &'i ScopeIndex,
        project: &Project,
        environment: &Environment,
        observer: Option<&dyn RetentionObserver>,
    ) -> (Scope<'i>, ReleaseSet) {
        let scope = index.scope(&project.id, &environment.id);
        let decided = self.strategy.determine_releases_to_keep(
            project,
            environment,
            scope.releases,
            &scope.deployments,
            observer,
        );
        debug!(
            project = %project.id,
            environment = %environment.id,
            releases = scope.releases.len(),
            deployments = scope.deployments.len(),
            kept = decided.len(),
            "scope evaluated"
        );
        (scope, decided)
    }

    fn log_summary(&self, pairs: usize, kept: &ReleaseSet) {
        info!(
            strategy = self.strategy.name(),
            pairs,
            kept = kept.len(),
            "retention decided"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::CollectingObserver;
    use crate::strategy::KeepMostRecentStrategy;
    use chrono::{TimeZone, Utc};

    fn release(id: &str, project_id: &str) -> Release {
        Release {
            id: id.into(),
            version: format!("1.0.{}", &id[1..]),
            project_id: project_id.into(),
            created: Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
        }
    }

    fn deployment(id: &str, release_id: &str, environment_id: &str, day: u32) -> Deployment {
        Deployment {
            id: id.into(),
            release_id: release_id.into(),
            environment_id: environment_id.into(),
            deployed_at: Utc.with_ymd_and_hms(2024, 1, day, 10, 0, 0).unwrap(),
        }
    }

    fn fleet() -> RetentionInputs {
        RetentionInputs {
            projects: vec![
                Project::new("P1", "Project-1"),
                Project::new("P2", "Project-2"),
                Project::new("P3", "Project-3"),
            ],
            environments: vec![
                Environment::new("E1", "Staging"),
                Environment::new("E2", "Production"),
            ],
            releases: vec![
                release("R1", "P1"),
                release("R2", "P1"),
                release("R3", "P1"),
                release("R4", "P2"),
                release("R5", "P2"),
                release("R6", "P3"),
                release("R7", "P9"),
            ],
            deployments: vec![
                deployment("D1", "R1", "E1", 1),
                deployment("D2", "R2", "E1", 2),
                deployment("D3", "R3", "E1", 3),
                deployment("D4", "R1", "E2", 4),
                deployment("D5", "R4", "E1", 1),
                deployment("D6", "R5", "E2", 2),
                deployment("D7", "R7", "E1", 9),
                deployment("D8", "R404", "E2", 9),
            ],
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        let service = RetentionService::new(KeepMostRecentStrategy::new(1));
        let inputs = fleet();
        let sequential = service.evaluate(&inputs, None);
        for workers in [0, 1, 2, 3, 16] {
            let parallel = service.determine_releases_to_keep_parallel(
                &inputs.projects,
                &inputs.environments,
                &inputs.releases,
                &inputs.deployments,
                None,
                workers,
            );
            assert_eq!(parallel, sequential, "workers = {workers}");
        }
        assert_eq!(
            sequential.ids().collect::<Vec<_>>(),
            vec!["R1", "R3", "R4", "R5"]
        );
    }

    #[test]
    fn builds_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("retention.json");
        std::fs::write(&path, r#"{"policy": {"kind": "keep_most_recent", "keep": 2}}"#).unwrap();
        let service =
            RetentionService::from_config_file(path.to_str().unwrap(), Utc::now()).unwrap();
        assert_eq!(service.strategy().name(), "keep_most_recent");

        std::fs::write(&path, r#"{"policy": {"kind": "keep_most_recent", "keep": -1}}"#).unwrap();
        let err = RetentionService::from_config_file(path.to_str().unwrap(), Utc::now())
            .err()
            .unwrap();
        assert!(format!("{err:#}").contains("invalid keep count -1"));
    }

    #[test]
    fn parallel_with_no_pairs_is_empty() {
        let service = RetentionService::new(KeepMostRecentStrategy::new(1));
        let kept = service.determine_releases_to_keep_parallel(&[], &[], &[], &[], None, 4);
        assert!(kept.is_empty());
    }

    #[test]
    fn classify_reports_scopes_and_purge() {
        let service = RetentionService::new(KeepMostRecentStrategy::new(1));
        let inputs = fleet();
        let report = service.classify(&inputs, None);

        assert_eq!(report.strategy, "keep_most_recent");
        assert_eq!(report.keep, service.evaluate(&inputs, None));
        let purge: Vec<_> = report.purge.iter().map(|r| r.id.as_str()).collect();
        // R7 belongs to an unknown project, so no scope can keep it.
        assert_eq!(purge, vec!["R2", "R6", "R7"]);

        let p1_e1 = report
            .scopes
            .iter()
            .find(|s| s.project_id == "P1" && s.environment_id == "E1")
            .unwrap();
        assert_eq!(p1_e1.releases, 3);
        assert_eq!(p1_e1.deployments, 3);
        assert_eq!(p1_e1.kept, vec!["R3".to_string()]);

        // P3 has no deployments anywhere.
        assert!(report.scopes.iter().all(|s| s.project_id != "P3"));
    }

    fn triple(a: &str, b: &str, c: &str) -> (String, String, String) {
        (a.to_string(), b.to_string(), c.to_string())
    }

    #[test]
    fn observer_sees_every_scope_decision() {
        let service = RetentionService::new(KeepMostRecentStrategy::new(1));
        let observer = CollectingObserver::new();
        service.evaluate(&fleet(), Some(&observer));

        let mut seen: Vec<_> = observer
            .into_events()
            .into_iter()
            .map(|e| (e.project_name, e.environment_name, e.release_version))
            .collect();
        seen.sort();
        assert_eq!(
            seen,
            vec![
                triple("Project-1", "Production", "1.0.1"),
                triple("Project-1", "Staging", "1.0.3"),
                triple("Project-2", "Production", "1.0.5"),
                triple("Project-2", "Staging", "1.0.4"),
            ]
        );
    }

    #[test]
    fn result_does_not_depend_on_observer() {
        let service = RetentionService::new(KeepMostRecentStrategy::new(2));
        let inputs = fleet();
        let observer = CollectingObserver::new();
        assert_eq!(
            service.evaluate(&inputs, None),
            service.evaluate(&inputs, Some(&observer))
        );
    }
}
