use std::sync::Mutex;

use retention_core::{KeptReleaseEvent, RetentionObserver};
use tracing::info;

/// Emits every kept release as a `tracing` info event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RetentionObserver for TracingObserver {
    fn release_kept(&self, event: &KeptReleaseEvent) {
        info!(
            strategy = %event.strategy,
            project = %event.project_name,
            environment = %event.environment_name,
            release = %event.release_version,
            "keeping release {} for project {} in environment {}",
            event.release_version,
            event.project_name,
            event.environment_name
        );
    }
}

/// Buffers events in memory.
#[derive(Debug, Default)]
pub struct CollectingObserver {
    events: Mutex<Vec<KeptReleaseEvent>>,
}

impl CollectingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far.
    pub fn events(&self) -> Vec<KeptReleaseEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn into_events(self) -> Vec<KeptReleaseEvent> {
        self.events
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RetentionObserver for CollectingObserver {
    fn release_kept(&self, event: &KeptReleaseEvent) {
        let mut events = self
            .events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        events.push(event.clone());
    }
}
