//! Retention policies and their construction from configuration.

pub mod keep_deployed_within;
pub mod keep_most_recent;

use chrono::{DateTime, Utc};
use retention_core::config::PolicyConfig;
use retention_core::errors::RetentionError;
use retention_core::RetentionStrategy;

pub use keep_deployed_within::KeepDeployedWithinStrategy;
pub use keep_most_recent::KeepMostRecentStrategy;

/// Build the configured strategy. `now` anchors time-window policies.
pub fn from_config(
    policy: &PolicyConfig,
    now: DateTime<Utc>,
) -> Result<Box<dyn RetentionStrategy>, RetentionError> {
    Ok(match *policy {
        PolicyConfig::KeepMostRecent { keep } => Box::new(KeepMostRecentStrategy::try_from(keep)?),
        PolicyConfig::KeepDeployedWithin { days } => {
            Box::new(KeepDeployedWithinStrategy::new(days, now)?)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_default_policy() {
        let strategy = from_config(&PolicyConfig::default(), Utc::now()).unwrap();
        assert_eq!(strategy.name(), KeepMostRecentStrategy::NAME);
    }

    #[test]
    fn negative_keep_fails_at_construction() {
        let err = from_config(&PolicyConfig::KeepMostRecent { keep: -2 }, Utc::now())
            .err()
            .unwrap();
        assert_eq!(err, RetentionError::InvalidKeepCount(-2));
        assert_eq!(err.to_string(), "invalid keep count -2: must be zero or greater");
    }

    #[test]
    fn builds_window_policy() {
        let strategy =
            from_config(&PolicyConfig::KeepDeployedWithin { days: 14 }, Utc::now()).unwrap();
        assert_eq!(strategy.name(), KeepDeployedWithinStrategy::NAME);
    }
}
