use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::schema::{self, SchemaKind};

pub const DEFAULT_KEEP: i64 = 3;

/// Retention configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionConfig {
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Which retention policy to apply, with its parameters.
///
/// Counts are signed on purpose: a negative value is a configuration error
/// reported when the strategy is built, not a parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyConfig {
    KeepMostRecent {
        #[serde(default = "default_keep")]
        keep: i64,
    },
    KeepDeployedWithin {
        days: i64,
    },
}

fn default_keep() -> i64 {
    DEFAULT_KEEP
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig::KeepMostRecent { keep: DEFAULT_KEEP }
    }
}

/// Load and validate a configuration file.
pub fn load_config(path: &str) -> Result<RetentionConfig> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("cannot read config {path}"))?;
    parse_config(&content).with_context(|| format!("{path}: invalid config"))
}

pub fn parse_config(content: &str) -> Result<RetentionConfig> {
    let data: serde_json::Value = serde_json::from_str(content).context("invalid JSON")?;
    schema::validate(SchemaKind::Config, &data)?;
    Ok(serde_json::from_value(data)?)
}
