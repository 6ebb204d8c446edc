/// Strategy construction errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetentionError {
    #[error("invalid keep count {0}: must be zero or greater")]
    InvalidKeepCount(i64),
    #[error("invalid retention window of {0} days: must be zero or greater")]
    InvalidWindow(i64),
    #[error("retention window of {0} days reaches past the earliest representable time")]
    WindowOutOfRange(i64),
}

/// Why a collection could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read {path}: {reason}")]
    Read { path: String, reason: String },
    #[error("{path}: invalid JSON: {reason}")]
    Parse { path: String, reason: String },
    #[error("{path}: schema validation failed:\n{reason}")]
    Schema { path: String, reason: String },
}

impl LoadError {
    pub fn path(&self) -> &str {
        match self {
            LoadError::Read { path, .. }
            | LoadError::Parse { path, .. }
            | LoadError::Schema { path, .. } => path,
        }
    }
}

/// Structured result of [`crate::integrity::check`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct CheckReport {
    pub pass: bool,
    pub errors: Vec<CheckIssue>,
    pub warnings: Vec<CheckIssue>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CheckIssue {
    pub code: String,
    pub check: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}
