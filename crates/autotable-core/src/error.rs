//! Error types for the auto-table recovery core
//!
//! Every failure mode a recovery can hit is a distinct variant so callers can
//! tell a backend rejection apart from a malformed document or a disabled
//! feature flag.

use autotable_common::Datatype;
use thiserror::Error;

/// Result type alias for recovery operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Document parse failures
///
/// Fatal to the current parse; never retried.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Streaming document without the operation keyword wrapper
    #[error("Operation name '{0}' is missing")]
    MissingOperation(&'static str),

    /// A mandatory field is absent
    #[error("Mandatory request field '{0}' is missing")]
    MissingField(&'static str),

    /// A mandatory field holds the wrong value type
    #[error("Mandatory request field '{0}' must be {1}")]
    FieldType(&'static str, &'static str),

    /// A key or string value carries a control character
    #[error("Field '{0}' contains a disallowed control character")]
    DisallowedChars(String),

    /// Values observed for one column cannot share a column type
    #[error("Incompatible types for column '{column}': {current} vs {incoming}")]
    TypeConflict {
        column: String,
        current: Datatype,
        incoming: Datatype,
    },

    /// The payload held no documents at all
    #[error("Insert payload contains no documents")]
    NoDocuments,

    /// A document line is not valid JSON
    #[error("Invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors produced by the recovery orchestration
#[derive(Error, Debug)]
pub enum CoreError {
    /// Schema inference failed on the insert document(s)
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// The backend mode forbids dynamic table creation; not retryable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The auto-schema feature flag is off; the caller may retry after
    /// enabling it
    #[error("Auto schema is disabled")]
    FeatureDisabled,

    /// The backend rejected a statement; remaining statements are aborted
    /// and nothing is rolled back
    #[error("Backend execution failed: {0}")]
    Execution(String),

    /// An upstream contract was violated (programming error, not user input)
    #[error("Internal contract violation: {0}")]
    InternalContract(String),

    /// The backend could not be reached
    #[error("Network request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl CoreError {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an execution error from a backend-reported failure
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Create an internal contract error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalContract(msg.into())
    }

    /// True when the caller may retry the original request after acting on
    /// the error (currently only the disabled feature flag)
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::FeatureDisabled)
    }
}
