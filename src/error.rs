//! Crate-wide error taxonomy.
//!
//! Every tool body returns [`AppError`]; the dispatcher is the only place that
//! turns a variant into the wire-level `{success, error, data.code}` shape
//! (see [`AppError::code`]).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("path escapes workspace: {0}")]
    PathEscape(String),

    #[error("validation failed: {errors} error-severity finding(s) in {context}")]
    ValidationFailed { context: String, errors: usize },

    #[error("generation failed after {attempts} attempt(s): {message}")]
    GenerationFailed { attempts: u32, message: String },

    #[error("backend error: {0}")]
    Backend(String),

    #[error("canceled")]
    Canceled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("conflict, retry: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Stable machine-readable code embedded in `data.code` on failure responses.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidArgument(_) => "InvalidArgument",
            AppError::PreconditionFailed(_) => "PreconditionFailed",
            AppError::PathEscape(_) => "PathEscape",
            AppError::ValidationFailed { .. } => "ValidationFailed",
            AppError::GenerationFailed { .. } => "GenerationFailed",
            AppError::Backend(_) => "Backend",
            AppError::Canceled => "Canceled",
            AppError::DeadlineExceeded => "DeadlineExceeded",
            AppError::Conflict(_) => "Conflict",
            AppError::NotFound(_) => "NotFound",
        }
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        AppError::Backend(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        AppError::InvalidArgument(msg.into())
    }

    pub fn precondition(tool: impl Into<String>) -> Self {
        AppError::PreconditionFailed(tool.into())
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Backend(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Backend(format!("json: {e}"))
    }
}

impl From<toml::de::Error> for AppError {
    fn from(e: toml::de::Error) -> Self {
        AppError::Backend(format!("toml decode: {e}"))
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(e: toml::ser::Error) -> Self {
        AppError::Backend(format!("toml encode: {e}"))
    }
}
