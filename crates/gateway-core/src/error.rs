//! Error types for the gateway core.

use thiserror::Error;

/// Result type for core operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors raised while building or validating gateway requests
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// A request field failed validation
    #[error("Validation error: {message}")]
    Validation {
        /// Error message
        message: String,
        /// Offending field, if known
        field: Option<String>,
        /// Stable machine-readable code
        code: String,
    },

    /// A model reference could not be parsed
    #[error("Invalid model reference: {0}")]
    InvalidModel(String),
}

impl GatewayError {
    /// Create a validation error
    pub fn validation(
        message: impl Into<String>,
        field: Option<String>,
        code: impl Into<String>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            field,
            code: code.into(),
        }
    }

    /// Machine-readable error code
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Validation { code, .. } => code,
            Self::InvalidModel(_) => "invalid_model",
        }
    }
}
