//! Small validated domain types.

use crate::error::GatewayError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique request identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a fresh random identifier
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RequestId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A `<provider>/<model>` reference.
///
/// Only the first `/` separates the two halves, so model names that contain
/// slashes themselves (`openrouter/meta-llama/llama-3`) survive intact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedModel {
    /// Provider (or virtual provider alias) segment
    pub provider: String,
    /// Model segment, possibly empty
    pub model: String,
}

impl QualifiedModel {
    /// Create a qualified model from its parts
    #[must_use]
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
        }
    }

    /// Split a model string into provider and model.
    ///
    /// Returns `None` when the string has no `/` or the provider segment is
    /// blank. The model segment is allowed to be empty here; callers that need
    /// both halves use [`QualifiedModel::parse_strict`].
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let (provider, model) = value.split_once('/')?;
        let provider = provider.trim();
        if provider.is_empty() {
            return None;
        }
        Some(Self::new(provider, model))
    }

    /// Parse a model string that must carry both a provider and a model.
    ///
    /// # Errors
    /// Returns [`GatewayError::InvalidModel`] if either segment is missing
    pub fn parse_strict(value: &str) -> Result<Self, GatewayError> {
        match Self::parse(value) {
            Some(parsed) if !parsed.model.trim().is_empty() => Ok(parsed),
            _ => Err(GatewayError::InvalidModel(value.to_string())),
        }
    }
}

impl fmt::Display for QualifiedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}
