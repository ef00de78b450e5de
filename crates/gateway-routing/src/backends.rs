//! Interfaces to the live gateway state routing consults.
//!
//! Resolution never owns this state: configured providers, the model catalog
//! and usage counters all live elsewhere in the gateway. Calls are
//! synchronous and made once per target, in declaration order.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use thiserror::Error;

/// Set of real providers the gateway currently has configured
pub trait ConfiguredProviders: Send + Sync {
    /// Whether a provider id is configured
    fn is_configured(&self, provider: &str) -> bool;

    /// All configured provider ids
    fn provider_ids(&self) -> Vec<String>;
}

impl ConfiguredProviders for HashSet<String> {
    fn is_configured(&self, provider: &str) -> bool {
        self.contains(provider)
    }

    fn provider_ids(&self) -> Vec<String> {
        self.iter().cloned().collect()
    }
}

impl ConfiguredProviders for BTreeSet<String> {
    fn is_configured(&self, provider: &str) -> bool {
        self.contains(provider)
    }

    fn provider_ids(&self) -> Vec<String> {
        self.iter().cloned().collect()
    }
}

impl ConfiguredProviders for Vec<String> {
    fn is_configured(&self, provider: &str) -> bool {
        self.iter().any(|id| id == provider)
    }

    fn provider_ids(&self) -> Vec<String> {
        self.clone()
    }
}

/// Catalog refinement failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("model {model} is not available on provider {provider}: {reason}")]
pub struct CatalogError {
    /// Provider asked about
    pub provider: String,
    /// Model asked about
    pub model: String,
    /// Why refinement failed
    pub reason: String,
}

/// Resolves a raw model name to the name a provider actually serves
pub trait ModelCatalog: Send + Sync {
    /// Refine `model` for `provider`
    ///
    /// # Errors
    /// Returns [`CatalogError`] if the provider cannot serve the model
    fn refine_model(&self, provider: &str, model: &str) -> Result<String, CatalogError>;
}

/// Catalog that accepts every model unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCatalog;

impl ModelCatalog for PassthroughCatalog {
    fn refine_model(&self, _provider: &str, model: &str) -> Result<String, CatalogError> {
        Ok(model.to_string())
    }
}

/// Identity the request authenticated with, used for usage lookups and
/// profile binding
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualKeyContext {
    /// Virtual key id, if the request carried one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Team owning the key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    /// Customer owning the key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
}

impl VirtualKeyContext {
    /// Context for an anonymous request
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Context for a virtual key id
    #[must_use]
    pub fn for_key(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }
}

/// Live consumption of the limits governing a provider/model pair, in
/// percent of each limit
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageStatus {
    /// Request rate limit consumption
    pub request_percent_used: f64,
    /// Token rate limit consumption
    pub token_percent_used: f64,
    /// Budget consumption
    pub budget_percent_used: f64,
}

/// Usage lookup failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("usage data unavailable: {0}")]
pub struct UsageError(pub String);

/// Live budget and rate-limit counters
pub trait UsageTracker: Send + Sync {
    /// Current consumption for a key/model/provider.
    ///
    /// `Ok(None)` means no limit governs the pair.
    ///
    /// # Errors
    /// Returns [`UsageError`] if the counters cannot be read
    fn usage(
        &self,
        key: &VirtualKeyContext,
        model: &str,
        provider: &str,
    ) -> Result<Option<UsageStatus>, UsageError>;
}

/// Tracker for deployments without budgets or rate limits
#[derive(Debug, Clone, Copy, Default)]
pub struct Unmetered;

impl UsageTracker for Unmetered {
    fn usage(
        &self,
        _key: &VirtualKeyContext,
        _model: &str,
        _provider: &str,
    ) -> Result<Option<UsageStatus>, UsageError> {
        Ok(None)
    }
}

/// Live collaborators bundled for the resolver
#[derive(Clone)]
pub struct LiveBackends {
    /// Configured real providers
    pub providers: Arc<dyn ConfiguredProviders>,
    /// Model catalog
    pub catalog: Arc<dyn ModelCatalog>,
    /// Usage counters
    pub usage: Arc<dyn UsageTracker>,
}

impl LiveBackends {
    /// Bundle collaborators
    pub fn new(
        providers: Arc<dyn ConfiguredProviders>,
        catalog: Arc<dyn ModelCatalog>,
        usage: Arc<dyn UsageTracker>,
    ) -> Self {
        Self {
            providers,
            catalog,
            usage,
        }
    }

    /// Providers only; models pass through and nothing is metered
    pub fn with_providers(providers: Arc<dyn ConfiguredProviders>) -> Self {
        Self::new(providers, Arc::new(PassthroughCatalog), Arc::new(Unmetered))
    }
}

impl std::fmt::Debug for LiveBackends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveBackends")
            .field("providers", &self.providers.provider_ids())
            .finish_non_exhaustive()
    }
}
