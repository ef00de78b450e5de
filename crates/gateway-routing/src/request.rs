//! Narrow view of a request that routing reads and rewrites.
//!
//! Resolution only touches the target model, the fallback list, request type,
//! content (for capabilities) and a diagnostic context. Two surfaces are
//! provided: the usual body-carried model, and a path-carried model that may
//! end in an operation suffix.

use crate::capabilities::Capabilities;
use gateway_core::GatewayRequest;
use serde_json::Value;

/// Operation suffixes a path-carried model may end with
pub const PATH_MODEL_SUFFIXES: [&str; 7] = [
    ":streamGenerateContent",
    ":generateContent",
    ":countTokens",
    ":embedContent",
    ":batchEmbedContents",
    ":predictLongRunning",
    ":predict",
];

/// A request routing can resolve and amend
pub trait RoutableRequest {
    /// Model the client asked for, if any
    fn target_model(&self) -> Option<&str>;

    /// Rewrite the model to dispatch to
    fn set_target_model(&mut self, model: String);

    /// Current fallback chain
    fn fallbacks(&self) -> &[String];

    /// Replace the fallback chain
    fn set_fallbacks(&mut self, fallbacks: Vec<String>);

    /// Request type, when the transport knows it
    fn request_type(&self) -> Option<&str>;

    /// Capabilities implied by the request content
    fn capabilities(&self) -> Capabilities;

    /// Read a diagnostic value
    fn diagnostic(&self, key: &str) -> Option<&Value>;

    /// Attach a diagnostic value for downstream observability
    fn set_diagnostic(&mut self, key: &str, value: Value);

    /// Suffixes stripped from the model before parsing and reattached to
    /// the primary only
    fn model_suffixes(&self) -> &[&'static str] {
        &[]
    }
}

impl RoutableRequest for GatewayRequest {
    fn target_model(&self) -> Option<&str> {
        Some(self.model.as_str()).filter(|m| !m.is_empty())
    }

    fn set_target_model(&mut self, model: String) {
        self.model = model;
    }

    fn fallbacks(&self) -> &[String] {
        self.fallbacks.as_deref().unwrap_or_default()
    }

    fn set_fallbacks(&mut self, fallbacks: Vec<String>) {
        self.fallbacks = Some(fallbacks);
    }

    fn request_type(&self) -> Option<&str> {
        self.request_type.as_ref().map(|t| t.as_str())
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::from_request(self)
    }

    fn diagnostic(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }

    fn set_diagnostic(&mut self, key: &str, value: Value) {
        self.context.insert(key.to_string(), value);
    }
}

/// Request whose model arrives as a path parameter
/// (`/models/{model}:generateContent`)
#[derive(Debug, Clone)]
pub struct PathModelRequest {
    /// Model path parameter, suffix included
    pub path_model: String,
    /// Parsed body
    pub request: GatewayRequest,
}

impl PathModelRequest {
    /// Wrap a body with its path model
    #[must_use]
    pub fn new(path_model: impl Into<String>, request: GatewayRequest) -> Self {
        Self {
            path_model: path_model.into(),
            request,
        }
    }
}

impl RoutableRequest for PathModelRequest {
    fn target_model(&self) -> Option<&str> {
        Some(self.path_model.as_str()).filter(|m| !m.is_empty())
    }

    fn set_target_model(&mut self, model: String) {
        self.path_model = model;
    }

    fn fallbacks(&self) -> &[String] {
        self.request.fallbacks()
    }

    fn set_fallbacks(&mut self, fallbacks: Vec<String>) {
        self.request.set_fallbacks(fallbacks);
    }

    fn request_type(&self) -> Option<&str> {
        RoutableRequest::request_type(&self.request)
    }

    fn capabilities(&self) -> Capabilities {
        self.request.capabilities()
    }

    fn diagnostic(&self, key: &str) -> Option<&Value> {
        self.request.diagnostic(key)
    }

    fn set_diagnostic(&mut self, key: &str, value: Value) {
        self.request.set_diagnostic(key, value);
    }

    fn model_suffixes(&self) -> &[&'static str] {
        &PATH_MODEL_SUFFIXES
    }
}

/// Split a known suffix off a model string; the first listed match wins.
#[must_use]
pub fn split_model_suffix<'a>(model: &'a str, suffixes: &[&'static str]) -> (&'a str, &'static str) {
    suffixes
        .iter()
        .find_map(|suffix| model.strip_suffix(suffix).map(|base| (base, *suffix)))
        .unwrap_or((model, ""))
}
