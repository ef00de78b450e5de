//! Request capability extraction.
//!
//! Every request is assumed to need `text`; any image-bearing content part
//! adds `vision`. Targets declaring required capabilities are only eligible
//! when at least one of them is present.

use crate::profile::eq_fold;
use gateway_core::{ContentPart, GatewayRequest};
use serde::{Deserialize, Serialize};

/// Text capability, present on every request
pub const TEXT: &str = "text";

/// Vision capability, present when the request carries an image
pub const VISION: &str = "vision";

/// Content part type markers that carry images
pub const IMAGE_PART_KINDS: [&str; 3] = ["image_url", "input_image", "image"];

/// Case-insensitive, duplicate-free, insertion-ordered capability set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capabilities(Vec<String>);

impl Capabilities {
    /// Empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive capabilities from content parts
    pub fn from_parts<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'a ContentPart>,
    {
        let mut capabilities = Self::new();
        capabilities.insert(TEXT);
        for part in parts {
            if IMAGE_PART_KINDS.iter().any(|kind| eq_fold(kind, &part.kind)) {
                capabilities.insert(VISION);
            }
        }
        capabilities
    }

    /// Derive capabilities from a request's messages
    #[must_use]
    pub fn from_request(request: &GatewayRequest) -> Self {
        Self::from_parts(request.content_parts())
    }

    /// Add a capability unless already present (case-insensitive)
    pub fn insert(&mut self, capability: impl Into<String>) {
        let capability = capability.into();
        if !self.contains(&capability) {
            self.0.push(capability);
        }
    }

    /// Whether the capability is present (case-insensitive)
    #[must_use]
    pub fn contains(&self, capability: &str) -> bool {
        self.0.iter().any(|c| eq_fold(c, capability))
    }

    /// Whether any of `required` is present
    #[must_use]
    pub fn satisfies_any<S: AsRef<str>>(&self, required: &[S]) -> bool {
        required.iter().any(|r| self.contains(r.as_ref()))
    }

    /// Capabilities as a slice
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Number of capabilities
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Capabilities {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut capabilities = Self::new();
        for capability in iter {
            capabilities.insert(capability);
        }
        capabilities
    }
}
