//! Request types for the gateway.
//!
//! This module defines the unified request format that routing operates on.
//! Only the fields routing reads or rewrites are modelled; everything else
//! travels untouched through the HTTP layer.

use crate::types::RequestId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Unified gateway request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayRequest {
    /// Unique request identifier
    #[serde(default = "RequestId::generate")]
    pub id: RequestId,

    /// Target model, usually `<provider>/<model>`
    #[serde(default)]
    pub model: String,

    /// Chat messages for conversation
    #[serde(default)]
    pub messages: Vec<ChatMessage>,

    /// Explicit fallback chain, tried in order when the primary fails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallbacks: Option<Vec<String>>,

    /// Request type resolved by the HTTP layer from the route
    #[serde(skip)]
    pub request_type: Option<RequestType>,

    /// Request-scoped diagnostic values for downstream observability
    #[serde(skip)]
    pub context: HashMap<String, serde_json::Value>,
}

impl GatewayRequest {
    /// Create a new builder for `GatewayRequest`
    #[must_use]
    pub fn builder() -> GatewayRequestBuilder {
        GatewayRequestBuilder::default()
    }

    /// Validate the request
    ///
    /// # Errors
    /// Returns error if the model is blank or there are no messages
    pub fn validate(&self) -> Result<(), crate::error::GatewayError> {
        if self.model.trim().is_empty() {
            return Err(crate::error::GatewayError::validation(
                "model is required",
                Some("model".to_string()),
                "missing_model",
            ));
        }

        if self.messages.is_empty() {
            return Err(crate::error::GatewayError::validation(
                "messages cannot be empty",
                Some("messages".to_string()),
                "empty_messages",
            ));
        }

        Ok(())
    }

    /// Iterate over every content part of every message
    pub fn content_parts(&self) -> impl Iterator<Item = &ContentPart> {
        self.messages
            .iter()
            .filter_map(|message| match &message.content {
                MessageContent::Parts(parts) => Some(parts.iter()),
                MessageContent::Text(_) | MessageContent::Other(_) => None,
            })
            .flatten()
    }
}

/// Builder for `GatewayRequest`
#[derive(Debug, Default)]
pub struct GatewayRequestBuilder {
    id: Option<RequestId>,
    model: Option<String>,
    messages: Vec<ChatMessage>,
    fallbacks: Option<Vec<String>>,
    request_type: Option<RequestType>,
}

impl GatewayRequestBuilder {
    /// Set the request ID
    #[must_use]
    pub fn id(mut self, id: RequestId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the model
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the messages
    #[must_use]
    pub fn messages(mut self, messages: Vec<ChatMessage>) -> Self {
        self.messages = messages;
        self
    }

    /// Add a message
    #[must_use]
    pub fn message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Set the fallback chain
    #[must_use]
    pub fn fallbacks(mut self, fallbacks: Vec<String>) -> Self {
        self.fallbacks = Some(fallbacks);
        self
    }

    /// Set the request type
    #[must_use]
    pub fn request_type(mut self, request_type: RequestType) -> Self {
        self.request_type = Some(request_type);
        self
    }

    /// Build the request
    ///
    /// # Errors
    /// Returns error if required fields are missing
    pub fn build(self) -> Result<GatewayRequest, crate::error::GatewayError> {
        let model = self.model.ok_or_else(|| {
            crate::error::GatewayError::validation(
                "model is required",
                Some("model".to_string()),
                "missing_model",
            )
        })?;

        let request = GatewayRequest {
            id: self.id.unwrap_or_else(RequestId::generate),
            model,
            messages: self.messages,
            fallbacks: self.fallbacks,
            request_type: self.request_type,
            context: HashMap::new(),
        };

        request.validate()?;

        Ok(request)
    }
}

/// Kind of API operation a request performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    /// Chat completion
    Chat,
    /// Legacy text completion
    TextCompletion,
    /// Responses API
    Responses,
    /// Embedding generation
    Embedding,
    /// Text to speech
    Speech,
    /// Speech to text
    Transcription,
    /// Image generation
    ImageGeneration,
    /// Token counting
    CountTokens,
}

impl RequestType {
    /// Wire name of the request type
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::TextCompletion => "text_completion",
            Self::Responses => "responses",
            Self::Embedding => "embedding",
            Self::Speech => "speech",
            Self::Transcription => "transcription",
            Self::ImageGeneration => "image_generation",
            Self::CountTokens => "count_tokens",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = crate::error::GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chat" => Ok(Self::Chat),
            "text_completion" => Ok(Self::TextCompletion),
            "responses" => Ok(Self::Responses),
            "embedding" => Ok(Self::Embedding),
            "speech" => Ok(Self::Speech),
            "transcription" => Ok(Self::Transcription),
            "image_generation" => Ok(Self::ImageGeneration),
            "count_tokens" => Ok(Self::CountTokens),
            other => Err(crate::error::GatewayError::validation(
                format!("unknown request type: {other}"),
                Some("request_type".to_string()),
                "invalid_request_type",
            )),
        }
    }
}

/// Chat message with role and content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message author
    pub role: MessageRole,

    /// Content of the message
    #[serde(default)]
    pub content: MessageContent,

    /// Optional name of the author
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(MessageRole::System, content)
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::text(MessageRole::User, content)
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(MessageRole::Assistant, content)
    }

    /// Create a user message made of multimodal parts
    #[must_use]
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: MessageRole::User,
            content: MessageContent::Parts(parts),
            name: None,
        }
    }

    fn text(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: MessageContent::Text(content.into()),
            name: None,
        }
    }
}

/// Message role.
///
/// Roles the gateway does not know are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System message
    System,
    /// Developer instructions
    Developer,
    /// User message
    User,
    /// Assistant message
    Assistant,
    /// Tool response message
    Tool,
    /// Any other role
    #[serde(untagged)]
    Other(String),
}

/// Message content.
///
/// Anything that is neither a string nor a list of typed parts, including a
/// missing or `null` content, is carried as raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text content
    Text(String),
    /// Multimodal content parts
    Parts(Vec<ContentPart>),
    /// Any other shape
    Other(serde_json::Value),
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::Other(serde_json::Value::Null)
    }
}

/// Content part for multimodal messages.
///
/// Only the `type` marker is interpreted; every other field is kept as-is so
/// the part survives re-serialization whatever API shape it came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentPart {
    /// Type marker as it appears on the wire
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Remaining fields of the part
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl ContentPart {
    /// Part with the given type marker and no other fields
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: serde_json::Map::new(),
        }
    }

    /// Chat completions text part
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new("text").with_field("text", serde_json::Value::String(text.into()))
    }

    /// Chat completions image part
    #[must_use]
    pub fn image_url(url: impl Into<String>) -> Self {
        Self::new("image_url").with_field("image_url", serde_json::json!({ "url": url.into() }))
    }

    /// Add a field
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }
}
