//! # Gateway Core
//!
//! Core types and error handling shared by the routing-profile gateway.
//!
//! This crate provides:
//! - The unified request format (`GatewayRequest` and its message model)
//! - Request type classification used by routing filters
//! - Qualified `<provider>/<model>` parsing
//! - Error types and handling

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod request;
pub mod types;

// Re-export commonly used types
pub use error::{GatewayError, GatewayResult};
pub use request::{
    ChatMessage, ContentPart, GatewayRequest, GatewayRequestBuilder, MessageContent, MessageRole,
    RequestType,
};
pub use types::{QualifiedModel, RequestId};
