//! # Gateway Telemetry
//!
//! Logging setup for the routing-profile gateway.
//!
//! This crate provides:
//! - Structured logging with `RUST_LOG` filtering
//! - Text or JSON output

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod logging;

// Re-export main types
pub use logging::{init_logging, LogFormat, LoggingConfig, TelemetryError};
