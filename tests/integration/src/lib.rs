//! Integration tests for gateway routing profiles
//!
//! This crate covers:
//! - End-to-end resolution against live collaborators
//! - Atomic profile replacement under concurrent reads
//! - Offline simulation
//! - Config loading and hot reload


// Re-export commonly used items
pub use fixtures::*;
pub use helpers::*;
pub use mock_backends::*;

#[cfg(test)]
mod config_tests;
#[cfg(test)]
mod registry_tests;
#[cfg(test)]
mod routing_tests;
#[cfg(test)]
mod simulation_tests;
