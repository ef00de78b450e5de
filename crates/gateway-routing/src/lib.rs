//! # Gateway Routing
//!
//! Routing profiles for the LLM gateway: a client addresses a virtual
//! provider alias and the gateway rewrites the request to a ranked list of
//! real provider targets.
//!
//! This crate provides:
//! - Profile and target definitions with storage encoding
//! - Load-time validation with specific rule violations
//! - An atomically replaceable profile registry
//! - Candidate filtering with a rejection tally
//! - Ordered-failover and weighted ranking
//! - Request rewriting with diagnostics
//! - Offline simulation

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backends;
pub mod capabilities;
pub mod decision;
pub mod error;
pub mod orchestrator;
pub mod profile;
pub mod registry;
pub mod request;
pub mod resolver;
pub mod simulation;
pub mod strategy;
pub mod threshold;
pub mod validator;

// Re-export main types
pub use backends::{
    CatalogError, ConfiguredProviders, LiveBackends, ModelCatalog, PassthroughCatalog, Unmetered,
    UsageError, UsageStatus, UsageTracker, VirtualKeyContext,
};
pub use capabilities::Capabilities;
pub use decision::{ResolveOutcome, RoutingDiagnostics};
pub use error::{RoutingError, RoutingResult, ValidationRule};
pub use orchestrator::ProfileRouter;
pub use profile::{
    decode_targets, encode_targets, RateHint, RoutingProfile, RoutingStrategy, RoutingTarget,
    UsageMetric,
};
pub use registry::{ProfileRegistry, ProfileSnapshot};
pub use request::{split_model_suffix, PathModelRequest, RoutableRequest, PATH_MODEL_SUFFIXES};
pub use resolver::{Candidate, CandidateResolver, RejectionReason, RejectionTally, RequestAttributes};
pub use simulation::{simulate, SimulatedDecision, SimulationCaveat};
pub use strategy::rank;
pub use validator::validate_profiles;
