//! Gateway-side resource registry for Taskmesh.
//!
//! This crate provides:
//! - Capability-indexed resource registration and discovery
//! - Relevance scoring with fuzzy capability matching
//! - Security/compliance predicate chains

pub mod gateway;
pub mod predicates;
pub mod scoring;

pub use gateway::{GatewayMetrics, ResourceGateway};
pub use predicates::{CapabilityBlocklist, EndpointSchemePredicate};
