//! Core types, traits, and error definitions for Taskmesh.
//!
//! This crate provides the foundational building blocks shared across all
//! layers of the orchestration engine.

pub mod config;
pub mod error;
pub mod mocks;
pub mod telemetry;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::*;
pub use types::*;
