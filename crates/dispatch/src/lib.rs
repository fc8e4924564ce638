//! Protocol dispatch for Taskmesh.
//!
//! This crate resolves a resource's invocation mechanism (agent-class vs
//! tool-class), delegates to the protocol client registered for that class,
//! and normalizes every outcome into a single result-or-error envelope.

pub mod clients;
pub mod dispatcher;

pub use clients::{create_invoker, HttpAgentInvoker, HttpToolInvoker, LoopbackInvoker};
pub use dispatcher::ProtocolDispatcher;
