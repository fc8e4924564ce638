//! Orchestration engine for Taskmesh.
//!
//! This crate drives the plan -> discover -> select -> invoke -> record loop:
//! - `planner`: deterministic rule-table task decomposition
//! - `cache`: per-orchestrator local resource pool and candidate matcher
//! - `strategy`: named reasoning-strategy hooks
//! - `engine`: the orchestrator itself

pub mod cache;
pub mod engine;
pub mod planner;
pub mod strategy;

pub use cache::{filter_and_rank, ResourcePool};
pub use engine::{Orchestrator, OrchestratorBuilder};
pub use planner::{PlanRule, RulePlanner};
pub use strategy::StrategyRegistry;
