//! Planner and reasoning-strategy hooks.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::types::Task;

/// Decision returned by a reasoning strategy at the selection point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextAction {
    /// Proceed with the default heuristic: local pool first, then registry
    /// discovery.
    Discover,
    /// Pin a specific previously seen resource by ID.
    UseResource(String),
    /// Stop without invoking anything; the task fails with the given reason.
    Terminate(String),
}

/// A pluggable reasoning strategy.
///
/// Invoked where the orchestrator would otherwise apply its single default
/// selection heuristic. Given the task and the observations gathered so far,
/// a strategy returns the next action or terminates. This is a hook
/// contract, not an algorithm: the built-in strategies are named
/// placeholders a semantic implementation can replace.
#[async_trait]
pub trait ReasoningStrategy: Send + Sync {
    /// Strategy name used for lookup and selection.
    fn name(&self) -> &str;

    /// Decide the next action for this task.
    async fn decide(&self, task: &Task, observations: &[Value]) -> Result<NextAction>;
}

/// Deterministic decomposition of a request into subtasks.
///
/// Implementations must return at least one task for any input. This is a
/// policy table, not a natural-language engine; a semantic planner can be
/// substituted without touching the orchestrator.
pub trait TaskPlanner: Send + Sync {
    /// Decompose the request text into an ordered task list. Never empty.
    fn plan(&self, request: &str) -> Vec<Task>;
}
