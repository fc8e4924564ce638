use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::task::Task;

// =============================================================================
// Execution History & Context Types
// =============================================================================

/// Operational mode of an orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationalMode {
    /// Deterministic workflow, no reasoning hooks.
    NoLlm,
    /// Human-in-the-loop.
    Assisted,
    /// Fully autonomous.
    Agent,
    /// Combined modes.
    Hybrid,
}

impl Default for OperationalMode {
    fn default() -> Self {
        Self::Agent
    }
}

impl std::fmt::Display for OperationalMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoLlm => write!(f, "no_llm"),
            Self::Assisted => write!(f, "assisted"),
            Self::Agent => write!(f, "agent"),
            Self::Hybrid => write!(f, "hybrid"),
        }
    }
}

impl std::str::FromStr for OperationalMode {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "no_llm" => Ok(Self::NoLlm),
            "assisted" => Ok(Self::Assisted),
            "agent" => Ok(Self::Agent),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(crate::error::Error::validation(format!(
                "unknown operational mode '{}'",
                other
            ))),
        }
    }
}

/// One request as seen by the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// When the request arrived.
    pub timestamp: DateTime<Utc>,
    /// The verbatim request text.
    pub request: String,
}

/// Process-scoped context for one orchestrator instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentContext {
    /// Ordered request history.
    pub conversation_history: Vec<ConversationTurn>,

    /// Free-form per-user preferences.
    pub user_preferences: HashMap<String, Value>,

    /// Snapshot of every task this orchestrator has run.
    pub task_history: Vec<Task>,

    /// Free-form memory bank.
    pub memory_bank: HashMap<String, Value>,
}

impl AgentContext {
    /// Append a request to the conversation history.
    pub fn record_request(&mut self, request: &str) {
        self.conversation_history.push(ConversationTurn {
            timestamp: Utc::now(),
            request: request.to_string(),
        });
    }

    /// Store a free-form memory entry.
    pub fn remember(&mut self, key: impl Into<String>, value: Value) {
        self.memory_bank.insert(key.into(), value);
    }
}

/// Append-only record of one top-level request and all of its tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// When the request finished executing.
    pub timestamp: DateTime<Utc>,
    /// The verbatim request text.
    pub request: String,
    /// Snapshot of the task list at completion.
    pub tasks: Vec<Task>,
    /// Per-task results, in plan order.
    pub results: Vec<Value>,
}

/// Summary returned by `execute` for one top-level request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionSummary {
    /// The verbatim request text.
    pub request: String,
    /// Number of tasks the plan produced (all are attempted).
    pub tasks_executed: usize,
    /// Per-task results, in plan order.
    pub results: Vec<Value>,
    /// Mode the orchestrator was in.
    pub mode: OperationalMode,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mode_round_trip() {
        for mode in [
            OperationalMode::NoLlm,
            OperationalMode::Assisted,
            OperationalMode::Agent,
            OperationalMode::Hybrid,
        ] {
            let parsed: OperationalMode = mode.to_string().parse().unwrap();
            assert_eq!(parsed, mode);
        }
        assert!("copilot".parse::<OperationalMode>().is_err());
    }

    #[test]
    fn test_context_recording() {
        let mut ctx = AgentContext::default();
        ctx.record_request("calculate 2+2");
        ctx.remember("last_topic", json!("math"));
        assert_eq!(ctx.conversation_history.len(), 1);
        assert_eq!(ctx.conversation_history[0].request, "calculate 2+2");
        assert_eq!(ctx.memory_bank["last_topic"], json!("math"));
    }
}
