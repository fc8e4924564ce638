use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

// =============================================================================
// Invocation Envelope Types
// =============================================================================

/// Error half of a result envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeError {
    /// Stable kind name (e.g. `TimeoutError`, `UnsupportedResourceClass`).
    pub kind: String,
    /// Human-readable detail.
    pub message: String,
}

/// Normalized result of one resource invocation.
///
/// Every protocol client's response is reduced to this shape before it
/// reaches the orchestrator; `ok` decides which of `value`/`error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Whether the invocation succeeded.
    pub ok: bool,
    /// Result payload, present iff `ok`.
    pub value: Option<Value>,
    /// Error detail, present iff `!ok`.
    pub error: Option<EnvelopeError>,
}

impl Envelope {
    /// Create a success envelope.
    pub fn success(value: Value) -> Self {
        Self {
            ok: true,
            value: Some(value),
            error: None,
        }
    }

    /// Create a failure envelope with an explicit kind.
    pub fn failure(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            value: None,
            error: Some(EnvelopeError {
                kind: kind.into(),
                message: message.into(),
            }),
        }
    }

    /// Create a failure envelope from a core error.
    pub fn from_error(error: &Error) -> Self {
        Self::failure(error.kind(), error.to_string())
    }

    /// Serialize into a JSON value for storage in a task result.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Payload handed to an invoker, shaped per resource class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InvokePayload {
    /// Agent-class invocation: the task description plus its context.
    Agent {
        /// Task description.
        description: String,
        /// Opaque task context.
        context: Value,
    },
    /// Tool-class invocation: a tool name plus parameters.
    Tool {
        /// Tool name on the remote endpoint.
        tool: String,
        /// Parameters derived from the task context.
        params: Value,
    },
}

/// Outcome of one invocation, fed back into registry-side metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvocationOutcome {
    /// Whether the invocation succeeded.
    pub success: bool,
    /// Observed wall-clock response time in milliseconds.
    pub response_time_ms: f64,
}

impl InvocationOutcome {
    /// Record a successful invocation.
    pub fn success(response_time_ms: f64) -> Self {
        Self {
            success: true,
            response_time_ms,
        }
    }

    /// Record a failed invocation.
    pub fn failure(response_time_ms: f64) -> Self {
        Self {
            success: false,
            response_time_ms,
        }
    }
}
