use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// =============================================================================
// Task Types
// =============================================================================

/// Lifecycle status of a task.
///
/// Transitions are one-way: `Pending -> InProgress -> {Completed, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created, not yet picked up.
    Pending,
    /// Currently being executed.
    InProgress,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
}

impl TaskStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A single unit of work produced by the planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task ID, generated at creation.
    pub id: String,

    /// Human-readable description of what the task should accomplish.
    pub description: String,

    /// Capability tags a resource must cover. Order is preserved for display;
    /// matching treats this as a set.
    pub requirements: Vec<String>,

    /// Opaque payload handed to the invoked resource.
    pub context: Value,

    /// Current lifecycle status.
    pub status: TaskStatus,

    /// Result payload. Set exactly once, when the task reaches a terminal
    /// status.
    pub result: Option<Value>,

    /// ID of the resource chosen for this task, once one is selected.
    pub assigned_resource: Option<String>,
}

impl Task {
    /// Create a new pending task with a fresh ID.
    pub fn new(
        description: impl Into<String>,
        requirements: Vec<String>,
        context: Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description: description.into(),
            requirements,
            context,
            status: TaskStatus::Pending,
            result: None,
            assigned_resource: None,
        }
    }

    /// Move the task into `InProgress`. No-op unless the task is pending.
    pub fn start(&mut self) {
        if self.status == TaskStatus::Pending {
            self.status = TaskStatus::InProgress;
        }
    }

    /// Mark the task completed with its result. No-op if already terminal.
    pub fn complete(&mut self, result: Value) {
        if !self.status.is_terminal() {
            self.status = TaskStatus::Completed;
            self.result = Some(result);
        }
    }

    /// Mark the task failed with an error payload. No-op if already terminal.
    pub fn fail(&mut self, error: Value) {
        if !self.status.is_terminal() {
            self.status = TaskStatus::Failed;
            self.result = Some(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_task_is_pending() {
        let task = Task::new("do things", vec!["general".into()], json!({}));
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.result.is_none());
        assert!(task.assigned_resource.is_none());
        assert!(!task.id.is_empty());
    }

    #[test]
    fn test_transitions_are_one_way() {
        let mut task = Task::new("t", vec!["general".into()], json!({}));
        task.start();
        assert_eq!(task.status, TaskStatus::InProgress);

        task.complete(json!({"ok": true}));
        assert_eq!(task.status, TaskStatus::Completed);

        // Terminal states are sticky.
        task.fail(json!({"error": "late"}));
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.result, Some(json!({"ok": true})));
    }

    #[test]
    fn test_result_set_iff_terminal() {
        let mut task = Task::new("t", vec!["general".into()], json!({}));
        assert!(task.result.is_none());
        task.start();
        assert!(task.result.is_none());
        task.fail(json!({"error": "boom"}));
        assert!(task.status.is_terminal());
        assert!(task.result.is_some());
    }

    #[test]
    fn test_fresh_ids_are_unique() {
        let a = Task::new("a", vec!["general".into()], json!({}));
        let b = Task::new("b", vec!["general".into()], json!({}));
        assert_ne!(a.id, b.id);
    }
}
