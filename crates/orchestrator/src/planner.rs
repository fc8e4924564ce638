//! Deterministic task decomposition.
//!
//! The planner is a policy table, not a language engine: an ordered list of
//! rules, each pairing a predicate over the request text with a requirement
//! tag set. Every rule that fires contributes one task; when none fire, a
//! single fallback task with the `general` requirement carries the verbatim
//! request.

use serde_json::json;

use taskmesh_core::{traits::TaskPlanner, types::Task};

/// One planning rule.
pub struct PlanRule {
    matcher: Box<dyn Fn(&str) -> bool + Send + Sync>,
    requirements: Vec<String>,
    description: String,
    context_key: String,
}

impl PlanRule {
    /// Create a rule with an arbitrary predicate.
    pub fn new(
        matcher: impl Fn(&str) -> bool + Send + Sync + 'static,
        requirements: Vec<&str>,
        description: impl Into<String>,
        context_key: impl Into<String>,
    ) -> Self {
        Self {
            matcher: Box::new(matcher),
            requirements: requirements.into_iter().map(String::from).collect(),
            description: description.into(),
            context_key: context_key.into(),
        }
    }

    /// Create a rule that fires when the request contains `keyword`
    /// (case-insensitive).
    pub fn keyword(
        keyword: &str,
        requirements: Vec<&str>,
        description: impl Into<String>,
        context_key: impl Into<String>,
    ) -> Self {
        let keyword = keyword.to_lowercase();
        Self::new(
            move |request: &str| request.to_lowercase().contains(&keyword),
            requirements,
            description,
            context_key,
        )
    }

    fn fire(&self, request: &str) -> Option<Task> {
        if !(self.matcher)(request) {
            return None;
        }
        Some(Task::new(
            self.description.clone(),
            self.requirements.clone(),
            json!({ self.context_key.clone(): request }),
        ))
    }
}

/// Rule-table planner.
pub struct RulePlanner {
    rules: Vec<PlanRule>,
}

impl RulePlanner {
    /// Create a planner from an explicit rule table, evaluated in order.
    pub fn new(rules: Vec<PlanRule>) -> Self {
        Self { rules }
    }

    /// The default rule table.
    pub fn with_default_rules() -> Self {
        Self::new(vec![
            PlanRule::keyword(
                "calculate",
                vec!["arithmetic", "math"],
                "Perform arithmetic calculation",
                "input",
            ),
            PlanRule::keyword(
                "search",
                vec!["search", "information_retrieval"],
                "Search for information",
                "query",
            ),
            PlanRule::keyword(
                "analyze",
                vec!["data_analysis", "statistics"],
                "Analyze data",
                "data",
            ),
        ])
    }
}

impl Default for RulePlanner {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

impl TaskPlanner for RulePlanner {
    fn plan(&self, request: &str) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .rules
            .iter()
            .filter_map(|rule| rule.fire(request))
            .collect();

        if tasks.is_empty() {
            tasks.push(Task::new(
                request,
                vec!["general".to_string()],
                json!({ "original_request": request }),
            ));
        }

        tracing::debug!(request = %request, tasks = tasks.len(), "Planned request");
        tasks
    }
}
