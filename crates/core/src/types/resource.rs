use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Resource Types
// =============================================================================

/// Well-known performance metric keys.
pub mod metric {
    /// Running success ratio in percent (0..=100).
    pub const SUCCESS_RATE: &str = "success_rate";
    /// Running mean response time in milliseconds.
    pub const AVG_RESPONSE_TIME: &str = "avg_response_time";
    /// Total number of recorded invocations.
    pub const USAGE_COUNT: &str = "usage_count";
}

/// Invocation class of a resource.
///
/// Closed set: agent-class resources receive a task description plus context,
/// tool-class resources receive a tool name plus parameters. Anything else is
/// carried verbatim and rejected at the dispatch point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceClass {
    /// Invoked with (endpoint, task description, task context).
    Agent,
    /// Invoked with (endpoint, tool name, parameters).
    Tool,
    /// Unrecognized class string; never invoked.
    Other(String),
}

impl From<String> for ResourceClass {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "agent" => Self::Agent,
            "tool" => Self::Tool,
            _ => Self::Other(s),
        }
    }
}

impl From<ResourceClass> for String {
    fn from(class: ResourceClass) -> Self {
        class.to_string()
    }
}

impl std::fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Agent => write!(f, "agent"),
            Self::Tool => write!(f, "tool"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

/// A remotely invocable capability provider, as seen by an orchestrator.
///
/// Instances are shared-nothing snapshots: a cached copy never reaches back
/// into the registry it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Unique ID within the owning registry.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Capability tags. Non-empty.
    pub capabilities: Vec<String>,

    /// Address used by the dispatcher.
    pub endpoint: String,

    /// Invocation class.
    pub class: ResourceClass,

    /// Opaque descriptor from the registry.
    pub manifest: Value,

    /// ID of the registry that owns the canonical record.
    pub registry_id: String,

    /// Performance metric snapshot (see [`metric`] for well-known keys).
    pub metrics: HashMap<String, f64>,
}

impl Resource {
    /// Whether this resource advertises the given capability tag.
    pub fn has_capability(&self, tag: &str) -> bool {
        self.capabilities.iter().any(|c| c == tag)
    }

    /// Whether at least one requirement tag is covered.
    pub fn matches(&self, requirements: &[String]) -> bool {
        requirements.iter().any(|req| self.has_capability(req))
    }

    /// Number of requirement tags covered exactly.
    pub fn match_count(&self, requirements: &[String]) -> usize {
        requirements
            .iter()
            .filter(|req| self.has_capability(req))
            .count()
    }

    /// Read a metric value if present.
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

/// Registration input for a registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Caller-supplied ID. Generated when absent.
    pub id: Option<String>,
    /// Display name.
    pub name: String,
    /// Capability tags.
    pub capabilities: Vec<String>,
    /// Address used by the dispatcher.
    pub endpoint: String,
    /// Invocation class.
    pub class: ResourceClass,
    /// Opaque descriptor payload.
    pub manifest: Value,
}

impl ResourceDescriptor {
    /// Create a descriptor with the required fields.
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            capabilities: Vec::new(),
            endpoint: endpoint.into(),
            class: ResourceClass::Tool,
            manifest: Value::Null,
        }
    }

    /// Set an explicit ID.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add capability tags.
    pub fn with_capabilities(mut self, caps: Vec<&str>) -> Self {
        self.capabilities = caps.into_iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set the invocation class.
    pub fn with_class(mut self, class: ResourceClass) -> Self {
        self.class = class;
        self
    }

    /// Attach an opaque manifest payload.
    pub fn with_manifest(mut self, manifest: Value) -> Self {
        self.manifest = manifest;
        self
    }
}

/// Registry-side record for a registered resource.
///
/// Created on `register`, mutated by test and metrics updates, never
/// physically deleted: clearing `active` is the only removal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredResource {
    /// The resource as handed out to callers (metrics included).
    pub resource: Resource,

    /// Registration timestamp.
    pub registered_at: DateTime<Utc>,

    /// When the resource was last probed, if ever.
    pub last_tested: Option<DateTime<Utc>>,

    /// Most recent probe report.
    pub test_results: Value,

    /// Whether the resource may surface in search results.
    pub active: bool,
}

impl RegisteredResource {
    /// Wrap a freshly validated resource.
    pub fn new(resource: Resource, registered_at: DateTime<Utc>) -> Self {
        Self {
            resource,
            registered_at,
            last_tested: None,
            test_results: Value::Null,
            active: true,
        }
    }
}
