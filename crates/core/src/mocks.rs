//! Mock implementations of core traits for testing.
//!
//! This module provides mock implementations of the discovery, invoker, and
//! policy traits that can be used across the codebase for unit and
//! integration testing.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::{
    traits::{Invoker, ResourceDiscovery, ResourcePredicate},
    types::{Envelope, InvocationOutcome, InvokePayload, Resource},
    Error, Result,
};

// =============================================================================
// Mock Discovery
// =============================================================================

/// Seedable in-memory registry with call counters.
pub struct MockDiscovery {
    id: String,
    name: String,
    resources: Mutex<Vec<Resource>>,
    search_calls: Mutex<usize>,
    metric_updates: Mutex<Vec<(String, InvocationOutcome)>>,
    fail_searches: bool,
}

impl MockDiscovery {
    /// Create an empty mock registry.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: format!("mock-{}", id),
            resources: Mutex::new(Vec::new()),
            search_calls: Mutex::new(0),
            metric_updates: Mutex::new(Vec::new()),
            fail_searches: false,
        }
    }

    /// Seed the registry with resources.
    pub fn with_resources(id: &str, resources: Vec<Resource>) -> Self {
        let mock = Self::new(id);
        *mock.resources.lock().unwrap() = resources;
        mock
    }

    /// Create a registry whose every search fails, for unreachability tests.
    pub fn unreachable(id: &str) -> Self {
        let mut mock = Self::new(id);
        mock.fail_searches = true;
        mock
    }

    /// Number of `search` calls made against this mock.
    pub fn search_count(&self) -> usize {
        *self.search_calls.lock().unwrap()
    }

    /// Metric updates recorded so far, in call order.
    pub fn metric_updates(&self) -> Vec<(String, InvocationOutcome)> {
        self.metric_updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResourceDiscovery for MockDiscovery {
    fn registry_id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, requirements: &[String]) -> Result<Vec<Resource>> {
        *self.search_calls.lock().unwrap() += 1;

        if self.fail_searches {
            return Err(Error::connection("mock registry unreachable"));
        }

        let resources = self.resources.lock().unwrap();
        Ok(resources
            .iter()
            .filter(|r| r.matches(requirements))
            .cloned()
            .collect())
    }

    async fn update_metrics(
        &self,
        resource_id: &str,
        outcome: &InvocationOutcome,
    ) -> Result<()> {
        let known = self
            .resources
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.id == resource_id);
        if !known {
            return Err(Error::not_found(format!("resource '{}'", resource_id)));
        }
        self.metric_updates
            .lock()
            .unwrap()
            .push((resource_id.to_string(), *outcome));
        Ok(())
    }
}

// =============================================================================
// Mock Invoker
// =============================================================================

/// Scripted mock invoker that returns predefined envelopes.
pub struct MockInvoker {
    protocol: String,
    responses: Mutex<Vec<Envelope>>,
    call_count: Mutex<usize>,
    connect_count: Mutex<usize>,
    delay: Option<Duration>,
    fail_connect: bool,
}

impl MockInvoker {
    /// Create a mock with a queue of responses, replayed round-robin.
    pub fn new(responses: Vec<Envelope>) -> Self {
        Self {
            protocol: "mock".to_string(),
            responses: Mutex::new(responses),
            call_count: Mutex::new(0),
            connect_count: Mutex::new(0),
            delay: None,
            fail_connect: false,
        }
    }

    /// Create a mock that always succeeds with an echo of its payload.
    pub fn echoing() -> Self {
        Self::new(Vec::new())
    }

    /// Create a mock that always returns the same envelope.
    pub fn constant(envelope: Envelope) -> Self {
        Self::new(vec![envelope])
    }

    /// Sleep for `delay` before answering, for timeout tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make `connect` fail.
    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    /// Number of `invoke` calls made.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Number of `connect` calls made.
    pub fn connect_count(&self) -> usize {
        *self.connect_count.lock().unwrap()
    }
}

#[async_trait]
impl Invoker for MockInvoker {
    fn protocol(&self) -> &str {
        &self.protocol
    }

    async fn connect(&self) -> Result<()> {
        *self.connect_count.lock().unwrap() += 1;
        if self.fail_connect {
            return Err(Error::connection("mock connect refused"));
        }
        Ok(())
    }

    async fn invoke(&self, endpoint: &str, payload: InvokePayload) -> Result<Envelope> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let count = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            *count
        };

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Echo mode: describe what would have been invoked.
            let detail = match payload {
                InvokePayload::Agent { description, .. } => {
                    json!({"endpoint": endpoint, "executed": description})
                }
                InvokePayload::Tool { tool, params } => {
                    json!({"endpoint": endpoint, "tool": tool, "params": params})
                }
            };
            return Ok(Envelope::success(detail));
        }

        let idx = (count - 1) % responses.len();
        Ok(responses[idx].clone())
    }
}

// =============================================================================
// Mock Predicate
// =============================================================================

/// Predicate that rejects a fixed set of resource IDs.
pub struct MockPredicate {
    deny_ids: Vec<String>,
}

impl MockPredicate {
    pub fn denying(ids: Vec<&str>) -> Self {
        Self {
            deny_ids: ids.into_iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ResourcePredicate for MockPredicate {
    fn name(&self) -> &str {
        "mock_denylist"
    }

    fn allow(&self, resource: &Resource, _requirements: &[String]) -> bool {
        !self.deny_ids.contains(&resource.id)
    }
}
