//! Gateway-side resource registry.
//!
//! A `ResourceGateway` owns its `RegisteredResource` records exclusively and
//! hands out shared-nothing `Resource` snapshots. The resource map and the
//! capability index mutate together under one lock, so a concurrent search
//! never observes a partially indexed resource.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock as StdRwLock};
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use url::Url;
use uuid::Uuid;

use taskmesh_core::{
    config::RegistryConfig,
    traits::{ResourceDiscovery, ResourcePredicate},
    types::{metric, InvocationOutcome, RegisteredResource, Resource, ResourceDescriptor},
    Error, Result,
};

use crate::scoring;

#[derive(Default)]
struct GatewayState {
    /// Canonical records, by resource ID.
    resources: HashMap<String, RegisteredResource>,
    /// Capability tag -> resource IDs, insertion order preserved.
    capability_index: HashMap<String, Vec<String>>,
}

/// Observability counters for one gateway instance.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GatewayMetrics {
    /// Resources ever registered.
    pub total_resources: u64,
    /// Searches served, including empty-result ones.
    pub total_queries: u64,
    /// Searches that returned at least one candidate.
    pub successful_matches: u64,
    /// Running mean search latency over all queries.
    pub average_search_time_ms: f64,
}

/// A registry instance holding capability-indexed resource records.
pub struct ResourceGateway {
    id: String,
    name: String,
    endpoint: String,
    config: RegistryConfig,
    state: RwLock<GatewayState>,
    predicates: StdRwLock<Vec<Arc<dyn ResourcePredicate>>>,
    metrics: Mutex<GatewayMetrics>,
}

impl ResourceGateway {
    /// Create a new gateway.
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, config: RegistryConfig) -> Self {
        let name = name.into();
        let endpoint = endpoint.into();
        tracing::info!(gateway = %name, endpoint = %endpoint, "Gateway initialized");
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            endpoint,
            config,
            state: RwLock::new(GatewayState::default()),
            predicates: StdRwLock::new(Vec::new()),
            metrics: Mutex::new(GatewayMetrics::default()),
        }
    }

    /// Gateway ID. Resources registered here carry it as `registry_id`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Gateway display name.
    pub fn gateway_name(&self) -> &str {
        &self.name
    }

    /// Advertised gateway endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Append a predicate to the chain consulted on every search.
    pub fn add_predicate(&self, predicate: Arc<dyn ResourcePredicate>) {
        tracing::info!(gateway = %self.name, predicate = %predicate.name(), "Registering predicate");
        self.predicates.write().unwrap().push(predicate);
    }

    /// Register a resource described by `descriptor`.
    ///
    /// Validates required fields, generates an ID when none is supplied, and
    /// indexes the resource under every one of its capability tags. Returns
    /// `Validation` on bad input with the registry left unchanged.
    pub async fn register(&self, descriptor: ResourceDescriptor) -> Result<String> {
        let name = descriptor.name.trim();
        if name.is_empty() {
            return Err(Error::validation("resource name must not be empty"));
        }
        if descriptor.capabilities.is_empty() {
            return Err(Error::validation("capability set must not be empty"));
        }
        if descriptor.capabilities.iter().any(|c| c.trim().is_empty()) {
            return Err(Error::validation("capability tags must not be empty"));
        }
        validate_endpoint(&descriptor.endpoint)?;

        let id = descriptor
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut metrics = HashMap::new();
        metrics.insert(metric::USAGE_COUNT.to_string(), 0.0);
        metrics.insert(metric::SUCCESS_RATE.to_string(), 100.0);
        metrics.insert(metric::AVG_RESPONSE_TIME.to_string(), 0.0);

        let resource = Resource {
            id: id.clone(),
            name: name.to_string(),
            capabilities: descriptor.capabilities,
            endpoint: descriptor.endpoint,
            class: descriptor.class,
            manifest: descriptor.manifest,
            registry_id: self.id.clone(),
            metrics,
        };

        {
            let mut state = self.state.write().await;
            if state.resources.contains_key(&id) {
                return Err(Error::validation(format!(
                    "resource id '{}' is already registered",
                    id
                )));
            }
            let mut indexed = HashSet::new();
            for tag in &resource.capabilities {
                if indexed.insert(tag.clone()) {
                    state
                        .capability_index
                        .entry(tag.clone())
                        .or_default()
                        .push(id.clone());
                }
            }
            state
                .resources
                .insert(id.clone(), RegisteredResource::new(resource, Utc::now()));
        }

        self.metrics.lock().unwrap().total_resources += 1;
        tracing::info!(gateway = %self.name, resource = %id, "Registered resource");
        Ok(id)
    }

    /// Search active resources matching the requirement set, best first.
    ///
    /// Candidates are gathered through the capability index (exact tags plus
    /// fuzzy recall for near-synonym tags), filtered through the predicate
    /// chain, scored, and ordered by score with ties broken by earliest
    /// registration time. Returns an empty list when nothing matches.
    pub async fn search(&self, requirements: &[String]) -> Result<Vec<Resource>> {
        let started = Instant::now();
        let predicates = self.predicates.read().unwrap().clone();

        let mut scored: Vec<(f64, DateTime<Utc>, Resource)> = Vec::new();
        {
            let state = self.state.read().await;

            let mut seen = HashSet::new();
            let mut candidate_ids = Vec::new();
            for req in requirements {
                if let Some(ids) = state.capability_index.get(req) {
                    for id in ids {
                        if seen.insert(id.clone()) {
                            candidate_ids.push(id.clone());
                        }
                    }
                } else {
                    // Near-synonym tags still surface their resources.
                    for (tag, ids) in &state.capability_index {
                        if scoring::capability_similarity(tag, req)
                            >= self.config.similarity_threshold
                        {
                            for id in ids {
                                if seen.insert(id.clone()) {
                                    candidate_ids.push(id.clone());
                                }
                            }
                        }
                    }
                }
            }

            'candidates: for id in candidate_ids {
                let Some(entry) = state.resources.get(&id) else {
                    continue;
                };
                if !entry.active {
                    continue;
                }
                for predicate in &predicates {
                    if !predicate.allow(&entry.resource, requirements) {
                        tracing::debug!(
                            gateway = %self.name,
                            resource = %id,
                            predicate = %predicate.name(),
                            "Candidate rejected by predicate"
                        );
                        continue 'candidates;
                    }
                }
                let score =
                    scoring::relevance_score(entry, requirements, self.config.similarity_threshold);
                scored.push((score, entry.registered_at, entry.resource.clone()));
            }
        }

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.cmp(&b.1))
                .then_with(|| a.2.id.cmp(&b.2.id))
        });
        let results: Vec<Resource> = scored.into_iter().map(|(_, _, r)| r).collect();

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        {
            let mut m = self.metrics.lock().unwrap();
            m.total_queries += 1;
            if !results.is_empty() {
                m.successful_matches += 1;
            }
            let n = m.total_queries as f64;
            m.average_search_time_ms += (elapsed_ms - m.average_search_time_ms) / n;
        }

        tracing::debug!(
            gateway = %self.name,
            requirements = ?requirements,
            hits = results.len(),
            "Search complete"
        );
        Ok(results)
    }

    /// Fold an invocation outcome into the resource's running metrics.
    pub async fn update_metrics(
        &self,
        resource_id: &str,
        outcome: &InvocationOutcome,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        let entry = state
            .resources
            .get_mut(resource_id)
            .ok_or_else(|| Error::not_found(format!("resource '{}'", resource_id)))?;

        let metrics = &mut entry.resource.metrics;
        let prior_count = metrics.get(metric::USAGE_COUNT).copied().unwrap_or(0.0);
        let prior_rate = metrics.get(metric::SUCCESS_RATE).copied().unwrap_or(100.0);
        let prior_avg = metrics
            .get(metric::AVG_RESPONSE_TIME)
            .copied()
            .unwrap_or(0.0);

        let count = prior_count + 1.0;
        let successes =
            prior_rate / 100.0 * prior_count + if outcome.success { 1.0 } else { 0.0 };

        metrics.insert(metric::USAGE_COUNT.to_string(), count);
        metrics.insert(metric::SUCCESS_RATE.to_string(), successes / count * 100.0);
        metrics.insert(
            metric::AVG_RESPONSE_TIME.to_string(),
            (prior_avg * prior_count + outcome.response_time_ms) / count,
        );

        tracing::debug!(
            gateway = %self.name,
            resource = %resource_id,
            success = outcome.success,
            "Updated resource metrics"
        );
        Ok(())
    }

    /// Record a probe result for a resource.
    ///
    /// Stamps `last_tested` and stores the report. When testing is enabled, a
    /// failed probe deactivates the resource so it stops surfacing in search
    /// results.
    pub async fn record_test(&self, resource_id: &str, passed: bool, report: Value) -> Result<()> {
        let mut state = self.state.write().await;
        let entry = state
            .resources
            .get_mut(resource_id)
            .ok_or_else(|| Error::not_found(format!("resource '{}'", resource_id)))?;

        entry.last_tested = Some(Utc::now());
        entry.test_results = report;
        if self.config.enable_testing && !passed {
            entry.active = false;
            tracing::warn!(
                gateway = %self.name,
                resource = %resource_id,
                "Deactivating resource after failed probe"
            );
        }
        Ok(())
    }

    /// Toggle a resource's active flag. Deactivation is the only removal.
    pub async fn set_active(&self, resource_id: &str, active: bool) -> Result<()> {
        let mut state = self.state.write().await;
        let entry = state
            .resources
            .get_mut(resource_id)
            .ok_or_else(|| Error::not_found(format!("resource '{}'", resource_id)))?;
        entry.active = active;
        Ok(())
    }

    /// Fetch one registered record. Read-only.
    pub async fn get(&self, resource_id: &str) -> Option<RegisteredResource> {
        self.state.read().await.resources.get(resource_id).cloned()
    }

    /// List all registered records, oldest first. Read-only.
    pub async fn list(&self) -> Vec<RegisteredResource> {
        let state = self.state.read().await;
        let mut entries: Vec<RegisteredResource> = state.resources.values().cloned().collect();
        entries.sort_by(|a, b| {
            a.registered_at
                .cmp(&b.registered_at)
                .then_with(|| a.resource.id.cmp(&b.resource.id))
        });
        entries
    }

    /// Snapshot of the gateway's observability counters.
    pub fn metrics(&self) -> GatewayMetrics {
        self.metrics.lock().unwrap().clone()
    }
}

fn validate_endpoint(endpoint: &str) -> Result<()> {
    let url = Url::parse(endpoint)
        .map_err(|e| Error::validation(format!("endpoint '{}' is not addressable: {}", endpoint, e)))?;
    if matches!(url.scheme(), "http" | "https" | "ws" | "wss") && url.host_str().is_none() {
        return Err(Error::validation(format!(
            "endpoint '{}' is missing a host",
            endpoint
        )));
    }
    Ok(())
}

#[async_trait]
impl ResourceDiscovery for ResourceGateway {
    fn registry_id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, requirements: &[String]) -> Result<Vec<Resource>> {
        ResourceGateway::search(self, requirements).await
    }

    async fn update_metrics(
        &self,
        resource_id: &str,
        outcome: &InvocationOutcome,
    ) -> Result<()> {
        ResourceGateway::update_metrics(self, resource_id, outcome).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use taskmesh_core::types::ResourceClass;

    fn gateway() -> ResourceGateway {
        ResourceGateway::new("test-gateway", "http://localhost:8000", RegistryConfig::default())
    }

    fn descriptor(name: &str, caps: Vec<&str>) -> ResourceDescriptor {
        ResourceDescriptor::new(name, "http://localhost:9001")
            .with_capabilities(caps)
            .with_class(ResourceClass::Tool)
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let gw = gateway();

        let missing_caps = ResourceDescriptor::new("calc", "http://localhost:9001");
        assert!(matches!(
            gw.register(missing_caps).await,
            Err(Error::Validation(_))
        ));

        let blank_name = descriptor("  ", vec!["math"]);
        assert!(matches!(
            gw.register(blank_name).await,
            Err(Error::Validation(_))
        ));

        let bad_endpoint = ResourceDescriptor::new("calc", "not a url")
            .with_capabilities(vec!["math"]);
        assert!(matches!(
            gw.register(bad_endpoint).await,
            Err(Error::Validation(_))
        ));

        // Failed registrations leave the registry unchanged.
        assert!(gw.list().await.is_empty());
        assert_eq!(gw.metrics().total_resources, 0);
    }

    #[tokio::test]
    async fn test_register_then_search_by_each_tag() {
        let gw = gateway();
        let id = gw
            .register(descriptor("calc", vec!["arithmetic", "math"]))
            .await
            .unwrap();

        for tag in ["arithmetic", "math"] {
            let hits = gw.search(&[tag.to_string()]).await.unwrap();
            assert_eq!(hits.len(), 1, "tag {} should hit", tag);
            assert_eq!(hits[0].id, id);
        }
    }

    #[tokio::test]
    async fn test_duplicate_explicit_id_rejected() {
        let gw = gateway();
        gw.register(descriptor("a", vec!["x"]).with_id("fixed"))
            .await
            .unwrap();
        let err = gw
            .register(descriptor("b", vec!["y"]).with_id("fixed"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_metrics_running_averages() {
        let gw = gateway();
        let id = gw.register(descriptor("calc", vec!["math"])).await.unwrap();

        gw.update_metrics(&id, &InvocationOutcome::success(100.0))
            .await
            .unwrap();
        gw.update_metrics(&id, &InvocationOutcome::failure(300.0))
            .await
            .unwrap();

        let entry = gw.get(&id).await.unwrap();
        assert_eq!(entry.resource.metric(metric::USAGE_COUNT), Some(2.0));
        assert_eq!(entry.resource.metric(metric::SUCCESS_RATE), Some(50.0));
        assert_eq!(entry.resource.metric(metric::AVG_RESPONSE_TIME), Some(200.0));
    }

    #[tokio::test]
    async fn test_update_metrics_unknown_resource() {
        let gw = gateway();
        let err = gw
            .update_metrics("ghost", &InvocationOutcome::success(1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_failed_probe_deactivates() {
        let gw = gateway();
        let id = gw.register(descriptor("calc", vec!["math"])).await.unwrap();

        gw.record_test(&id, false, json!({"probe": "timeout"}))
            .await
            .unwrap();

        let entry = gw.get(&id).await.unwrap();
        assert!(!entry.active);
        assert!(entry.last_tested.is_some());
        assert!(gw.search(&["math".to_string()]).await.unwrap().is_empty());

        gw.set_active(&id, true).await.unwrap();
        assert_eq!(gw.search(&["math".to_string()]).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_counts_metrics() {
        let gw = gateway();
        gw.register(descriptor("calc", vec!["math"])).await.unwrap();

        gw.search(&["math".to_string()]).await.unwrap();
        gw.search(&["nonexistent-capability-zzz".to_string()])
            .await
            .unwrap();

        let m = gw.metrics();
        assert_eq!(m.total_queries, 2);
        assert_eq!(m.successful_matches, 1);
        assert!(m.average_search_time_ms >= 0.0);
    }
}
