//! The orchestrator / execution engine.
//!
//! Drives the plan -> discover -> select -> invoke -> record loop. Tasks
//! within one plan are independent and execute concurrently; one task's
//! failure never prevents the others from running, and `execute` always
//! returns a summary.

use std::collections::HashSet;
use std::sync::{Arc, RwLock as StdRwLock};
use std::time::{Duration, Instant};

use chrono::Utc;
use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;

use taskmesh_core::{
    config::{DispatchConfig, OrchestratorConfig},
    traits::{NextAction, ResourceDiscovery, TaskPlanner},
    types::{
        AgentContext, Envelope, ExecutionRecord, ExecutionSummary, InvocationOutcome,
        OperationalMode, Resource, Task,
    },
    Error, Result,
};
use taskmesh_dispatch::ProtocolDispatcher;

use crate::cache::{filter_and_rank, ResourcePool};
use crate::planner::RulePlanner;
use crate::strategy::StrategyRegistry;

/// Central orchestrator: plans requests, discovers resources through
/// connected registries, and records execution outcomes.
pub struct Orchestrator {
    id: String,
    name: String,
    config: OrchestratorConfig,
    mode: StdRwLock<OperationalMode>,
    planner: Arc<dyn TaskPlanner>,
    dispatcher: Arc<ProtocolDispatcher>,
    registries: StdRwLock<Vec<Arc<dyn ResourceDiscovery>>>,
    pool: ResourcePool,
    strategies: StrategyRegistry,
    current_strategy: StdRwLock<String>,
    history: Mutex<Vec<ExecutionRecord>>,
    context: Mutex<AgentContext>,
}

impl Orchestrator {
    /// Start building an orchestrator.
    pub fn builder(name: impl Into<String>) -> OrchestratorBuilder {
        OrchestratorBuilder {
            name: name.into(),
            config: OrchestratorConfig::default(),
            planner: None,
            dispatcher: None,
            strategies: None,
        }
    }

    /// Orchestrator instance ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Orchestrator display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Connect a registry for discovery.
    pub fn connect_registry(&self, registry: Arc<dyn ResourceDiscovery>) {
        tracing::info!(
            orchestrator = %self.name,
            registry = %registry.name(),
            "Connected to registry"
        );
        self.registries.write().unwrap().push(registry);
    }

    /// Current operational mode.
    pub fn mode(&self) -> OperationalMode {
        *self.mode.read().unwrap()
    }

    /// Switch operational mode.
    pub fn set_mode(&self, mode: OperationalMode) {
        tracing::info!(orchestrator = %self.name, mode = %mode, "Operation mode changed");
        *self.mode.write().unwrap() = mode;
    }

    /// Name of the currently selected reasoning strategy.
    pub fn current_strategy(&self) -> String {
        self.current_strategy.read().unwrap().clone()
    }

    /// Select a reasoning strategy by name.
    pub fn set_strategy(&self, name: &str) -> Result<()> {
        if !self.strategies.contains(name) {
            return Err(Error::not_found(format!(
                "strategy '{}' (available: {:?})",
                name,
                self.strategies.names()
            )));
        }
        tracing::info!(orchestrator = %self.name, strategy = %name, "Strategy changed");
        *self.current_strategy.write().unwrap() = name.to_string();
        Ok(())
    }

    /// The local resource pool.
    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    /// Snapshot of the execution history.
    pub async fn history(&self) -> Vec<ExecutionRecord> {
        self.history.lock().await.clone()
    }

    /// Snapshot of the conversational context.
    pub async fn context(&self) -> AgentContext {
        self.context.lock().await.clone()
    }

    /// Execute one top-level request.
    ///
    /// Plans the request, runs every task concurrently, appends one
    /// execution record, and returns the summary. Individual task failures
    /// surface in `results`; this call itself never fails.
    pub async fn execute(&self, request: &str) -> ExecutionSummary {
        tracing::info!(orchestrator = %self.name, request = %request, "Executing request");

        self.context.lock().await.record_request(request);

        let planned = self.planner.plan(request);
        let futures: Vec<_> = planned.into_iter().map(|t| self.run_task(t)).collect();
        let tasks: Vec<Task> = futures::future::join_all(futures).await;

        let results: Vec<Value> = tasks
            .iter()
            .map(|t| t.result.clone().unwrap_or(Value::Null))
            .collect();

        self.history.lock().await.push(ExecutionRecord {
            timestamp: Utc::now(),
            request: request.to_string(),
            tasks: tasks.clone(),
            results: results.clone(),
        });
        self.context
            .lock()
            .await
            .task_history
            .extend(tasks.iter().cloned());

        ExecutionSummary {
            request: request.to_string(),
            tasks_executed: tasks.len(),
            results,
            mode: self.mode(),
        }
    }

    /// Run one task to a terminal state.
    async fn run_task(&self, mut task: Task) -> Task {
        task.start();

        // Strategy hook: invoked where the default selection heuristic would
        // otherwise apply. Observations accumulate only when an external
        // decorator re-enters with prior envelopes.
        let strategy_name = self.current_strategy();
        let action = match self.strategies.get(&strategy_name) {
            Some(strategy) => match strategy.decide(&task, &[]).await {
                Ok(action) => action,
                Err(e) => {
                    tracing::warn!(task = %task.id, strategy = %strategy_name, error = %e, "Strategy failed; falling back to discovery");
                    NextAction::Discover
                }
            },
            None => NextAction::Discover,
        };

        let mut selected: Option<Resource> = match action {
            NextAction::Terminate(reason) => {
                tracing::info!(task = %task.id, reason = %reason, "Strategy terminated task");
                task.fail(Envelope::failure("Terminated", reason).to_value());
                return task;
            }
            NextAction::UseResource(id) => self.pool.get(&id).await,
            NextAction::Discover => None,
        };

        // Local pool first; registry discovery only on a miss.
        if selected.is_none() {
            selected = self.pool.find_local(&task.requirements).await;
        }
        if selected.is_none() {
            selected = self.discover(&task.requirements).await.into_iter().next();
        }

        let Some(resource) = selected else {
            tracing::warn!(task = %task.id, requirements = ?task.requirements, "No suitable resource");
            let error = Error::no_suitable_resource(format!(
                "no resource covers requirements {:?}",
                task.requirements
            ));
            task.fail(Envelope::from_error(&error).to_value());
            return task;
        };

        task.assigned_resource = Some(resource.id.clone());
        tracing::info!(task = %task.id, resource = %resource.name, "Invoking resource");

        let started = Instant::now();
        let envelope = self
            .dispatcher
            .invoke_with_timeout(
                &resource,
                &task,
                Duration::from_millis(self.config.invoke_timeout_ms),
            )
            .await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        if envelope.ok {
            task.complete(envelope.to_value());
            self.pool.put(resource.clone()).await;
            self.report_outcome(&resource, InvocationOutcome::success(elapsed_ms))
                .await;
        } else {
            tracing::warn!(
                task = %task.id,
                resource = %resource.id,
                error = ?envelope.error,
                "Invocation failed"
            );
            task.fail(envelope.to_value());
        }

        task
    }

    /// Query every connected registry, merge and dedupe candidates, and rank
    /// them against the requirements.
    ///
    /// Unreachable or slow registries are logged and skipped.
    async fn discover(&self, requirements: &[String]) -> Vec<Resource> {
        let registries: Vec<Arc<dyn ResourceDiscovery>> =
            self.registries.read().unwrap().clone();
        let timeout = Duration::from_millis(self.config.search_timeout_ms);

        let mut seen = HashSet::new();
        let mut merged: Vec<Resource> = Vec::new();
        for registry in registries {
            match tokio::time::timeout(timeout, registry.search(requirements)).await {
                Ok(Ok(resources)) => {
                    for resource in resources {
                        // First occurrence wins.
                        if seen.insert(resource.id.clone()) {
                            merged.push(resource);
                        }
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!(registry = %registry.name(), error = %e, "Registry search failed; continuing");
                }
                Err(_) => {
                    tracing::warn!(registry = %registry.name(), "Registry search timed out; continuing");
                }
            }
        }

        filter_and_rank(merged, requirements)
    }

    /// Feed an invocation outcome back to the owning registry, best-effort.
    async fn report_outcome(&self, resource: &Resource, outcome: InvocationOutcome) {
        let registry = {
            let registries = self.registries.read().unwrap();
            registries
                .iter()
                .find(|r| r.registry_id() == resource.registry_id)
                .cloned()
        };

        match registry {
            Some(registry) => {
                if let Err(e) = registry.update_metrics(&resource.id, &outcome).await {
                    tracing::warn!(resource = %resource.id, error = %e, "Metrics update failed");
                }
            }
            None => {
                tracing::debug!(resource = %resource.id, "Owning registry not connected; skipping metrics");
            }
        }
    }
}

/// Builder for [`Orchestrator`].
pub struct OrchestratorBuilder {
    name: String,
    config: OrchestratorConfig,
    planner: Option<Arc<dyn TaskPlanner>>,
    dispatcher: Option<Arc<ProtocolDispatcher>>,
    strategies: Option<StrategyRegistry>,
}

impl OrchestratorBuilder {
    /// Use the given orchestrator configuration.
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom planner instead of the default rule table.
    pub fn with_planner(mut self, planner: Arc<dyn TaskPlanner>) -> Self {
        self.planner = Some(planner);
        self
    }

    /// Use the given dispatcher.
    pub fn with_dispatcher(mut self, dispatcher: Arc<ProtocolDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Use a custom strategy registry instead of the built-in defaults.
    pub fn with_strategies(mut self, strategies: StrategyRegistry) -> Self {
        self.strategies = Some(strategies);
        self
    }

    /// Build the orchestrator.
    pub fn build(self) -> Orchestrator {
        let strategies = self.strategies.unwrap_or_default();

        let mode = self
            .config
            .mode
            .parse::<OperationalMode>()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to agent mode");
                OperationalMode::Agent
            });

        let current_strategy = if strategies.contains(&self.config.default_strategy) {
            self.config.default_strategy.clone()
        } else {
            tracing::warn!(
                strategy = %self.config.default_strategy,
                "Configured strategy not registered; falling back to react"
            );
            "react".to_string()
        };

        let orchestrator = Orchestrator {
            id: Uuid::new_v4().to_string(),
            name: self.name,
            config: self.config,
            mode: StdRwLock::new(mode),
            planner: self
                .planner
                .unwrap_or_else(|| Arc::new(RulePlanner::with_default_rules())),
            dispatcher: self
                .dispatcher
                .unwrap_or_else(|| Arc::new(ProtocolDispatcher::new(DispatchConfig::default()))),
            registries: StdRwLock::new(Vec::new()),
            pool: ResourcePool::new(),
            strategies,
            current_strategy: StdRwLock::new(current_strategy),
            history: Mutex::new(Vec::new()),
            context: Mutex::new(AgentContext::default()),
        };

        tracing::info!(
            orchestrator = %orchestrator.name,
            mode = %orchestrator.mode(),
            strategy = %orchestrator.current_strategy(),
            "Orchestrator initialized"
        );
        orchestrator
    }
}
