//! Named reasoning strategies.
//!
//! The built-in strategies are hook-shaped placeholders: each one accepts a
//! task plus prior observations and returns a next-action decision. A
//! semantic implementation registers under the same name and the engine
//! picks it up unchanged.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use taskmesh_core::{
    traits::{NextAction, ReasoningStrategy},
    types::Task,
    Result,
};

/// Reason-act-observe cycle hook.
pub struct ReactStrategy;

#[async_trait]
impl ReasoningStrategy for ReactStrategy {
    fn name(&self) -> &str {
        "react"
    }

    async fn decide(&self, task: &Task, _observations: &[Value]) -> Result<NextAction> {
        tracing::debug!(task = %task.id, "react strategy: defaulting to discovery");
        Ok(NextAction::Discover)
    }
}

/// Reasoning-without-observation hook.
pub struct RewooStrategy;

#[async_trait]
impl ReasoningStrategy for RewooStrategy {
    fn name(&self) -> &str {
        "rewoo"
    }

    async fn decide(&self, task: &Task, _observations: &[Value]) -> Result<NextAction> {
        tracing::debug!(task = %task.id, "rewoo strategy: defaulting to discovery");
        Ok(NextAction::Discover)
    }
}

/// Tree-of-thoughts hook.
pub struct TreeOfThoughtsStrategy;

#[async_trait]
impl ReasoningStrategy for TreeOfThoughtsStrategy {
    fn name(&self) -> &str {
        "tree-of-thoughts"
    }

    async fn decide(&self, task: &Task, _observations: &[Value]) -> Result<NextAction> {
        tracing::debug!(task = %task.id, "tree-of-thoughts strategy: defaulting to discovery");
        Ok(NextAction::Discover)
    }
}

/// Name-keyed lookup table of reasoning strategies.
pub struct StrategyRegistry {
    strategies: DashMap<String, Arc<dyn ReasoningStrategy>>,
}

impl StrategyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            strategies: DashMap::new(),
        }
    }

    /// Create a registry with the built-in placeholder strategies.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(Arc::new(ReactStrategy));
        registry.register(Arc::new(RewooStrategy));
        registry.register(Arc::new(TreeOfThoughtsStrategy));
        registry
    }

    /// Register a strategy under its own name. Latest registration wins.
    pub fn register(&self, strategy: Arc<dyn ReasoningStrategy>) {
        self.strategies
            .insert(strategy.name().to_string(), strategy);
    }

    /// Look up a strategy by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ReasoningStrategy>> {
        self.strategies.get(name).map(|e| e.value().clone())
    }

    /// Whether a strategy name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Registered strategy names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> =
            self.strategies.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
