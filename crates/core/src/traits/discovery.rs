//! Registry discovery interface.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{InvocationOutcome, Resource};

/// A registry the orchestrator can discover resources through.
///
/// Orchestrators treat registries polymorphically and must tolerate any
/// subset being unreachable; `search` returning `Err` is logged and the
/// remaining registries are still consulted.
#[async_trait]
pub trait ResourceDiscovery: Send + Sync {
    /// Stable ID of this registry; resources carry it as `registry_id`.
    fn registry_id(&self) -> &str;

    /// Human-readable registry name, for logging.
    fn name(&self) -> &str;

    /// Return resources matching the requirement set, best first.
    ///
    /// An empty result is `Ok(vec![])`, not an error.
    async fn search(&self, requirements: &[String]) -> Result<Vec<Resource>>;

    /// Feed an invocation outcome back into the registry-side metrics.
    ///
    /// Returns `NotFound` for unknown resource IDs; must never panic.
    async fn update_metrics(
        &self,
        resource_id: &str,
        outcome: &InvocationOutcome,
    ) -> Result<()>;
}
