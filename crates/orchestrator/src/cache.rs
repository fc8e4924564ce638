//! Local resource pool and candidate matcher.
//!
//! The pool holds shared-nothing snapshots of previously used resources,
//! scoped to one orchestrator. It is the only state shared between
//! concurrently executing tasks, so access goes through one mutex.

use tokio::sync::Mutex;

use taskmesh_core::types::Resource;

/// Per-orchestrator cache of resource snapshots.
///
/// Unbounded; eviction is an extension point, not a feature of this pool.
#[derive(Default)]
pub struct ResourcePool {
    entries: Mutex<Vec<Resource>>,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry with the resource's ID.
    ///
    /// Overwriting keeps the entry's original position, so `find_local`
    /// ordering stays stable.
    pub async fn put(&self, resource: Resource) {
        let mut entries = self.entries.lock().await;
        match entries.iter_mut().find(|r| r.id == resource.id) {
            Some(slot) => *slot = resource,
            None => entries.push(resource),
        }
    }

    /// First cached entry (by insertion order) covering at least one
    /// requirement tag.
    ///
    /// A best-effort fast path: deliberately not the most-relevant match.
    pub async fn find_local(&self, requirements: &[String]) -> Option<Resource> {
        let entries = self.entries.lock().await;
        entries.iter().find(|r| r.matches(requirements)).cloned()
    }

    /// Fetch a cached entry by ID.
    pub async fn get(&self, resource_id: &str) -> Option<Resource> {
        let entries = self.entries.lock().await;
        entries.iter().find(|r| r.id == resource_id).cloned()
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the pool is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

/// Keep candidates intersecting the requirements, ranked by descending count
/// of matched tags.
///
/// The sort is stable, so candidates with equal coverage keep the order of
/// the input sequence. Pure: no I/O, no registry mutation.
pub fn filter_and_rank(candidates: Vec<Resource>, requirements: &[String]) -> Vec<Resource> {
    let mut suitable: Vec<Resource> = candidates
        .into_iter()
        .filter(|r| r.matches(requirements))
        .collect();
    suitable.sort_by_key(|r| std::cmp::Reverse(r.match_count(requirements)));
    suitable
}
