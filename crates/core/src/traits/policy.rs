//! Security and compliance predicates.

use crate::types::Resource;

/// A predicate consulted before a resource is offered as a candidate.
///
/// Registries hold an ordered chain of these; a candidate rejected by any
/// predicate is excluded and never surfaces to the caller.
pub trait ResourcePredicate: Send + Sync {
    /// Predicate name, for logging.
    fn name(&self) -> &str;

    /// Whether the resource may be offered for this requirement set.
    fn allow(&self, resource: &Resource, requirements: &[String]) -> bool;
}
