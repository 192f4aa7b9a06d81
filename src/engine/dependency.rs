//! Dependency checking collaborator interface.
//!
//! Dependency graphs (host parents, service execution/notification
//! dependencies) live outside the engine; viability only needs the verdict.

#[cfg(test)]
use mockall::automock;

use crate::models::MonitoredEntity;

/// The dependency class being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    /// Dependencies gating notifications.
    Notification,
    /// Dependencies gating check execution.
    Execution,
}

/// The verdict of a dependency evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyStatus {
    /// No dependency blocks the operation.
    Satisfied,
    /// At least one dependency condition blocks the operation.
    Failed,
}

/// Evaluates dependency conditions for an entity.
#[cfg_attr(test, automock)]
pub trait DependencyChecker: Send + Sync {
    /// Reports whether dependent conditions block the given operation kind.
    fn check_dependencies(&self, entity: &MonitoredEntity, kind: DependencyKind)
        -> DependencyStatus;
}

/// A [`DependencyChecker`] for object graphs without dependencies; always
/// satisfied.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDependencies;

impl DependencyChecker for NoDependencies {
    fn check_dependencies(
        &self,
        _entity: &MonitoredEntity,
        _kind: DependencyKind,
    ) -> DependencyStatus {
        DependencyStatus::Satisfied
    }
}
