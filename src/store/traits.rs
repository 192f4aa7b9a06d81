//! Read-only object-graph access for the engine.

use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use tokio::sync::RwLock;

use crate::models::{
    Contact, ContactGroup, EntityKey, EscalationRule, MonitoredEntity, TimePeriod,
};

/// Shared handle to a monitored entity. The engine mutates notification
/// bookkeeping through this handle; write guards are never held across an
/// await point.
pub type EntityHandle = Arc<RwLock<MonitoredEntity>>;

/// Shared handle to a contact.
pub type ContactHandle = Arc<RwLock<Contact>>;

/// Lookup interface over the pre-populated, validated object graph.
///
/// The engine never inserts or removes objects; the external configuration
/// loader owns the graph for the life of the process.
#[cfg_attr(test, automock)]
pub trait ObjectStore: Send + Sync {
    /// Looks up an entity by key.
    fn entity(&self, key: &EntityKey) -> Option<EntityHandle>;

    /// Looks up a contact by name.
    fn contact(&self, name: &str) -> Option<ContactHandle>;

    /// Looks up a contact group by name.
    fn contact_group(&self, name: &str) -> Option<Arc<ContactGroup>>;

    /// Looks up a time period by name.
    fn time_period(&self, name: &str) -> Option<Arc<TimePeriod>>;

    /// All escalation rules targeting the given entity, in configured order.
    fn escalations_for(&self, key: &EntityKey) -> Vec<Arc<EscalationRule>>;
}
