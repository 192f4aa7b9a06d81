//! In-memory object store, populated once at startup.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use super::traits::{ContactHandle, EntityHandle, ObjectStore};
use crate::models::{
    Contact, ContactGroup, EntityKey, EscalationRule, MonitoredEntity, TimePeriod,
};

/// An [`ObjectStore`] backed by hash maps, with escalation rules grouped by
/// target entity.
#[derive(Default)]
pub struct MemoryObjectStore {
    entities: HashMap<EntityKey, EntityHandle>,
    contacts: HashMap<String, ContactHandle>,
    groups: HashMap<String, Arc<ContactGroup>>,
    periods: HashMap<String, Arc<TimePeriod>>,
    escalations: HashMap<EntityKey, Vec<Arc<EscalationRule>>>,
}

impl MemoryObjectStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity, keyed by its own identity.
    pub fn add_entity(&mut self, entity: MonitoredEntity) -> EntityHandle {
        let key = entity.key();
        let handle = Arc::new(RwLock::new(entity));
        self.entities.insert(key, Arc::clone(&handle));
        handle
    }

    /// Adds a contact.
    pub fn add_contact(&mut self, contact: Contact) -> ContactHandle {
        let name = contact.name.clone();
        let handle = Arc::new(RwLock::new(contact));
        self.contacts.insert(name, Arc::clone(&handle));
        handle
    }

    /// Adds a contact group.
    pub fn add_contact_group(&mut self, group: ContactGroup) {
        self.groups.insert(group.name.clone(), Arc::new(group));
    }

    /// Adds a time period.
    pub fn add_time_period(&mut self, period: TimePeriod) {
        self.periods.insert(period.name.clone(), Arc::new(period));
    }

    /// Adds an escalation rule, indexed under its target entity.
    pub fn add_escalation(&mut self, rule: EscalationRule) {
        self.escalations.entry(rule.entity.clone()).or_default().push(Arc::new(rule));
    }
}

impl ObjectStore for MemoryObjectStore {
    fn entity(&self, key: &EntityKey) -> Option<EntityHandle> {
        self.entities.get(key).cloned()
    }

    fn contact(&self, name: &str) -> Option<ContactHandle> {
        self.contacts.get(name).cloned()
    }

    fn contact_group(&self, name: &str) -> Option<Arc<ContactGroup>> {
        self.groups.get(name).cloned()
    }

    fn time_period(&self, name: &str) -> Option<Arc<TimePeriod>> {
        self.periods.get(name).cloned()
    }

    fn escalations_for(&self, key: &EntityKey) -> Vec<Arc<EscalationRule>> {
        self.escalations.get(key).cloned().unwrap_or_default()
    }
}
