//! Recipient resolution: who a notification episode goes to.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::escalation;
use crate::{
    models::{MonitoredEntity, NotificationOptions},
    store::{ContactHandle, ObjectStore},
};

/// A deduplicated, insertion-ordered list of contacts to notify.
///
/// Adding a contact already present is a no-op; the first occurrence keeps
/// its position.
#[derive(Default)]
pub struct RecipientList {
    names: Vec<String>,
    handles: Vec<ContactHandle>,
    seen: HashSet<String>,
}

impl RecipientList {
    /// Adds a contact by name, looking it up in the store. Unknown names are
    /// logged and skipped.
    fn add(&mut self, name: &str, store: &dyn ObjectStore) {
        if self.seen.contains(name) {
            return;
        }
        match store.contact(name) {
            Some(handle) => {
                self.seen.insert(name.to_string());
                self.names.push(name.to_string());
                self.handles.push(handle);
            }
            None => {
                tracing::warn!(contact = name, "Contact referenced but not found, skipping.");
            }
        }
    }

    /// Adds every member of a named contact group. An unknown group is
    /// logged and skipped.
    fn add_group(&mut self, group_name: &str, store: &dyn ObjectStore) {
        match store.contact_group(group_name) {
            Some(group) => {
                for member in &group.members {
                    self.add(member, store);
                }
            }
            None => {
                tracing::warn!(
                    contact_group = group_name,
                    "Contact group referenced but not found, skipping."
                );
            }
        }
    }

    /// Resolved contact names, in insertion order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Iterates resolved contacts in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContactHandle)> {
        self.names.iter().map(String::as_str).zip(self.handles.iter())
    }

    /// Number of resolved contacts.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no contact was resolved.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Resolves the recipients for one episode.
///
/// When any escalation rule matches, recipients come from the matching
/// rules; otherwise from the entity's own contact assignments. A broadcast
/// episode runs both gathering passes so escalated and normal recipients are
/// reached simultaneously.
pub fn resolve(
    entity: &MonitoredEntity,
    store: &dyn ObjectStore,
    options: NotificationOptions,
    now: DateTime<Utc>,
) -> (RecipientList, bool) {
    let escalated = escalation::is_escalated(entity, store, now);
    let mut recipients = RecipientList::default();

    if escalated || options.broadcast {
        let rules: Vec<_> = store
            .escalations_for(&entity.key())
            .into_iter()
            .filter(|rule| escalation::rule_matches(entity, rule, options, store, now))
            .collect();

        for rule in &rules {
            for name in &rule.contacts {
                recipients.add(name, store);
            }
        }
        for rule in &rules {
            for group_name in &rule.contact_groups {
                recipients.add_group(group_name, store);
            }
        }
    }

    if !escalated || options.broadcast {
        for name in &entity.contacts {
            recipients.add(name, store);
        }
        for group_name in &entity.contact_groups {
            recipients.add_group(group_name, store);
        }
    }

    (recipients, escalated)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{
        models::{ContactGroup, EntityState, ServiceState},
        store::MemoryObjectStore,
        test_helpers::{ContactBuilder, EntityBuilder, EscalationRuleBuilder},
    };

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 3, 12, 0, 0).unwrap()
    }

    fn store_with_contacts(names: &[&str]) -> MemoryObjectStore {
        let mut store = MemoryObjectStore::new();
        for name in names {
            store.add_contact(ContactBuilder::new(name).build());
        }
        store
    }

    fn critical_service(notification_number: u32) -> MonitoredEntity {
        EntityBuilder::service("web01", "http")
            .state(EntityState::Service(ServiceState::Critical))
            .notification_number(notification_number)
            .build()
    }

    #[test]
    fn test_non_escalated_uses_entity_assignments() {
        let mut store = store_with_contacts(&["alice", "bob", "carol"]);
        store.add_contact_group(ContactGroup {
            name: "oncall".to_string(),
            members: vec!["carol".to_string()],
        });

        let mut entity = critical_service(1);
        entity.contacts = vec!["alice".to_string(), "bob".to_string()];
        entity.contact_groups = vec!["oncall".to_string()];

        let (recipients, escalated) = resolve(&entity, &store, NotificationOptions::NONE, now());
        assert!(!escalated);
        assert_eq!(recipients.names(), &["alice", "bob", "carol"]);
    }

    #[test]
    fn test_escalated_replaces_entity_assignments() {
        let mut store = store_with_contacts(&["alice", "manager"]);
        store.add_escalation(
            EscalationRuleBuilder::service("web01", "http").contacts(&["manager"]).build(),
        );

        let mut entity = critical_service(2);
        entity.contacts = vec!["alice".to_string()];

        let (recipients, escalated) = resolve(&entity, &store, NotificationOptions::NONE, now());
        assert!(escalated);
        assert_eq!(recipients.names(), &["manager"]);
    }

    #[test]
    fn test_broadcast_reaches_both_escalated_and_normal_recipients() {
        let mut store = store_with_contacts(&["alice", "manager"]);
        store.add_escalation(
            EscalationRuleBuilder::service("web01", "http").contacts(&["manager"]).build(),
        );

        let mut entity = critical_service(2);
        entity.contacts = vec!["alice".to_string()];

        let (recipients, _) = resolve(&entity, &store, NotificationOptions::broadcast(), now());
        assert_eq!(recipients.names(), &["manager", "alice"]);
    }

    #[test]
    fn test_contact_in_multiple_groups_resolves_once() {
        let mut store = store_with_contacts(&["alice"]);
        store.add_contact_group(ContactGroup {
            name: "oncall".to_string(),
            members: vec!["alice".to_string()],
        });
        store.add_contact_group(ContactGroup {
            name: "admins".to_string(),
            members: vec!["alice".to_string()],
        });
        store.add_escalation(
            EscalationRuleBuilder::service("web01", "http")
                .contact_groups(&["oncall", "admins"])
                .build(),
        );

        let (recipients, _) =
            resolve(&critical_service(2), &store, NotificationOptions::NONE, now());
        assert_eq!(recipients.names(), &["alice"]);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut store = store_with_contacts(&["alice", "bob"]);
        store.add_escalation(
            EscalationRuleBuilder::service("web01", "http")
                .contacts(&["bob", "alice"])
                .build(),
        );

        let entity = critical_service(2);
        let (first, _) = resolve(&entity, &store, NotificationOptions::NONE, now());
        let (second, _) = resolve(&entity, &store, NotificationOptions::NONE, now());
        assert_eq!(first.names(), second.names());
    }

    #[test]
    fn test_unknown_contact_is_skipped() {
        let store = store_with_contacts(&["alice"]);
        let mut entity = critical_service(1);
        entity.contacts = vec!["ghost".to_string(), "alice".to_string()];

        let (recipients, _) = resolve(&entity, &store, NotificationOptions::NONE, now());
        assert_eq!(recipients.names(), &["alice"]);
    }

    #[test]
    fn test_rule_contacts_precede_group_members() {
        let mut store = store_with_contacts(&["alice", "bob"]);
        store.add_contact_group(ContactGroup {
            name: "oncall".to_string(),
            members: vec!["bob".to_string()],
        });
        // The group is listed on an earlier rule, but individually listed
        // contacts from all rules are gathered first.
        store.add_escalation(
            EscalationRuleBuilder::service("web01", "http")
                .contact_groups(&["oncall"])
                .build(),
        );
        store.add_escalation(
            EscalationRuleBuilder::service("web01", "http").contacts(&["alice"]).build(),
        );

        let (recipients, _) =
            resolve(&critical_service(2), &store, NotificationOptions::NONE, now());
        assert_eq!(recipients.names(), &["alice", "bob"]);
    }
}
