//! Contacts and contact groups: the people notifications are delivered to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{EntityKind, NotifyFlags};

/// A named notification command: a template expanded against the macro
/// context and handed to the command executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationCommand {
    /// The command name, quoted in audit lines.
    pub name: String,
    /// The command-line template.
    pub command_line: String,
}

/// A person (or role) that can receive notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Unique contact name.
    pub name: String,

    /// Email address, exposed to command templates.
    #[serde(default)]
    pub email: Option<String>,

    /// Master switch for host notifications to this contact.
    pub host_notifications_enabled: bool,

    /// Master switch for service notifications to this contact.
    pub service_notifications_enabled: bool,

    /// Which host notification causes this contact wants.
    pub notify_on_host: NotifyFlags,

    /// Which service notification causes this contact wants.
    pub notify_on_service: NotifyFlags,

    /// Time period during which host notifications may reach this contact;
    /// `None` means always.
    #[serde(default)]
    pub host_notification_period: Option<String>,

    /// Time period during which service notifications may reach this
    /// contact; `None` means always.
    #[serde(default)]
    pub service_notification_period: Option<String>,

    /// Commands run to deliver a host notification, in order.
    #[serde(default)]
    pub host_commands: Vec<NotificationCommand>,

    /// Commands run to deliver a service notification, in order.
    #[serde(default)]
    pub service_commands: Vec<NotificationCommand>,

    /// When this contact was last notified about a host.
    #[serde(default)]
    pub last_host_notification: Option<DateTime<Utc>>,

    /// When this contact was last notified about a service.
    #[serde(default)]
    pub last_service_notification: Option<DateTime<Utc>>,
}

impl Contact {
    /// The master notification switch for the given entity kind.
    pub fn notifications_enabled_for(&self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Host => self.host_notifications_enabled,
            EntityKind::Service => self.service_notifications_enabled,
        }
    }

    /// The notify-on flags for the given entity kind.
    pub fn notify_on(&self, kind: EntityKind) -> &NotifyFlags {
        match kind {
            EntityKind::Host => &self.notify_on_host,
            EntityKind::Service => &self.notify_on_service,
        }
    }

    /// The notification period name for the given entity kind.
    pub fn notification_period(&self, kind: EntityKind) -> Option<&str> {
        match kind {
            EntityKind::Host => self.host_notification_period.as_deref(),
            EntityKind::Service => self.service_notification_period.as_deref(),
        }
    }

    /// The delivery commands for the given entity kind, in configured order.
    pub fn commands(&self, kind: EntityKind) -> &[NotificationCommand] {
        match kind {
            EntityKind::Host => &self.host_commands,
            EntityKind::Service => &self.service_commands,
        }
    }
}

/// A named set of contacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactGroup {
    /// Unique group name.
    pub name: String,
    /// Member contact names, in configured order.
    pub members: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_contact() -> Contact {
        Contact {
            name: "alice".to_string(),
            email: None,
            host_notifications_enabled: true,
            service_notifications_enabled: false,
            notify_on_host: NotifyFlags { down: true, ..Default::default() },
            notify_on_service: NotifyFlags::default(),
            host_notification_period: Some("workhours".to_string()),
            service_notification_period: None,
            host_commands: vec![NotificationCommand {
                name: "notify-by-email".to_string(),
                command_line: "/usr/bin/mail {{ contact.email }}".to_string(),
            }],
            service_commands: vec![],
            last_host_notification: None,
            last_service_notification: None,
        }
    }

    #[test]
    fn test_kind_scoped_accessors() {
        let contact = minimal_contact();
        assert!(contact.notifications_enabled_for(EntityKind::Host));
        assert!(!contact.notifications_enabled_for(EntityKind::Service));
        assert!(contact.notify_on(EntityKind::Host).down);
        assert_eq!(contact.notification_period(EntityKind::Host), Some("workhours"));
        assert_eq!(contact.notification_period(EntityKind::Service), None);
        assert_eq!(contact.commands(EntityKind::Host).len(), 1);
        assert!(contact.commands(EntityKind::Service).is_empty());
    }
}
