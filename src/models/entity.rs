//! Monitored entities: the hosts and services the engine notifies about.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The states a monitored host can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostState {
    /// The host responds to checks.
    Up,
    /// The host is confirmed down.
    Down,
    /// The host cannot be reached (an upstream parent is down).
    Unreachable,
}

/// The states a monitored service can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    /// The service check passed.
    Ok,
    /// The service check crossed its warning threshold.
    Warning,
    /// The service check produced an unparseable or unknown result.
    Unknown,
    /// The service check crossed its critical threshold.
    Critical,
}

/// The state of a monitored entity, tagged by entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityState {
    /// A host state.
    Host(HostState),
    /// A service state.
    Service(ServiceState),
}

impl EntityState {
    /// Whether this is the entity's "good" state (UP for hosts, OK for
    /// services). Recovery handling keys off this.
    pub fn is_good(&self) -> bool {
        matches!(
            self,
            EntityState::Host(HostState::Up) | EntityState::Service(ServiceState::Ok)
        )
    }
}

impl fmt::Display for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityState::Host(HostState::Up) => "UP",
            EntityState::Host(HostState::Down) => "DOWN",
            EntityState::Host(HostState::Unreachable) => "UNREACHABLE",
            EntityState::Service(ServiceState::Ok) => "OK",
            EntityState::Service(ServiceState::Warning) => "WARNING",
            EntityState::Service(ServiceState::Unknown) => "UNKNOWN",
            EntityState::Service(ServiceState::Critical) => "CRITICAL",
        };
        write!(f, "{}", name)
    }
}

/// Whether a state is confirmed or still within its retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateType {
    /// A check failed but retries remain; not yet eligible for notification.
    Soft,
    /// The state is confirmed after retries.
    Hard,
}

/// The kind of a monitored entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A monitored host.
    Host,
    /// A monitored service running on a host.
    Service,
}

/// Per-severity notification switches.
///
/// The same shape is used for an entity's `notify_on` configuration, its
/// `notified_on` history, a contact's per-kind preferences, and an
/// escalation rule's `escalate_on` filter. Host-only flags (`down`,
/// `unreachable`) stay false on service records and vice versa.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyFlags {
    /// Notify when the entity returns to its good state.
    #[serde(default)]
    pub recovery: bool,
    /// Notify on WARNING (services).
    #[serde(default)]
    pub warning: bool,
    /// Notify on UNKNOWN (services).
    #[serde(default)]
    pub unknown: bool,
    /// Notify on CRITICAL (services).
    #[serde(default)]
    pub critical: bool,
    /// Notify on DOWN (hosts).
    #[serde(default)]
    pub down: bool,
    /// Notify on UNREACHABLE (hosts).
    #[serde(default)]
    pub unreachable: bool,
    /// Notify on flapping start/stop/disabled events.
    #[serde(default)]
    pub flapping: bool,
    /// Notify on scheduled-downtime start/end/cancelled events.
    #[serde(default)]
    pub downtime: bool,
}

impl NotifyFlags {
    /// Returns the flag corresponding to a state: the per-severity flag for
    /// problem states, the recovery flag for good states.
    pub fn for_state(&self, state: EntityState) -> bool {
        match state {
            EntityState::Host(HostState::Up) | EntityState::Service(ServiceState::Ok) => {
                self.recovery
            }
            EntityState::Host(HostState::Down) => self.down,
            EntityState::Host(HostState::Unreachable) => self.unreachable,
            EntityState::Service(ServiceState::Warning) => self.warning,
            EntityState::Service(ServiceState::Unknown) => self.unknown,
            EntityState::Service(ServiceState::Critical) => self.critical,
        }
    }

    /// Sets the flag for a problem state. No-op for good states, which have
    /// no history flag.
    pub fn set_for_state(&mut self, state: EntityState) {
        match state {
            EntityState::Host(HostState::Up) | EntityState::Service(ServiceState::Ok) => {}
            EntityState::Host(HostState::Down) => self.down = true,
            EntityState::Host(HostState::Unreachable) => self.unreachable = true,
            EntityState::Service(ServiceState::Warning) => self.warning = true,
            EntityState::Service(ServiceState::Unknown) => self.unknown = true,
            EntityState::Service(ServiceState::Critical) => self.critical = true,
        }
    }

    /// Whether any problem-severity flag is set. Used to decide whether a
    /// recovery has anything to recover from.
    pub fn any_problem(&self) -> bool {
        self.warning || self.unknown || self.critical || self.down || self.unreachable
    }
}

/// Identifies a monitored entity: a host name, optionally qualified by a
/// service description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    /// The host name.
    pub host: String,
    /// The service description; `None` identifies the host itself.
    pub service: Option<String>,
}

impl EntityKey {
    /// Key for a host.
    pub fn host(name: impl Into<String>) -> Self {
        Self { host: name.into(), service: None }
    }

    /// Key for a service on a host.
    pub fn service(host: impl Into<String>, description: impl Into<String>) -> Self {
        Self { host: host.into(), service: Some(description.into()) }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.service {
            Some(description) => write!(f, "{};{}", self.host, description),
            None => write!(f, "{}", self.host),
        }
    }
}

/// Fields present only on service entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceFields {
    /// The service description, unique per host.
    pub description: String,
    /// Volatile services renotify on every hard problem check result,
    /// ignoring the renotification interval gate.
    #[serde(default)]
    pub is_volatile: bool,
}

/// A monitored host or service.
///
/// Created once by the external configuration loader; the engine mutates
/// notification bookkeeping fields (timestamps, ordinal number, history
/// flags) in place for the life of the monitoring process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoredEntity {
    /// The host name; for services, the host the service runs on.
    pub host_name: String,

    /// Service-specific fields; `None` for hosts.
    #[serde(default)]
    pub service: Option<ServiceFields>,

    /// The current state.
    pub current_state: EntityState,

    /// The state before the most recent change.
    pub last_state: EntityState,

    /// Whether the current state is confirmed (hard) or tentative (soft).
    pub state_type: StateType,

    /// Whether the current problem has been acknowledged by an operator.
    #[serde(default)]
    pub acknowledged: bool,

    /// Whether the entity is currently flapping between states.
    #[serde(default)]
    pub is_flapping: bool,

    /// Count of overlapping scheduled-downtime windows currently active;
    /// greater than zero means the entity is in downtime.
    #[serde(default)]
    pub scheduled_downtime_depth: u32,

    /// Per-entity notification switch.
    pub notifications_enabled: bool,

    /// Which notification causes this entity wants sent.
    pub notify_on: NotifyFlags,

    /// Which problem severities have already been notified for the current
    /// problem occurrence.
    #[serde(default)]
    pub notified_on: NotifyFlags,

    /// Count of NORMAL notifications sent for the current problem.
    #[serde(default)]
    pub current_notification_number: u32,

    /// Id assigned to the notification episode in progress (or most recent).
    #[serde(default)]
    pub current_notification_id: u64,

    /// Id of the episode before that.
    #[serde(default)]
    pub last_notification_id: u64,

    /// When the last notification went out.
    #[serde(default)]
    pub last_notification: Option<DateTime<Utc>>,

    /// When the next repeat notification becomes eligible. Only meaningful
    /// while `no_more_notifications` is false.
    #[serde(default)]
    pub next_notification: Option<DateTime<Utc>>,

    /// Latched when the effective renotification interval is zero: the
    /// current problem will not be renotified.
    #[serde(default)]
    pub no_more_notifications: bool,

    /// Renotification interval, in multiples of the base interval unit.
    pub notification_interval: f64,

    /// Delay before the first problem notification, in multiples of the base
    /// interval unit.
    #[serde(default)]
    pub first_notification_delay: f64,

    /// When the current problem began. Program start is the fallback when
    /// unset.
    #[serde(default)]
    pub problem_since: Option<DateTime<Utc>>,

    /// Output of the most recent check, quoted in audit lines.
    #[serde(default)]
    pub plugin_output: String,

    /// Name of the time period during which notifications may be sent;
    /// `None` means always.
    #[serde(default)]
    pub notification_period: Option<String>,

    /// Directly assigned contact names.
    #[serde(default)]
    pub contacts: Vec<String>,

    /// Directly assigned contact-group names.
    #[serde(default)]
    pub contact_groups: Vec<String>,
}

impl MonitoredEntity {
    /// The key identifying this entity in the object store.
    pub fn key(&self) -> EntityKey {
        EntityKey {
            host: self.host_name.clone(),
            service: self.service.as_ref().map(|s| s.description.clone()),
        }
    }

    /// The kind of this entity.
    pub fn kind(&self) -> EntityKind {
        if self.service.is_some() { EntityKind::Service } else { EntityKind::Host }
    }

    /// Whether this entity is a volatile service. Always false for hosts.
    pub fn is_volatile(&self) -> bool {
        self.service.as_ref().map(|s| s.is_volatile).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_state_good() {
        assert!(EntityState::Host(HostState::Up).is_good());
        assert!(EntityState::Service(ServiceState::Ok).is_good());
        assert!(!EntityState::Host(HostState::Down).is_good());
        assert!(!EntityState::Service(ServiceState::Critical).is_good());
    }

    #[test]
    fn test_notify_flags_for_state() {
        let flags = NotifyFlags { critical: true, down: true, ..Default::default() };
        assert!(flags.for_state(EntityState::Service(ServiceState::Critical)));
        assert!(flags.for_state(EntityState::Host(HostState::Down)));
        assert!(!flags.for_state(EntityState::Service(ServiceState::Warning)));
        assert!(!flags.for_state(EntityState::Service(ServiceState::Ok)));
    }

    #[test]
    fn test_notify_flags_set_for_state_ignores_good_states() {
        let mut flags = NotifyFlags::default();
        flags.set_for_state(EntityState::Service(ServiceState::Ok));
        flags.set_for_state(EntityState::Host(HostState::Up));
        assert!(!flags.any_problem());

        flags.set_for_state(EntityState::Service(ServiceState::Warning));
        assert!(flags.warning);
        assert!(flags.any_problem());
    }

    #[test]
    fn test_entity_key_display() {
        assert_eq!(EntityKey::host("web01").to_string(), "web01");
        assert_eq!(EntityKey::service("web01", "http").to_string(), "web01;http");
    }
}
