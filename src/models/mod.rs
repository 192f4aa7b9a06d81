//! Data models for the herald engine.
//!
//! All object-graph types (entities, contacts, escalation rules, time
//! periods) are owned by the external object store; the engine only holds
//! shared handles to them.

pub mod contact;
pub mod entity;
pub mod escalation;
pub mod notification;
pub mod time_period;

pub use contact::{Contact, ContactGroup, NotificationCommand};
pub use entity::{
    EntityKey, EntityKind, EntityState, HostState, MonitoredEntity, NotifyFlags, ServiceFields,
    ServiceState, StateType,
};
pub use escalation::EscalationRule;
pub use notification::{EpisodeOutcome, NotificationOptions, NotificationType};
pub use time_period::{TimePeriod, TimeRange};
