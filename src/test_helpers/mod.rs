//! A set of helpers for testing

mod contact;
mod entity;
mod escalation;
mod recorders;

pub use contact::ContactBuilder;
pub use entity::EntityBuilder;
pub use escalation::EscalationRuleBuilder;
pub use recorders::{RecordingAuditLog, RecordingExecutor, RecordingHooks};

use crate::models::NotifyFlags;

/// Flags with every switch on; builders default to this so tests opt out of
/// exactly the gates they exercise.
pub fn all_notify_flags() -> NotifyFlags {
    NotifyFlags {
        recovery: true,
        warning: true,
        unknown: true,
        critical: true,
        down: true,
        unreachable: true,
        flapping: true,
        downtime: true,
    }
}
