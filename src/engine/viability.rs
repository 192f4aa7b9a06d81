//! The two-tier notification policy engine.
//!
//! Entity-level viability decides whether a notification goes out at all;
//! contact-level viability decides whether one particular contact receives
//! it. Both are ordered short-circuit gate sequences; the gate order is
//! load-bearing and must not be reordered.

use chrono::{DateTime, Duration, Utc};

use super::{
    dependency::{DependencyChecker, DependencyKind, DependencyStatus},
    time_window,
};
use crate::{
    models::{Contact, MonitoredEntity, NotificationOptions, NotificationType, NotifyFlags, StateType},
    runtime::RuntimeContext,
    store::ObjectStore,
};

/// The verdict of a viability filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viability {
    /// The notification may proceed.
    Allow,
    /// The notification is suppressed.
    Deny(DenyReason),
}

impl Viability {
    /// Whether the verdict is [`Viability::Allow`].
    pub fn is_allowed(&self) -> bool {
        matches!(self, Viability::Allow)
    }
}

/// Which gate denied a notification. Denials are normal, frequent outcomes;
/// the reason is surfaced at debug verbosity only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The program-wide master switch is off.
    ProgramWideDisabled,
    /// The current time is outside the notification period.
    OutsideNotificationPeriod,
    /// The entity's (or contact's) own notification switch is off.
    NotificationsDisabled,
    /// An acknowledgement for a problem that has since resolved.
    ProblemAlreadyResolved,
    /// Flapping events are not wanted.
    FlappingNotWanted,
    /// Scheduled-downtime events are not wanted.
    DowntimeNotWanted,
    /// The entity (or its host) is inside a scheduled downtime window.
    InScheduledDowntime,
    /// The state has not been confirmed by retries yet.
    SoftState,
    /// The problem was already acknowledged.
    Acknowledged,
    /// A notification dependency failed.
    DependencyFailure,
    /// The current severity is not wanted.
    StateNotWanted,
    /// Recoveries are not wanted.
    RecoveryNotWanted,
    /// Recovery of a problem nobody was notified about.
    RecoveryUnnotified,
    /// The first-notification delay has not elapsed yet.
    FirstDelayPending,
    /// The entity is currently flapping.
    CurrentlyFlapping,
    /// Renotification was stopped for the current problem.
    NoMoreNotifications,
    /// The service's host is not up.
    HostNotUp,
    /// The renotification interval has not elapsed yet.
    RenotifyIntervalPending,
}

/// Entity-level viability: whether this notification type may go out at
/// all, for anyone.
///
/// When the current time is outside the notification period and the type is
/// normal, the entity's next-eligible timestamp is recomputed and stored so
/// the caller can wake up when the window reopens; this is the only mutation
/// performed here.
#[allow(clippy::too_many_arguments)]
pub fn check_entity_viability(
    entity: &mut MonitoredEntity,
    host: Option<&MonitoredEntity>,
    store: &dyn ObjectStore,
    dependencies: &dyn DependencyChecker,
    runtime: &dyn RuntimeContext,
    kind: NotificationType,
    options: NotificationOptions,
    now: DateTime<Utc>,
) -> Viability {
    // Forced notifications bypass every gate.
    if options.forced {
        return Viability::Allow;
    }

    if !runtime.notifications_enabled() {
        return Viability::Deny(DenyReason::ProgramWideDisabled);
    }

    let period = entity.notification_period.as_deref().and_then(|name| store.time_period(name));
    if !time_window::is_time_valid(now, period.as_deref()) {
        if kind == NotificationType::Normal {
            // Remember when the window reopens; a period with no future
            // valid time defers a year.
            entity.next_notification = Some(
                time_window::next_valid_time(now, period.as_deref())
                    .unwrap_or_else(|| now + Duration::days(365)),
            );
        }
        return Viability::Deny(DenyReason::OutsideNotificationPeriod);
    }

    if !entity.notifications_enabled {
        return Viability::Deny(DenyReason::NotificationsDisabled);
    }

    if kind == NotificationType::Custom {
        return Viability::Allow;
    }

    if kind == NotificationType::Acknowledgement {
        if entity.current_state.is_good() {
            return Viability::Deny(DenyReason::ProblemAlreadyResolved);
        }
        return Viability::Allow;
    }

    if kind.is_flapping() {
        if !entity.notify_on.flapping {
            return Viability::Deny(DenyReason::FlappingNotWanted);
        }
        if entity.scheduled_downtime_depth > 0
            || host.map(|h| h.scheduled_downtime_depth > 0).unwrap_or(false)
        {
            return Viability::Deny(DenyReason::InScheduledDowntime);
        }
        return Viability::Allow;
    }

    if kind.is_downtime() {
        if !entity.notify_on.downtime {
            return Viability::Deny(DenyReason::DowntimeNotWanted);
        }
        // Host downtime does not suppress a service's own downtime events.
        if entity.scheduled_downtime_depth > 0 {
            return Viability::Deny(DenyReason::InScheduledDowntime);
        }
        return Viability::Allow;
    }

    // Normal notifications from here on.

    if entity.state_type == StateType::Soft {
        return Viability::Deny(DenyReason::SoftState);
    }

    if entity.acknowledged {
        return Viability::Deny(DenyReason::Acknowledged);
    }

    if dependencies.check_dependencies(entity, DependencyKind::Notification)
        == DependencyStatus::Failed
    {
        return Viability::Deny(DenyReason::DependencyFailure);
    }
    if let Some(host) = host {
        if dependencies.check_dependencies(host, DependencyKind::Notification)
            == DependencyStatus::Failed
        {
            return Viability::Deny(DenyReason::DependencyFailure);
        }
    }

    if !entity.current_state.is_good() && !entity.notify_on.for_state(entity.current_state) {
        return Viability::Deny(DenyReason::StateNotWanted);
    }

    if entity.current_state.is_good() {
        if !entity.notify_on.recovery {
            return Viability::Deny(DenyReason::RecoveryNotWanted);
        }
        if !entity.notified_on.any_problem() {
            return Viability::Deny(DenyReason::RecoveryUnnotified);
        }
        // Recoveries are exempt from the timing gates below.
        return Viability::Allow;
    }

    if entity.current_notification_number == 0 {
        let delay_secs =
            entity.first_notification_delay * runtime.interval_length().as_secs_f64();
        let anchor = entity.problem_since.unwrap_or_else(|| runtime.program_start());
        if now < anchor + Duration::milliseconds((delay_secs * 1000.0) as i64) {
            return Viability::Deny(DenyReason::FirstDelayPending);
        }
    }

    if entity.is_flapping {
        return Viability::Deny(DenyReason::CurrentlyFlapping);
    }

    if entity.no_more_notifications {
        return Viability::Deny(DenyReason::NoMoreNotifications);
    }

    if let Some(host) = host {
        if !host.current_state.is_good() {
            return Viability::Deny(DenyReason::HostNotUp);
        }
    }

    if let Some(next) = entity.next_notification {
        if now < next && !entity.is_volatile() {
            return Viability::Deny(DenyReason::RenotifyIntervalPending);
        }
    }

    if entity.scheduled_downtime_depth > 0
        || host.map(|h| h.scheduled_downtime_depth > 0).unwrap_or(false)
    {
        return Viability::Deny(DenyReason::InScheduledDowntime);
    }

    Viability::Allow
}

/// Contact-level viability: whether this particular contact is configured
/// to want this notification, right now.
pub fn check_contact_viability(
    contact: &Contact,
    entity: &MonitoredEntity,
    store: &dyn ObjectStore,
    kind: NotificationType,
    options: NotificationOptions,
    now: DateTime<Utc>,
) -> Viability {
    if options.forced {
        return Viability::Allow;
    }

    let entity_kind = entity.kind();

    if !contact.notifications_enabled_for(entity_kind) {
        return Viability::Deny(DenyReason::NotificationsDisabled);
    }

    let period = contact
        .notification_period(entity_kind)
        .and_then(|name| store.time_period(name));
    if !time_window::is_time_valid(now, period.as_deref()) {
        return Viability::Deny(DenyReason::OutsideNotificationPeriod);
    }

    if kind == NotificationType::Custom {
        return Viability::Allow;
    }

    let wants = contact.notify_on(entity_kind);

    if kind.is_flapping() {
        if !wants.flapping {
            return Viability::Deny(DenyReason::FlappingNotWanted);
        }
        return Viability::Allow;
    }

    if kind.is_downtime() {
        if !wants.downtime {
            return Viability::Deny(DenyReason::DowntimeNotWanted);
        }
        return Viability::Allow;
    }

    if !entity.current_state.is_good() && !wants.for_state(entity.current_state) {
        return Viability::Deny(DenyReason::StateNotWanted);
    }

    if entity.current_state.is_good() {
        if !wants.recovery {
            return Viability::Deny(DenyReason::RecoveryNotWanted);
        }
        if !recovery_pairing(entity, wants) {
            return Viability::Deny(DenyReason::RecoveryUnnotified);
        }
    }

    Viability::Allow
}

/// Whether at least one problem severity was both notified on the entity
/// and wanted by the contact. A recovery means nothing to a contact who was
/// never eligible for the problem itself.
fn recovery_pairing(entity: &MonitoredEntity, wants: &NotifyFlags) -> bool {
    let notified = &entity.notified_on;
    (notified.warning && wants.warning)
        || (notified.unknown && wants.unknown)
        || (notified.critical && wants.critical)
        || (notified.down && wants.down)
        || (notified.unreachable && wants.unreachable)
}
