//! Re-notification scheduling: when a repeat notification becomes eligible.
//!
//! Hosts and services are deliberately kept on separate functions: the
//! volatile exemption exists only for services, and the asymmetry is part of
//! the engine's contract.

use chrono::{DateTime, Duration, Utc};

use super::escalation;
use crate::{models::MonitoredEntity, runtime::RuntimeContext, store::ObjectStore};

/// Computes the next eligible repeat-notification time for a service and
/// latches `no_more_notifications` when the effective interval is zero and
/// the service is not volatile.
pub fn next_service_notification_time(
    entity: &mut MonitoredEntity,
    store: &dyn ObjectStore,
    runtime: &dyn RuntimeContext,
    reference: DateTime<Utc>,
) -> DateTime<Utc> {
    let interval = escalation::effective_interval(entity, store, reference);

    entity.no_more_notifications = interval == 0.0 && !entity.is_volatile();

    reference + interval_duration(interval, runtime)
}

/// Computes the next eligible repeat-notification time for a host and
/// latches `no_more_notifications` when the effective interval is zero.
pub fn next_host_notification_time(
    entity: &mut MonitoredEntity,
    store: &dyn ObjectStore,
    runtime: &dyn RuntimeContext,
    reference: DateTime<Utc>,
) -> DateTime<Utc> {
    let interval = escalation::effective_interval(entity, store, reference);

    entity.no_more_notifications = interval == 0.0;

    reference + interval_duration(interval, runtime)
}

fn interval_duration(interval: f64, runtime: &dyn RuntimeContext) -> Duration {
    let seconds = interval * runtime.interval_length().as_secs_f64();
    Duration::milliseconds((seconds * 1000.0) as i64)
}
