//! Instrumentation hooks around notification episodes.
//!
//! Consumers may ignore any event; every method defaults to a no-op.

use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;
use serde::Serialize;

use crate::models::{
    EntityKey, EpisodeOutcome, MonitoredEntity, NotificationOptions, NotificationType,
};

/// Identifying data for an episode, carried by every lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpisodeEvent {
    /// The entity being notified about.
    pub entity: EntityKey,
    /// The episode's notification type.
    pub kind: NotificationType,
    /// The episode's options.
    pub options: NotificationOptions,
    /// When the episode started.
    pub started_at: DateTime<Utc>,
}

/// Structured signals emitted at episode and per-contact boundaries.
#[cfg_attr(test, automock)]
pub trait LifecycleHooks: Send + Sync {
    /// An episode is about to process its recipients. Also emitted, paired
    /// with [`LifecycleHooks::episode_end`], when the entity-level filter
    /// denies the episode.
    fn episode_start(&self, event: &EpisodeEvent) {
        let _ = event;
    }

    /// An episode finished; `outcome` carries the final counts.
    fn episode_end(&self, event: &EpisodeEvent, outcome: &EpisodeOutcome) {
        let _ = (event, outcome);
    }

    /// Delivery to one contact is starting.
    fn contact_start(&self, event: &EpisodeEvent, contact: &str) {
        let _ = (event, contact);
    }

    /// Delivery to one contact finished; `notified` is false when the
    /// contact-level filter skipped it.
    fn contact_end(&self, event: &EpisodeEvent, contact: &str, notified: bool) {
        let _ = (event, contact, notified);
    }
}

/// A [`LifecycleHooks`] implementation that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLifecycleHooks;

impl LifecycleHooks for NoopLifecycleHooks {}

/// Makes updated entity state visible to external consumers, once per
/// episode.
#[cfg_attr(test, automock)]
pub trait StatusPublisher: Send + Sync {
    /// Publishes the entity's current state.
    fn publish(&self, entity: &MonitoredEntity);
}

/// A [`StatusPublisher`] that publishes nowhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStatusPublisher;

impl StatusPublisher for NoopStatusPublisher {
    fn publish(&self, _entity: &MonitoredEntity) {}
}
