use chrono::{DateTime, Utc};

use super::all_notify_flags;
use crate::models::{
    EntityState, HostState, MonitoredEntity, NotifyFlags, ServiceFields, ServiceState, StateType,
};

/// Builder for [`MonitoredEntity`] test fixtures.
///
/// Defaults to a hard-state entity with notifications enabled and every
/// notify-on switch set, so individual tests disable exactly what they
/// exercise.
pub struct EntityBuilder {
    entity: MonitoredEntity,
}

impl EntityBuilder {
    /// A host entity, initially UP.
    pub fn host(name: &str) -> Self {
        EntityBuilder {
            entity: MonitoredEntity {
                host_name: name.to_string(),
                service: None,
                current_state: EntityState::Host(HostState::Up),
                last_state: EntityState::Host(HostState::Up),
                state_type: StateType::Hard,
                acknowledged: false,
                is_flapping: false,
                scheduled_downtime_depth: 0,
                notifications_enabled: true,
                notify_on: all_notify_flags(),
                notified_on: NotifyFlags::default(),
                current_notification_number: 0,
                current_notification_id: 0,
                last_notification_id: 0,
                last_notification: None,
                next_notification: None,
                no_more_notifications: false,
                notification_interval: 1.0,
                first_notification_delay: 0.0,
                problem_since: None,
                plugin_output: "PING OK".to_string(),
                notification_period: None,
                contacts: vec![],
                contact_groups: vec![],
            },
        }
    }

    /// A service entity on the given host, initially OK.
    pub fn service(host: &str, description: &str) -> Self {
        let mut builder = Self::host(host);
        builder.entity.service =
            Some(ServiceFields { description: description.to_string(), is_volatile: false });
        builder.entity.current_state = EntityState::Service(ServiceState::Ok);
        builder.entity.last_state = EntityState::Service(ServiceState::Ok);
        builder.entity.plugin_output = "HTTP OK".to_string();
        builder
    }

    /// Sets the current state.
    pub fn state(mut self, state: EntityState) -> Self {
        self.entity.current_state = state;
        self
    }

    /// Sets the current notification ordinal.
    pub fn notification_number(mut self, number: u32) -> Self {
        self.entity.current_notification_number = number;
        self
    }

    /// Sets the notify-on configuration.
    pub fn notify_on(mut self, flags: NotifyFlags) -> Self {
        self.entity.notify_on = flags;
        self
    }

    /// Sets the notified-on history.
    pub fn notified_on(mut self, flags: NotifyFlags) -> Self {
        self.entity.notified_on = flags;
        self
    }

    /// Sets the renotification interval, in base interval units.
    pub fn interval(mut self, interval: f64) -> Self {
        self.entity.notification_interval = interval;
        self
    }

    /// Marks the service volatile.
    pub fn volatile(mut self, volatile: bool) -> Self {
        if let Some(service) = &mut self.entity.service {
            service.is_volatile = volatile;
        }
        self
    }

    /// Sets the first-notification delay, in base interval units.
    pub fn first_notification_delay(mut self, delay: f64) -> Self {
        self.entity.first_notification_delay = delay;
        self
    }

    /// Sets when the current problem began.
    pub fn problem_since(mut self, at: DateTime<Utc>) -> Self {
        self.entity.problem_since = Some(at);
        self
    }

    /// Sets the next eligible repeat-notification time.
    pub fn next_notification(mut self, at: DateTime<Utc>) -> Self {
        self.entity.next_notification = Some(at);
        self
    }

    /// Sets the notification period name.
    pub fn notification_period(mut self, name: &str) -> Self {
        self.entity.notification_period = Some(name.to_string());
        self
    }

    /// Assigns contacts directly to the entity.
    pub fn contacts(mut self, names: &[&str]) -> Self {
        self.entity.contacts = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Assigns contact groups directly to the entity.
    pub fn contact_groups(mut self, names: &[&str]) -> Self {
        self.entity.contact_groups = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Sets the latest check output.
    pub fn output(mut self, output: &str) -> Self {
        self.entity.plugin_output = output.to_string();
        self
    }

    /// Finishes the fixture.
    pub fn build(self) -> MonitoredEntity {
        self.entity
    }
}
