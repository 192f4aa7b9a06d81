use super::all_notify_flags;
use crate::models::{Contact, NotificationCommand, NotifyFlags};

/// Builder for [`Contact`] test fixtures.
///
/// Defaults to a contact with both categories enabled, every notify-on
/// switch set, no time-period restriction and no commands.
pub struct ContactBuilder {
    contact: Contact,
}

impl ContactBuilder {
    /// A contact with the given name.
    pub fn new(name: &str) -> Self {
        ContactBuilder {
            contact: Contact {
                name: name.to_string(),
                email: None,
                host_notifications_enabled: true,
                service_notifications_enabled: true,
                notify_on_host: all_notify_flags(),
                notify_on_service: all_notify_flags(),
                host_notification_period: None,
                service_notification_period: None,
                host_commands: vec![],
                service_commands: vec![],
                last_host_notification: None,
                last_service_notification: None,
            },
        }
    }

    /// Sets the email address.
    pub fn email(mut self, email: &str) -> Self {
        self.contact.email = Some(email.to_string());
        self
    }

    /// Sets the host-notification master switch.
    pub fn host_notifications_enabled(mut self, enabled: bool) -> Self {
        self.contact.host_notifications_enabled = enabled;
        self
    }

    /// Sets the service-notification master switch.
    pub fn service_notifications_enabled(mut self, enabled: bool) -> Self {
        self.contact.service_notifications_enabled = enabled;
        self
    }

    /// Sets the host notify-on flags.
    pub fn notify_on_host(mut self, flags: NotifyFlags) -> Self {
        self.contact.notify_on_host = flags;
        self
    }

    /// Sets the service notify-on flags.
    pub fn notify_on_service(mut self, flags: NotifyFlags) -> Self {
        self.contact.notify_on_service = flags;
        self
    }

    /// Sets the host notification period name.
    pub fn host_notification_period(mut self, name: &str) -> Self {
        self.contact.host_notification_period = Some(name.to_string());
        self
    }

    /// Sets the service notification period name.
    pub fn service_notification_period(mut self, name: &str) -> Self {
        self.contact.service_notification_period = Some(name.to_string());
        self
    }

    /// Appends a host notification command.
    pub fn host_command(mut self, name: &str, command_line: &str) -> Self {
        self.contact.host_commands.push(NotificationCommand {
            name: name.to_string(),
            command_line: command_line.to_string(),
        });
        self
    }

    /// Appends a service notification command.
    pub fn service_command(mut self, name: &str, command_line: &str) -> Self {
        self.contact.service_commands.push(NotificationCommand {
            name: name.to_string(),
            command_line: command_line.to_string(),
        });
        self
    }

    /// Finishes the fixture.
    pub fn build(self) -> Contact {
        self.contact
    }
}
