use super::all_notify_flags;
use crate::models::{EntityKey, EscalationRule, NotifyFlags};

/// Builder for [`EscalationRule`] test fixtures.
///
/// Defaults to a rule matching from the first notification onward
/// indefinitely, on every severity, with no period restriction and no
/// interval override.
pub struct EscalationRuleBuilder {
    rule: EscalationRule,
}

impl EscalationRuleBuilder {
    /// A rule targeting a service.
    pub fn service(host: &str, description: &str) -> Self {
        Self::for_key(EntityKey::service(host, description))
    }

    /// A rule targeting a host.
    pub fn host(name: &str) -> Self {
        Self::for_key(EntityKey::host(name))
    }

    fn for_key(entity: EntityKey) -> Self {
        EscalationRuleBuilder {
            rule: EscalationRule {
                entity,
                first_notification: 1,
                last_notification: 0,
                escalation_period: None,
                notification_interval: -1.0,
                escalate_on: all_notify_flags(),
                contacts: vec![],
                contact_groups: vec![],
            },
        }
    }

    /// Bounds the rule to a notification-ordinal window; `last` 0 means
    /// unbounded.
    pub fn notification_window(mut self, first: u32, last: u32) -> Self {
        self.rule.first_notification = first;
        self.rule.last_notification = last;
        self
    }

    /// Restricts the rule to a time period.
    pub fn escalation_period(mut self, name: &str) -> Self {
        self.rule.escalation_period = Some(name.to_string());
        self
    }

    /// Overrides the renotification interval while the rule matches.
    pub fn interval_override(mut self, interval: f64) -> Self {
        self.rule.notification_interval = interval;
        self
    }

    /// Sets the escalate-on severity filter.
    pub fn escalate_on(mut self, flags: NotifyFlags) -> Self {
        self.rule.escalate_on = flags;
        self
    }

    /// Lists contacts individually on the rule.
    pub fn contacts(mut self, names: &[&str]) -> Self {
        self.rule.contacts = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Lists contact groups on the rule.
    pub fn contact_groups(mut self, names: &[&str]) -> Self {
        self.rule.contact_groups = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Finishes the fixture.
    pub fn build(self) -> EscalationRule {
        self.rule
    }
}
