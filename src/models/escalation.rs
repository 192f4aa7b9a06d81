//! Escalation rules: recipient and interval overrides keyed on how many
//! times a problem has already been notified.

use serde::{Deserialize, Serialize};

use super::entity::{EntityKey, NotifyFlags};

/// Provides the default value for `notification_interval`: the "use the
/// entity's own interval" sentinel.
fn default_interval() -> f64 {
    -1.0
}

/// An escalation rule for one host or service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationRule {
    /// The entity this rule targets.
    pub entity: EntityKey,

    /// First notification ordinal this rule applies to.
    pub first_notification: u32,

    /// Last notification ordinal this rule applies to; 0 means the rule
    /// applies from `first_notification` onward indefinitely.
    #[serde(default)]
    pub last_notification: u32,

    /// Time period during which this rule is in effect; `None` means always.
    #[serde(default)]
    pub escalation_period: Option<String>,

    /// Renotification interval override, in multiples of the base interval
    /// unit. Negative means "use the entity's own interval".
    #[serde(default = "default_interval")]
    pub notification_interval: f64,

    /// Which severities this rule escalates on.
    pub escalate_on: NotifyFlags,

    /// Individually listed contact names.
    #[serde(default)]
    pub contacts: Vec<String>,

    /// Contact-group names whose members are added.
    #[serde(default)]
    pub contact_groups: Vec<String>,
}
