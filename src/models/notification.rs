//! Notification episode types: what kind of event is being notified, with
//! which options, and how an episode turned out.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The cause of a notification episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// A hard state change or an eligible repeat of an unresolved problem.
    Normal,
    /// An operator acknowledged the problem.
    Acknowledgement,
    /// An operator requested an ad-hoc notification.
    Custom,
    /// The entity started flapping.
    FlappingStart,
    /// The entity stopped flapping.
    FlappingStop,
    /// Flap detection was disabled while the entity was flapping.
    FlappingDisabled,
    /// A scheduled downtime window opened.
    DowntimeStart,
    /// A scheduled downtime window ended.
    DowntimeEnd,
    /// A scheduled downtime window was cancelled early.
    DowntimeCancelled,
}

impl NotificationType {
    /// Whether this is one of the flapping event types.
    pub fn is_flapping(&self) -> bool {
        matches!(
            self,
            NotificationType::FlappingStart
                | NotificationType::FlappingStop
                | NotificationType::FlappingDisabled
        )
    }

    /// Whether this is one of the scheduled-downtime event types.
    pub fn is_downtime(&self) -> bool {
        matches!(
            self,
            NotificationType::DowntimeStart
                | NotificationType::DowntimeEnd
                | NotificationType::DowntimeCancelled
        )
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NotificationType::Normal => "NORMAL",
            NotificationType::Acknowledgement => "ACKNOWLEDGEMENT",
            NotificationType::Custom => "CUSTOM",
            NotificationType::FlappingStart => "FLAPPINGSTART",
            NotificationType::FlappingStop => "FLAPPINGSTOP",
            NotificationType::FlappingDisabled => "FLAPPINGDISABLED",
            NotificationType::DowntimeStart => "DOWNTIMESTART",
            NotificationType::DowntimeEnd => "DOWNTIMEEND",
            NotificationType::DowntimeCancelled => "DOWNTIMECANCELLED",
        };
        write!(f, "{}", name)
    }
}

/// Option flags modifying how an episode is processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationOptions {
    /// Bypass every viability gate, entity- and contact-level.
    #[serde(default)]
    pub forced: bool,
    /// Increment the entity's notification ordinal even for non-normal
    /// types.
    #[serde(default)]
    pub increment: bool,
    /// Notify escalated and normal recipients simultaneously, and match
    /// every escalation rule unconditionally.
    #[serde(default)]
    pub broadcast: bool,
}

impl NotificationOptions {
    /// No options set.
    pub const NONE: NotificationOptions =
        NotificationOptions { forced: false, increment: false, broadcast: false };

    /// Options with only `forced` set.
    pub fn forced() -> Self {
        NotificationOptions { forced: true, ..Self::NONE }
    }

    /// Options with only `broadcast` set.
    pub fn broadcast() -> Self {
        NotificationOptions { broadcast: true, ..Self::NONE }
    }
}

/// How a notification episode turned out, reported to the caller and to
/// lifecycle hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeOutcome {
    /// Whether the episode passed the entity-level viability filter.
    pub viable: bool,
    /// Whether recipients came from escalation rules.
    pub escalated: bool,
    /// How many contacts were resolved.
    pub recipients: usize,
    /// How many contacts were actually notified.
    pub notified: usize,
}

impl EpisodeOutcome {
    /// The outcome of an episode denied at the entity level.
    pub fn not_viable() -> Self {
        EpisodeOutcome { viable: false, escalated: false, recipients: 0, notified: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_categories() {
        assert!(NotificationType::FlappingStop.is_flapping());
        assert!(NotificationType::DowntimeCancelled.is_downtime());
        assert!(!NotificationType::Normal.is_flapping());
        assert!(!NotificationType::Acknowledgement.is_downtime());
    }

    #[test]
    fn test_type_display_matches_audit_markers() {
        assert_eq!(NotificationType::FlappingStart.to_string(), "FLAPPINGSTART");
        assert_eq!(NotificationType::DowntimeEnd.to_string(), "DOWNTIMEEND");
        assert_eq!(NotificationType::Acknowledgement.to_string(), "ACKNOWLEDGEMENT");
    }
}
