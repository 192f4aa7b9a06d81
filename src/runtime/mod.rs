//! Program-wide runtime state the engine consults during every episode.
//!
//! The same escalation and viability logic serves two surfaces: the live
//! monitoring core, where the master switch can be flipped at runtime, and
//! read-only reporting contexts that evaluate "would this notify" against a
//! frozen snapshot. Both implement [`RuntimeContext`].

use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;

use crate::config::EngineConfig;

/// Capability interface over program-wide state.
#[cfg_attr(test, automock)]
pub trait RuntimeContext: Send + Sync {
    /// The program-wide notification master switch.
    fn notifications_enabled(&self) -> bool;

    /// When the monitoring process started. Anchors first-notification-delay
    /// arithmetic for problems whose start time is unknown.
    fn program_start(&self) -> DateTime<Utc>;

    /// The base interval unit.
    fn interval_length(&self) -> Duration;

    /// Wall-clock cap per notification command execution.
    fn notification_timeout(&self) -> Duration;

    /// Whether audit lines are written.
    fn log_notifications(&self) -> bool;
}

/// The live monitoring-core runtime.
pub struct CoreRuntime {
    notifications_enabled: AtomicBool,
    program_start: DateTime<Utc>,
    interval_length: Duration,
    notification_timeout: Duration,
    log_notifications: bool,
}

impl CoreRuntime {
    /// Creates a runtime from configuration, stamping the program start at
    /// now.
    pub fn new(config: &EngineConfig) -> Self {
        CoreRuntime {
            notifications_enabled: AtomicBool::new(config.notifications_enabled),
            program_start: Utc::now(),
            interval_length: config.interval_length,
            notification_timeout: config.notification_timeout,
            log_notifications: config.log_notifications,
        }
    }

    /// Flips the program-wide master switch. Exposed to operator surfaces;
    /// takes effect at the next episode.
    pub fn set_notifications_enabled(&self, enabled: bool) {
        self.notifications_enabled.store(enabled, Ordering::Release);
    }
}

impl RuntimeContext for CoreRuntime {
    fn notifications_enabled(&self) -> bool {
        self.notifications_enabled.load(Ordering::Acquire)
    }

    fn program_start(&self) -> DateTime<Utc> {
        self.program_start
    }

    fn interval_length(&self) -> Duration {
        self.interval_length
    }

    fn notification_timeout(&self) -> Duration {
        self.notification_timeout
    }

    fn log_notifications(&self) -> bool {
        self.log_notifications
    }
}

/// A frozen, read-only runtime snapshot for reporting surfaces.
#[derive(Debug, Clone)]
pub struct ReportingRuntime {
    /// Snapshot of the master switch.
    pub notifications_enabled: bool,
    /// Snapshot of the program start.
    pub program_start: DateTime<Utc>,
    /// Snapshot of the base interval unit.
    pub interval_length: Duration,
    /// Snapshot of the per-command cap.
    pub notification_timeout: Duration,
}

impl ReportingRuntime {
    /// Captures a snapshot of another runtime.
    pub fn snapshot_of(runtime: &dyn RuntimeContext) -> Self {
        ReportingRuntime {
            notifications_enabled: runtime.notifications_enabled(),
            program_start: runtime.program_start(),
            interval_length: runtime.interval_length(),
            notification_timeout: runtime.notification_timeout(),
        }
    }
}

impl RuntimeContext for ReportingRuntime {
    fn notifications_enabled(&self) -> bool {
        self.notifications_enabled
    }

    fn program_start(&self) -> DateTime<Utc> {
        self.program_start
    }

    fn interval_length(&self) -> Duration {
        self.interval_length
    }

    fn notification_timeout(&self) -> Duration {
        self.notification_timeout
    }

    fn log_notifications(&self) -> bool {
        // Reporting contexts never write audit lines.
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_runtime_master_switch() {
        let runtime = CoreRuntime::new(&EngineConfig::default());
        assert!(runtime.notifications_enabled());

        runtime.set_notifications_enabled(false);
        assert!(!runtime.notifications_enabled());
    }

    #[test]
    fn test_reporting_snapshot_is_frozen() {
        let core = CoreRuntime::new(&EngineConfig::default());
        let snapshot = ReportingRuntime::snapshot_of(&core);

        core.set_notifications_enabled(false);
        assert!(snapshot.notifications_enabled);
        assert!(!snapshot.log_notifications());
    }
}
