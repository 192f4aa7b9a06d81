use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    audit::{AuditCategory, AuditLog},
    exec::{CommandExecutor, CommandOutcome, ExecutorError},
    hooks::{EpisodeEvent, LifecycleHooks},
    models::EpisodeOutcome,
};

/// A [`CommandExecutor`] that records every command line instead of running
/// anything. Every invocation reports immediate success.
#[derive(Default, Clone)]
pub struct RecordingExecutor {
    commands: Arc<Mutex<Vec<String>>>,
}

impl RecordingExecutor {
    /// The command lines received so far, in invocation order.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn run(
        &self,
        command_line: &str,
        _timeout: Duration,
    ) -> Result<CommandOutcome, ExecutorError> {
        self.commands.lock().unwrap().push(command_line.to_string());
        Ok(CommandOutcome {
            exit_status: Some(0),
            early_timeout: false,
            duration: Duration::from_millis(1),
        })
    }
}

/// An [`AuditLog`] that keeps lines in memory.
#[derive(Default, Clone)]
pub struct RecordingAuditLog {
    lines: Arc<Mutex<Vec<(AuditCategory, String)>>>,
}

impl RecordingAuditLog {
    /// The audit lines written so far.
    pub fn lines(&self) -> Vec<(AuditCategory, String)> {
        self.lines.lock().unwrap().clone()
    }
}

impl AuditLog for RecordingAuditLog {
    fn write_line(&self, category: AuditCategory, line: &str) {
        self.lines.lock().unwrap().push((category, line.to_string()));
    }
}

/// A [`LifecycleHooks`] implementation that records event markers.
#[derive(Default, Clone)]
pub struct RecordingHooks {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingHooks {
    /// Compact markers for every event received, in order:
    /// `episode_start`, `episode_end(notified)`, `contact_start(name)` and
    /// `contact_end(name, notified)`.
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl LifecycleHooks for RecordingHooks {
    fn episode_start(&self, _event: &EpisodeEvent) {
        self.events.lock().unwrap().push("episode_start".to_string());
    }

    fn episode_end(&self, _event: &EpisodeEvent, outcome: &EpisodeOutcome) {
        self.events.lock().unwrap().push(format!("episode_end({})", outcome.notified));
    }

    fn contact_start(&self, _event: &EpisodeEvent, contact: &str) {
        self.events.lock().unwrap().push(format!("contact_start({})", contact));
    }

    fn contact_end(&self, _event: &EpisodeEvent, contact: &str, notified: bool) {
        self.events.lock().unwrap().push(format!("contact_end({}, {})", contact, notified));
    }
}
