//! Audit log lines: the operator-visible record of every notification
//! command issued.

use std::fmt;

#[cfg(test)]
use mockall::automock;

use crate::models::{EntityKind, MonitoredEntity, NotificationType};

/// The audit category of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditCategory {
    /// A host notification line.
    HostNotification,
    /// A service notification line.
    ServiceNotification,
}

impl fmt::Display for AuditCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditCategory::HostNotification => write!(f, "HOST NOTIFICATION"),
            AuditCategory::ServiceNotification => write!(f, "SERVICE NOTIFICATION"),
        }
    }
}

/// Sink for audit lines.
#[cfg_attr(test, automock)]
pub trait AuditLog: Send + Sync {
    /// Writes one newline-terminated audit line.
    fn write_line(&self, category: AuditCategory, line: &str);
}

/// An [`AuditLog`] that emits lines through `tracing` under the
/// `herald::audit` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditLog;

impl AuditLog for TracingAuditLog {
    fn write_line(&self, category: AuditCategory, line: &str) {
        tracing::info!(target: "herald::audit", category = %category, "{}", line);
    }
}

/// Formats the audit line for one contact and one command.
///
/// Field layout, `;`-separated:
/// - service, normal: `SERVICE NOTIFICATION: contact;host;service;STATE;command;output`
/// - service, acknowledgement/custom: the state field becomes
///   `TYPE (STATE)` and `;author;comment` is appended
/// - service, flapping/downtime: the state field becomes `TYPE (STATE)`
/// - host lines mirror the above without the service-description field.
pub fn format_audit_line(
    entity: &MonitoredEntity,
    contact_name: &str,
    kind: NotificationType,
    command_name: &str,
    author: Option<&str>,
    comment: Option<&str>,
) -> (AuditCategory, String) {
    let state = entity.current_state.to_string();

    let state_field = match kind {
        NotificationType::Normal => state,
        other => format!("{} ({})", other, state),
    };

    let mut fields: Vec<&str> = vec![contact_name, &entity.host_name];
    if let Some(service) = &entity.service {
        fields.push(&service.description);
    }
    fields.push(&state_field);
    fields.push(command_name);
    fields.push(&entity.plugin_output);

    let author_field = author.unwrap_or_default();
    let comment_field = comment.unwrap_or_default();
    if matches!(kind, NotificationType::Acknowledgement | NotificationType::Custom) {
        fields.push(author_field);
        fields.push(comment_field);
    }

    let category = match entity.kind() {
        EntityKind::Host => AuditCategory::HostNotification,
        EntityKind::Service => AuditCategory::ServiceNotification,
    };

    (category, format!("{}: {}", category, fields.join(";")))
}
