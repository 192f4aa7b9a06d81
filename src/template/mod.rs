//! Macro substitution for notification command templates.
//!
//! The engine never executes a raw command line: every command configured on
//! a contact is a template expanded against the [`MacroContext`] of the
//! episode in progress. The context is an explicit value threaded through
//! the dispatcher call chain; there is no process-wide substitution state.

#[cfg(test)]
use mockall::automock;
use minijinja::Environment;
use serde_json::{json, Value};
use thiserror::Error;

use crate::models::{Contact, MonitoredEntity, NotificationType};

/// Characters stripped from expanded commands when
/// [`ExpandOptions::strip_illegal`] is set.
const ILLEGAL_OUTPUT_CHARS: &str = "`~$&|\"<>";

/// Post-processing options applied to an expanded template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpandOptions {
    /// Strip shell metacharacters from the result.
    pub strip_illegal: bool,
    /// Backslash-escape double quotes and fold newlines.
    pub escape: bool,
    /// Percent-encode the result for use inside a URL.
    pub url_encode: bool,
}

/// Errors raised while expanding a command template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template failed to parse or render.
    #[error("failed to render command template")]
    Render(#[from] minijinja::Error),
}

/// The substitution state for one notification episode, optionally narrowed
/// to one contact.
#[derive(Debug, Clone)]
pub struct MacroContext {
    fields: Value,
}

impl MacroContext {
    /// Builds the entity-scoped context for an episode: entity identity and
    /// state, the owning host for services, and notification metadata.
    pub fn for_entity(
        entity: &MonitoredEntity,
        host: Option<&MonitoredEntity>,
        kind: NotificationType,
        escalated: bool,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        let mut fields = json!({
            "host": {
                "name": entity.host_name,
                "state": host.map(|h| h.current_state.to_string())
                    .unwrap_or_else(|| entity.current_state.to_string()),
                "output": host.map(|h| h.plugin_output.clone())
                    .unwrap_or_else(|| entity.plugin_output.clone()),
            },
            "notification": {
                "type": kind.to_string(),
                "number": entity.current_notification_number,
                "id": entity.current_notification_id,
                "escalated": escalated,
                "datetime": now.to_rfc3339(),
            },
        });

        if let Some(service) = &entity.service {
            fields["service"] = json!({
                "description": service.description,
                "state": entity.current_state.to_string(),
                "output": entity.plugin_output,
            });
        }

        MacroContext { fields }
    }

    /// Adds acknowledgement/custom author and comment fields. The resolved
    /// author contact name is included when the author string matched a
    /// known contact; otherwise no contact is identified.
    pub fn with_author_comment(
        mut self,
        author: Option<&str>,
        author_contact: Option<&str>,
        comment: Option<&str>,
    ) -> Self {
        self.fields["author"] = json!(author.unwrap_or_default());
        self.fields["author_contact"] = json!(author_contact);
        self.fields["comment"] = json!(comment.unwrap_or_default());
        self
    }

    /// Returns a copy of this context narrowed to one contact.
    pub fn with_contact(&self, contact: &Contact) -> Self {
        let mut fields = self.fields.clone();
        fields["contact"] = json!({
            "name": contact.name,
            "email": contact.email,
        });
        MacroContext { fields }
    }

    /// The raw context value handed to the rendering engine.
    pub fn as_value(&self) -> &Value {
        &self.fields
    }
}

/// Expands command templates against a [`MacroContext`].
#[cfg_attr(test, automock)]
pub trait TemplateEngine: Send + Sync {
    /// Renders `template` with the given context and applies the requested
    /// post-processing.
    fn expand(
        &self,
        template: &str,
        ctx: &MacroContext,
        options: ExpandOptions,
    ) -> Result<String, TemplateError>;
}

/// A [`TemplateEngine`] backed by minijinja with strict undefined-variable
/// behavior: a template referencing an unknown macro fails to expand rather
/// than silently producing a broken command line.
pub struct MinijinjaTemplateEngine {
    env: Environment<'static>,
}

impl Default for MinijinjaTemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MinijinjaTemplateEngine {
    /// Creates a new engine.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
        Self { env }
    }
}

impl TemplateEngine for MinijinjaTemplateEngine {
    fn expand(
        &self,
        template: &str,
        ctx: &MacroContext,
        options: ExpandOptions,
    ) -> Result<String, TemplateError> {
        let rendered = self.env.render_str(template, ctx.as_value())?;
        Ok(post_process(rendered, options))
    }
}

/// Applies [`ExpandOptions`] to a rendered command line.
fn post_process(rendered: String, options: ExpandOptions) -> String {
    let mut result = rendered;

    if options.strip_illegal {
        result = result.chars().filter(|c| !ILLEGAL_OUTPUT_CHARS.contains(*c)).collect();
    }

    if options.escape {
        result = result.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n");
    }

    if options.url_encode {
        result = url::form_urlencoded::byte_serialize(result.as_bytes()).collect();
    }

    result
}
