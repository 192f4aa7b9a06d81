//! The notification dispatcher: runs one episode end-to-end.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::Mutex;

use super::{
    dependency::{DependencyChecker, NoDependencies},
    recipients, scheduler,
    sequence::NotificationIdSequence,
    viability::{self, Viability},
};
use crate::{
    audit::{self, AuditLog, TracingAuditLog},
    exec::{CommandExecutor, ShellCommandExecutor},
    hooks::{EpisodeEvent, LifecycleHooks, NoopLifecycleHooks, NoopStatusPublisher, StatusPublisher},
    models::{
        EntityKey, EntityKind, EpisodeOutcome, MonitoredEntity, NotificationOptions,
        NotificationType,
    },
    runtime::RuntimeContext,
    store::{ContactHandle, ObjectStore},
    template::{ExpandOptions, MacroContext, MinijinjaTemplateEngine, TemplateEngine},
};

/// Errors that abort a notification episode.
#[derive(Debug, Error)]
pub enum EpisodeError {
    /// The entity key resolved to nothing.
    #[error("entity '{0}' not found in object store")]
    UnknownEntity(EntityKey),

    /// A service's host reference could not be resolved.
    #[error("service '{0}' references host '{1}' which cannot be resolved")]
    UnresolvedHost(EntityKey, String),
}

/// The per-contact delivery verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The contact passed its viability filter and its commands were
    /// processed.
    Success,
    /// The contact-level filter skipped the contact.
    Skipped,
}

/// The notification engine: decides and dispatches notifications for
/// monitored entities.
///
/// Episodes for the same entity serialize through a per-entity lock; the
/// engine mutates entity-owned bookkeeping (ordinal number, timestamps,
/// history flags) non-atomically across the steps of an episode.
pub struct NotificationEngine {
    store: Arc<dyn ObjectStore>,
    runtime: Arc<dyn RuntimeContext>,
    dependencies: Arc<dyn DependencyChecker>,
    templates: Arc<dyn TemplateEngine>,
    executor: Arc<dyn CommandExecutor>,
    audit: Arc<dyn AuditLog>,
    hooks: Arc<dyn LifecycleHooks>,
    status: Arc<dyn StatusPublisher>,
    sequence: NotificationIdSequence,
    episode_locks: DashMap<EntityKey, Arc<Mutex<()>>>,
}

impl NotificationEngine {
    /// Starts building an engine.
    pub fn builder() -> NotificationEngineBuilder {
        NotificationEngineBuilder::default()
    }

    /// Runs one notification episode for the entity identified by `key`.
    ///
    /// Returns the episode outcome; a denied episode is a successful call
    /// with zero notified contacts. `author` and `comment` accompany
    /// acknowledgement and custom notifications.
    pub async fn notify(
        &self,
        key: &EntityKey,
        kind: NotificationType,
        options: NotificationOptions,
        author: Option<&str>,
        comment: Option<&str>,
    ) -> Result<EpisodeOutcome, EpisodeError> {
        let lock = self.episode_lock(key);
        let _guard = lock.lock().await;

        let started_at = Utc::now();

        let entity_handle = self
            .store
            .entity(key)
            .ok_or_else(|| EpisodeError::UnknownEntity(key.clone()))?;

        // Resolve the owning host before any side effects; a service whose
        // host is gone aborts the whole episode.
        let host_snapshot = {
            let entity = entity_handle.read().await;
            match entity.kind() {
                EntityKind::Service => {
                    let host_key = EntityKey::host(entity.host_name.clone());
                    match self.store.entity(&host_key) {
                        Some(host_handle) => Some(host_handle.read().await.clone()),
                        None => {
                            tracing::error!(
                                entity = %key,
                                host = %entity.host_name,
                                "Aborting notification: service host cannot be resolved."
                            );
                            return Err(EpisodeError::UnresolvedHost(
                                key.clone(),
                                entity.host_name.clone(),
                            ));
                        }
                    }
                }
                EntityKind::Host => None,
            }
        };

        let event = EpisodeEvent { entity: key.clone(), kind, options, started_at };

        let verdict = {
            let mut entity = entity_handle.write().await;
            viability::check_entity_viability(
                &mut entity,
                host_snapshot.as_ref(),
                self.store.as_ref(),
                self.dependencies.as_ref(),
                self.runtime.as_ref(),
                kind,
                options,
                started_at,
            )
        };

        if let Viability::Deny(reason) = verdict {
            tracing::debug!(entity = %key, kind = %kind, ?reason, "Notification not viable.");
            let outcome = EpisodeOutcome::not_viable();
            self.hooks.episode_start(&event);
            self.hooks.episode_end(&event, &outcome);
            return Ok(outcome);
        }

        // Advance the ordinal and assign the episode id, then resolve
        // recipients against the advanced state.
        let mut incremented = false;
        let (recipients, escalated, entity_snapshot) = {
            let mut entity = entity_handle.write().await;

            if kind == NotificationType::Normal || options.increment {
                entity.current_notification_number += 1;
                incremented = true;
            }

            entity.last_notification_id = entity.current_notification_id;
            entity.current_notification_id = self.sequence.next_id();

            let (recipients, escalated) =
                recipients::resolve(&entity, self.store.as_ref(), options, started_at);
            (recipients, escalated, entity.clone())
        };

        self.hooks.episode_start(&event);

        let mut notified = 0usize;

        if !recipients.is_empty() {
            let author_contact = match author {
                Some(name) => {
                    let resolved = self.store.contact(name);
                    if resolved.is_none() {
                        tracing::debug!(
                            author = name,
                            "Notification author does not match a known contact."
                        );
                    }
                    resolved.map(|_| name)
                }
                None => None,
            };

            let ctx = MacroContext::for_entity(
                &entity_snapshot,
                host_snapshot.as_ref(),
                kind,
                escalated,
                started_at,
            )
            .with_author_comment(author, author_contact, comment);

            for (name, handle) in recipients.iter() {
                self.hooks.contact_start(&event, name);
                let delivered = self
                    .deliver(handle, &entity_snapshot, &ctx, kind, options, author, comment, started_at)
                    .await;
                if delivered == DeliveryOutcome::Success {
                    notified += 1;
                }
                self.hooks.contact_end(&event, name, delivered == DeliveryOutcome::Success);
            }

            if kind == NotificationType::Normal {
                let mut entity = entity_handle.write().await;
                if notified > 0 {
                    let next = match entity.kind() {
                        EntityKind::Service => scheduler::next_service_notification_time(
                            &mut entity,
                            self.store.as_ref(),
                            self.runtime.as_ref(),
                            started_at,
                        ),
                        EntityKind::Host => scheduler::next_host_notification_time(
                            &mut entity,
                            self.store.as_ref(),
                            self.runtime.as_ref(),
                            started_at,
                        ),
                    };
                    entity.next_notification = Some(next);
                    entity.last_notification = Some(started_at);
                    let state = entity.current_state;
                    entity.notified_on.set_for_state(state);
                } else if incremented {
                    // Nobody was notified; give the notification slot back.
                    entity.current_notification_number -= 1;
                }
            }
        } else {
            tracing::debug!(entity = %key, kind = %kind, "No contacts resolved for notification.");
            if incremented {
                let mut entity = entity_handle.write().await;
                entity.current_notification_number -= 1;
            }
        }

        let outcome =
            EpisodeOutcome { viable: true, escalated, recipients: recipients.len(), notified };
        self.hooks.episode_end(&event, &outcome);

        {
            let entity = entity_handle.read().await;
            self.status.publish(&entity);
        }

        tracing::debug!(
            entity = %key,
            kind = %kind,
            recipients = outcome.recipients,
            notified = outcome.notified,
            escalated = outcome.escalated,
            "Notification episode finished."
        );

        Ok(outcome)
    }

    /// Delivers one notification to one contact: re-checks contact-level
    /// viability, expands and runs every configured command, and stamps the
    /// contact's last-notification time.
    ///
    /// A contact counts as notified once its filter passes, regardless of
    /// individual command outcomes.
    #[allow(clippy::too_many_arguments)]
    async fn deliver(
        &self,
        handle: &ContactHandle,
        entity: &MonitoredEntity,
        ctx: &MacroContext,
        kind: NotificationType,
        options: NotificationOptions,
        author: Option<&str>,
        comment: Option<&str>,
        started_at: DateTime<Utc>,
    ) -> DeliveryOutcome {
        let contact = handle.read().await.clone();

        let verdict = viability::check_contact_viability(
            &contact,
            entity,
            self.store.as_ref(),
            kind,
            options,
            started_at,
        );
        if let Viability::Deny(reason) = verdict {
            tracing::debug!(
                contact = %contact.name,
                entity = %entity.key(),
                ?reason,
                "Contact filtered from notification."
            );
            return DeliveryOutcome::Skipped;
        }

        let contact_ctx = ctx.with_contact(&contact);

        for command in contact.commands(entity.kind()) {
            let expanded = match self.templates.expand(
                &command.command_line,
                &contact_ctx,
                ExpandOptions { strip_illegal: true, ..Default::default() },
            ) {
                Ok(line) if !line.trim().is_empty() => line,
                Ok(_) => {
                    tracing::debug!(
                        command = %command.name,
                        "Command template expanded to nothing, skipping."
                    );
                    continue;
                }
                Err(e) => {
                    tracing::warn!(
                        command = %command.name,
                        contact = %contact.name,
                        "Failed to expand command template: {}",
                        e
                    );
                    continue;
                }
            };

            if self.runtime.log_notifications() {
                let (category, line) = audit::format_audit_line(
                    entity,
                    &contact.name,
                    kind,
                    &command.name,
                    author,
                    comment,
                );
                self.audit.write_line(category, &line);
            }

            match self.executor.run(&expanded, self.runtime.notification_timeout()).await {
                Ok(outcome) if outcome.early_timeout => {
                    tracing::warn!(
                        command = %command.name,
                        contact = %contact.name,
                        timeout = ?self.runtime.notification_timeout(),
                        "Notification command timed out."
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        command = %command.name,
                        contact = %contact.name,
                        "Notification command failed to run: {}",
                        e
                    );
                }
            }
        }

        {
            let mut contact = handle.write().await;
            match entity.kind() {
                EntityKind::Host => contact.last_host_notification = Some(started_at),
                EntityKind::Service => contact.last_service_notification = Some(started_at),
            }
        }

        DeliveryOutcome::Success
    }

    /// The lock serializing episodes for one entity.
    fn episode_lock(&self, key: &EntityKey) -> Arc<Mutex<()>> {
        self.episode_locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// A builder for [`NotificationEngine`].
///
/// The object store and runtime are required; every other collaborator has
/// a bundled default.
#[derive(Default)]
pub struct NotificationEngineBuilder {
    store: Option<Arc<dyn ObjectStore>>,
    runtime: Option<Arc<dyn RuntimeContext>>,
    dependencies: Option<Arc<dyn DependencyChecker>>,
    templates: Option<Arc<dyn TemplateEngine>>,
    executor: Option<Arc<dyn CommandExecutor>>,
    audit: Option<Arc<dyn AuditLog>>,
    hooks: Option<Arc<dyn LifecycleHooks>>,
    status: Option<Arc<dyn StatusPublisher>>,
    first_notification_id: u64,
}

/// Errors raised when assembling a [`NotificationEngine`].
#[derive(Debug, Error)]
pub enum EngineBuildError {
    /// No object store was provided.
    #[error("an object store is required")]
    MissingStore,

    /// No runtime context was provided.
    #[error("a runtime context is required")]
    MissingRuntime,
}

impl NotificationEngineBuilder {
    /// Sets the object store.
    pub fn store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the runtime context.
    pub fn runtime(mut self, runtime: Arc<dyn RuntimeContext>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Sets the dependency checker.
    pub fn dependencies(mut self, dependencies: Arc<dyn DependencyChecker>) -> Self {
        self.dependencies = Some(dependencies);
        self
    }

    /// Sets the template engine.
    pub fn templates(mut self, templates: Arc<dyn TemplateEngine>) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Sets the command executor.
    pub fn executor(mut self, executor: Arc<dyn CommandExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Sets the audit log sink.
    pub fn audit(mut self, audit: Arc<dyn AuditLog>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Sets the lifecycle hooks.
    pub fn hooks(mut self, hooks: Arc<dyn LifecycleHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Sets the status publisher.
    pub fn status(mut self, status: Arc<dyn StatusPublisher>) -> Self {
        self.status = Some(status);
        self
    }

    /// Seeds the notification-id sequence, e.g. from retained state.
    pub fn first_notification_id(mut self, id: u64) -> Self {
        self.first_notification_id = id;
        self
    }

    /// Assembles the engine.
    pub fn build(self) -> Result<NotificationEngine, EngineBuildError> {
        let store = self.store.ok_or(EngineBuildError::MissingStore)?;
        let runtime = self.runtime.ok_or(EngineBuildError::MissingRuntime)?;

        Ok(NotificationEngine {
            store,
            runtime,
            dependencies: self.dependencies.unwrap_or_else(|| Arc::new(NoDependencies)),
            templates: self
                .templates
                .unwrap_or_else(|| Arc::new(MinijinjaTemplateEngine::new())),
            executor: self.executor.unwrap_or_else(|| Arc::new(ShellCommandExecutor)),
            audit: self.audit.unwrap_or_else(|| Arc::new(TracingAuditLog)),
            hooks: self.hooks.unwrap_or_else(|| Arc::new(NoopLifecycleHooks)),
            status: self.status.unwrap_or_else(|| Arc::new(NoopStatusPublisher)),
            sequence: NotificationIdSequence::starting_at(self.first_notification_id.max(1)),
            episode_locks: DashMap::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::EngineConfig,
        models::{EntityState, ServiceState},
        runtime::CoreRuntime,
        store::MemoryObjectStore,
        test_helpers::{ContactBuilder, EntityBuilder, RecordingExecutor},
    };

    #[test]
    fn test_build_requires_store_and_runtime() {
        let result = NotificationEngine::builder().build();
        assert!(matches!(result, Err(EngineBuildError::MissingStore)));

        let result = NotificationEngine::builder()
            .store(Arc::new(MemoryObjectStore::new()))
            .build();
        assert!(matches!(result, Err(EngineBuildError::MissingRuntime)));
    }

    #[tokio::test]
    async fn test_unknown_entity_is_an_error() {
        let engine = NotificationEngine::builder()
            .store(Arc::new(MemoryObjectStore::new()))
            .runtime(Arc::new(CoreRuntime::new(&EngineConfig::default())))
            .build()
            .unwrap();

        let result = engine
            .notify(
                &EntityKey::host("ghost"),
                NotificationType::Normal,
                NotificationOptions::NONE,
                None,
                None,
            )
            .await;
        assert!(matches!(result, Err(EpisodeError::UnknownEntity(_))));
    }

    #[tokio::test]
    async fn test_service_without_host_aborts() {
        let mut store = MemoryObjectStore::new();
        store.add_entity(
            EntityBuilder::service("web01", "http")
                .state(EntityState::Service(ServiceState::Critical))
                .build(),
        );
        store.add_contact(ContactBuilder::new("alice").build());

        let engine = NotificationEngine::builder()
            .store(Arc::new(store))
            .runtime(Arc::new(CoreRuntime::new(&EngineConfig::default())))
            .executor(Arc::new(RecordingExecutor::default()))
            .build()
            .unwrap();

        let result = engine
            .notify(
                &EntityKey::service("web01", "http"),
                NotificationType::Normal,
                NotificationOptions::NONE,
                None,
                None,
            )
            .await;
        assert!(matches!(result, Err(EpisodeError::UnresolvedHost(_, _))));
    }

    #[test]
    fn test_episode_lock_is_shared_and_distinct() {
        let engine = NotificationEngine::builder()
            .store(Arc::new(MemoryObjectStore::new()))
            .runtime(Arc::new(CoreRuntime::new(&EngineConfig::default())))
            .build()
            .unwrap();

        let key1 = EntityKey::host("web01");
        let key2 = EntityKey::host("web02");

        let lock1a = engine.episode_lock(&key1);
        let lock1b = engine.episode_lock(&key1);
        let lock2 = engine.episode_lock(&key2);

        assert!(Arc::ptr_eq(&lock1a, &lock1b));
        assert!(!Arc::ptr_eq(&lock1a, &lock2));
    }
}
