//! The notification decision and dispatch engine.

pub mod dependency;
pub mod dispatcher;
pub mod escalation;
pub mod recipients;
pub mod scheduler;
pub mod sequence;
pub mod time_window;
pub mod viability;

pub use dependency::{DependencyChecker, DependencyKind, DependencyStatus, NoDependencies};
pub use dispatcher::{
    DeliveryOutcome, EngineBuildError, EpisodeError, NotificationEngine,
    NotificationEngineBuilder,
};
pub use recipients::RecipientList;
pub use sequence::NotificationIdSequence;
pub use viability::{DenyReason, Viability};
