//! Configuration module for herald.

mod engine_config;
mod helpers;

pub use config::ConfigError;
pub use engine_config::EngineConfig;
pub use helpers::{deserialize_duration_from_seconds, serialize_duration_to_seconds};
