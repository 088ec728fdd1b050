#[allow(clippy::module_inception)]
mod config;
mod config_serializer;

pub use config::{Config, ConfigError, ConfigRef, FallbackEntryConfig, NotificationText};
pub use config_serializer::serialize_config;
