//! Coordinator and logging configuration.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{Config, CoordinatorConfig, LoggingConfig};
