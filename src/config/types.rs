use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Per-coordinator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Name attached to every log event of this coordinator.
    #[serde(default = "default_label")]
    pub label: String,
    /// Log non-cancellation fetch failures at error level (default: true).
    #[serde(default = "default_true")]
    pub report_failures: bool,
    /// Value of `is_loading` before the first dispatch (default: true).
    #[serde(default = "default_true")]
    pub initial_loading: bool,
}

/// Logging settings used by [`crate::logging::init`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter level when `RUST_LOG` is not set.
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_label() -> String {
    "fetch".to_string()
}

fn default_true() -> bool {
    true
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            label: default_label(),
            report_failures: true,
            initial_loading: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}
