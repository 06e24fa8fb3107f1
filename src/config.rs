//! Runtime settings shared by the binary and the library services.

use std::time::Duration;

pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Settings for the payment handoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffConfig {
    /// Upper bound on the confirmation call. A timeout is reported as a
    /// backend failure, never as a confirmed pick.
    pub confirm_timeout: Duration,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            confirm_timeout: DEFAULT_CONFIRM_TIMEOUT,
        }
    }
}

impl HandoffConfig {
    pub fn with_timeout_ms(millis: u64) -> Self {
        Self {
            confirm_timeout: Duration::from_millis(millis),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            json: false,
        }
    }
}
