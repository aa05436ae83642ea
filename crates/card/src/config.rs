//! Configuration of remote card sessions

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Bound for operations that do not wait for user input
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration options for [`RemoteCard`](crate::RemoteCard)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteCardConfig {
    /// How long connect, disconnect, transmit and destroy PACE channel wait
    /// for the remote side
    pub response_timeout: Duration,
}

impl Default for RemoteCardConfig {
    fn default() -> Self {
        Self {
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
        }
    }
}

impl RemoteCardConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the response timeout
    pub const fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }
}

/// Settings that may change while sessions run
#[derive(Debug, Default)]
pub struct VolatileSettings {
    used_as_sdk: AtomicBool,
}

impl VolatileSettings {
    /// Create settings for the standalone application
    pub const fn new() -> Self {
        Self {
            used_as_sdk: AtomicBool::new(false),
        }
    }

    /// Mark whether the application is embedded by another one
    pub fn set_used_as_sdk(&self, used_as_sdk: bool) {
        self.used_as_sdk.store(used_as_sdk, Ordering::Relaxed);
    }

    /// Whether the application is embedded by another one
    pub fn is_used_as_sdk(&self) -> bool {
        self.used_as_sdk.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        assert_eq!(RemoteCardConfig::new().response_timeout, Duration::from_secs(5));
        let config = RemoteCardConfig::new().with_response_timeout(Duration::from_millis(50));
        assert_eq!(config.response_timeout, Duration::from_millis(50));
    }

    #[test]
    fn test_sdk_flag() {
        let settings = VolatileSettings::new();
        assert!(!settings.is_used_as_sdk());
        settings.set_used_as_sdk(true);
        assert!(settings.is_used_as_sdk());
    }
}
