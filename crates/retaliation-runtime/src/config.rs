//! Poller configuration.

use std::time::Duration;

/// Configuration for the event poller.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// How long to cool down between polls.
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

impl PollerConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cooldown between polls.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}
