// ── Runtime hub configuration ──
//
// Describes *how* the realtime client connects and recovers. Built by
// the CLI from its profile config and handed in; core never reads
// config files.

use std::time::Duration;

use url::Url;

/// Reconnection policy: the single source of truth for attempt count
/// and next delay.
///
/// One budget drives everything: the transport performs no retries of
/// its own and the watchdog never shortcuts a delay. The counter resets
/// to zero on every successful connect.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Delay before the first reconnection attempt. Default: 3s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Attempts before giving up with `MaxRetries`. Default: 5.
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(3),
            max_delay: Duration::from_secs(30),
            max_retries: 5,
        }
    }
}

impl RetryPolicy {
    /// Delay before attempt `attempt` (0-based): exponential, capped.
    ///
    /// `delay = min(initial * 2^attempt, max)`
    pub fn delay(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_secs_f64() * 2.0_f64.powf(f64::from(attempt.min(16)));
        Duration::from_secs_f64(base.min(self.max_delay.as_secs_f64()))
    }
}

/// Configuration for the realtime hub connection.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Push hub endpoint (e.g. `https://roster.example.com/hubs/notifications`).
    pub hub_url: Url,

    /// Reconnection policy.
    pub retry: RetryPolicy,

    /// Health-watchdog tick interval. Independent of the retry delay;
    /// both are plain tunables. Default: 10s.
    pub watchdog_interval: Duration,
}

impl HubConfig {
    pub fn new(hub_url: Url) -> Self {
        Self {
            hub_url,
            retry: RetryPolicy::default(),
            watchdog_interval: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_retry_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.initial_delay, Duration::from_secs(3));
        assert_eq!(policy.max_delay, Duration::from_secs(30));
        assert_eq!(policy.max_retries, 5);
    }

    #[test]
    fn delay_doubles_then_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(0), Duration::from_secs(3));
        assert_eq!(policy.delay(1), Duration::from_secs(6));
        assert_eq!(policy.delay(2), Duration::from_secs(12));
        assert_eq!(policy.delay(3), Duration::from_secs(24));
        // Capped from attempt 4 onward.
        assert_eq!(policy.delay(4), Duration::from_secs(30));
        assert_eq!(policy.delay(60), Duration::from_secs(30));
    }
}
