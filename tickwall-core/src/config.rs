/// Feed connection configuration
use std::time::Duration;

/// Settings for the upstream ticker feed and the session-level timers
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// WebSocket URL of the feed endpoint
    pub url: String,
    /// Interval of the unconditional full refresh (stuck-connection fallback)
    pub auto_refresh: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:9001".to_string(),
            auto_refresh: Duration::from_secs(300),
        }
    }
}

impl FeedConfig {
    /// Create a new configuration with a custom URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the full-refresh interval
    pub fn with_auto_refresh(mut self, interval: Duration) -> Self {
        self.auto_refresh = interval;
        self
    }

    /// Read the configuration from the environment
    ///
    /// `TICKWALL_WS_URL` overrides the feed URL and
    /// `TICKWALL_AUTO_REFRESH_SECS` the refresh interval; anything unset or
    /// unparsable falls back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let url = std::env::var("TICKWALL_WS_URL").unwrap_or(defaults.url);
        let auto_refresh = std::env::var("TICKWALL_AUTO_REFRESH_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.auto_refresh);

        Self { url, auto_refresh }
    }
}
