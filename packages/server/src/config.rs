//! Server configuration.

use std::{path::PathBuf, time::Duration};

/// Shortest timer period; `tokio::time::interval` panics on zero.
const MIN_TICK: Duration = Duration::from_millis(1);

/// Transport keep-alive: the server pings every `interval` and drops a
/// socket that has been silent for `interval + timeout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAliveConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl KeepAliveConfig {
    /// Longest silence tolerated before the socket is considered dead.
    pub fn deadline(&self) -> Duration {
        self.interval + self.timeout
    }

    /// Ping period, never zero.
    pub fn ping_period(&self) -> Duration {
        self.interval.max(MIN_TICK)
    }
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(25_000),
            timeout: Duration::from_millis(60_000),
        }
    }
}

/// Idle expiry of participants that stopped sending intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceConfig {
    pub idle_threshold: Duration,
    pub sweep_interval: Duration,
}

impl PresenceConfig {
    /// Sweep period, never zero.
    pub fn sweep_period(&self) -> Duration {
        self.sweep_interval.max(MIN_TICK)
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            idle_threshold: Duration::from_millis(120_000),
            sweep_interval: Duration::from_millis(60_000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory served for every path not handled by the API.
    pub static_dir: PathBuf,
    pub keep_alive: KeepAliveConfig,
    pub presence: PresenceConfig,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            static_dir: PathBuf::from("public"),
            keep_alive: KeepAliveConfig::default(),
            presence: PresenceConfig::default(),
        }
    }
}
