//! Application-level configuration loading.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TALLY_BOARD_BACK_CONFIG_PATH";

/// Per-subscriber event buffer of a fanout room.
const DEFAULT_FANOUT_ROOM_CAPACITY: usize = 16;
/// Latency budget for a single store operation.
const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;
/// Keep-alive interval for SSE responses.
const DEFAULT_SSE_KEEPALIVE_SECS: u64 = 15;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Undelivered events buffered per room subscriber before it lags.
    pub fanout_room_capacity: usize,
    /// Budget after which a store call fails with a timeout instead of hanging.
    pub store_timeout: Duration,
    /// Interval between SSE keep-alive comments.
    pub sse_keepalive: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// built-in defaults when the file is missing or malformed.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), ?config, "loaded configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fanout_room_capacity: DEFAULT_FANOUT_ROOM_CAPACITY,
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
            sse_keepalive: Duration::from_secs(DEFAULT_SSE_KEEPALIVE_SECS),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    fanout_room_capacity: Option<usize>,
    store_timeout_ms: Option<u64>,
    sse_keepalive_secs: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            fanout_room_capacity: raw
                .fanout_room_capacity
                .unwrap_or(defaults.fanout_room_capacity),
            store_timeout: raw
                .store_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.store_timeout),
            sse_keepalive: raw
                .sse_keepalive_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.sse_keepalive),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_raw_config_keeps_defaults_for_missing_fields() {
        let raw: RawConfig = serde_json::from_str(r#"{"store_timeout_ms": 250}"#).unwrap();
        let config = AppConfig::from(raw);
        assert_eq!(config.store_timeout, Duration::from_millis(250));
        assert_eq!(config.fanout_room_capacity, DEFAULT_FANOUT_ROOM_CAPACITY);
        assert_eq!(
            config.sse_keepalive,
            Duration::from_secs(DEFAULT_SSE_KEEPALIVE_SECS)
        );
    }
}
