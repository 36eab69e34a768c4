//! Configuration file parser for ~/.config/feedscout/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde but logged as warnings, since they are
//! usually typos.
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::feed::DEFAULT_USER_AGENT;
use crate::fetcher::{
    HttpFetcher, DEFAULT_MAX_BODY_BYTES, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY, DEFAULT_TIMEOUT,
};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Defaults for discovery runs started from the command line.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Agent identity for robots.txt matching and the User-Agent header.
    pub user_agent: String,

    /// Whether to honor robots.txt before fetching a page.
    pub obey_robots: bool,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Extra attempts after a transient fetch failure.
    pub retries: u32,

    /// Delay between attempts in milliseconds.
    pub retry_delay_ms: u64,

    /// Maximum response body size in bytes.
    pub max_body_bytes: usize,

    /// Refuse targets on localhost or private networks.
    pub block_private_hosts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            obey_robots: true,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            retries: DEFAULT_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY.as_millis() as u64,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            block_private_hosts: false,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 7] = [
        "user_agent",
        "obey_robots",
        "timeout_secs",
        "retries",
        "retry_delay_ms",
        "max_body_bytes",
        "block_private_hosts",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted (serde default behavior), logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse the TOML content first as a raw table to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            user_agent = %config.user_agent,
            obey_robots = config.obey_robots,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Builds the HTTP fetcher these settings describe around `client`.
    pub fn http_fetcher(&self, client: reqwest::Client) -> HttpFetcher {
        HttpFetcher::new(client)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_retries(self.retries)
            .with_retry_delay(Duration::from_millis(self.retry_delay_ms))
            .with_max_body_bytes(self.max_body_bytes)
    }
}

// ============================================================================
// Tests
// ============================================================================
