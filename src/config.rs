//! Configuration file parser for ~/.config/rssagg/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are silently ignored by serde (with `deny_unknown_fields` off),
//! though we log a warning when the file contains potential typos.
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::feed::{FetchOptions, DEFAULT_MAX_DEPTH};
use crate::render::RenderOptions;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Per-request timeout for remote feeds, in seconds.
    pub request_timeout_secs: u64,

    /// Retries for 429/5xx/truncated responses before giving up.
    pub max_retries: u32,

    /// Base retry delay in milliseconds, doubled on every attempt.
    pub retry_delay_ms: u64,

    /// Maximum accepted feed size in bytes.
    pub max_feed_size: usize,

    /// Maximum element nesting accepted from a document.
    pub max_depth: usize,

    /// User-Agent header sent with feed requests.
    pub user_agent: String,

    /// HTML-escape feed text before writing it into pages.
    pub escape_text: bool,

    /// Emit the `<body>` tag the index page otherwise lacks.
    pub open_index_body: bool,
}

impl Default for Config {
    fn default() -> Self {
        let fetch = FetchOptions::default();
        Self {
            request_timeout_secs: fetch.timeout.as_secs(),
            max_retries: fetch.max_retries,
            retry_delay_ms: fetch.retry_delay.as_millis() as u64,
            max_feed_size: fetch.max_size,
            max_depth: DEFAULT_MAX_DEPTH,
            user_agent: concat!("rssagg/", env!("CARGO_PKG_VERSION")).to_string(),
            escape_text: false,
            open_index_body: false,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 8] = [
        "request_timeout_secs",
        "max_retries",
        "retry_delay_ms",
        "max_feed_size",
        "max_depth",
        "user_agent",
        "escape_text",
        "open_index_body",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted (serde default behavior), logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading to prevent memory exhaustion
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
            escape_text = config.escape_text,
            open_index_body = config.open_index_body,
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_secs(self.request_timeout_secs),
            max_retries: self.max_retries,
            max_size: self.max_feed_size,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            escape_text: self.escape_text,
            open_index_body: self.open_index_body,
        }
    }

    /// HTTP client carrying the configured User-Agent and request timeout.
    pub fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .timeout(Duration::from_secs(self.request_timeout_secs))
            .build()
    }
}

// ============================================================================
// Tests
// ============================================================================
