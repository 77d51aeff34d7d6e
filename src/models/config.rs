//! Configuration data model and validation

use crate::types::{AppError, DocumentFormat, OutputFormat, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Client location document
    #[serde(default = "default_config_url")]
    pub config_url: String,

    /// Server directory document
    #[serde(default = "default_servers_url")]
    pub servers_url: String,

    /// Wire format of both documents
    #[serde(default)]
    pub document_format: DocumentFormat,

    /// TCP connect timeout per request
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Maximum gap between reads of one response
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    /// Hard cap on a whole request, body included
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Attempts per request at the transport boundary (1 = no retry)
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Successful probe samples a candidate needs to rank ahead of others
    #[serde(default = "default_min_probe_successes")]
    pub min_probe_successes: usize,

    #[serde(default)]
    pub output_format: OutputFormat,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_url: default_config_url(),
            servers_url: default_servers_url(),
            document_format: DocumentFormat::default(),
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: default_read_timeout_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            min_probe_successes: default_min_probe_successes(),
            output_format: OutputFormat::default(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate the configuration and return the first problem found
    pub fn validate(&self) -> Result<()> {
        validate_http_url("config URL", &self.config_url)?;
        validate_http_url("servers URL", &self.servers_url)?;

        for (name, value) in [
            ("Connect timeout", self.connect_timeout_ms),
            ("Read timeout", self.read_timeout_ms),
        ] {
            if value == 0 {
                return Err(AppError::config(format!("{} must be greater than 0", name)));
            }
            if value > 60_000 {
                return Err(AppError::config(format!("{} cannot exceed 60000 ms", name)));
            }
        }

        if self.request_timeout_secs == 0 {
            return Err(AppError::config("Request timeout must be greater than 0"));
        }

        if self.request_timeout_secs > 300 {
            return Err(AppError::config("Request timeout cannot exceed 300 seconds"));
        }

        if !(1..=5).contains(&self.retry_attempts) {
            return Err(AppError::config("Retry attempts must be between 1 and 5"));
        }

        if self.min_probe_successes > crate::defaults::PROBE_SAMPLES {
            return Err(AppError::config(format!(
                "Minimum probe successes cannot exceed {}",
                crate::defaults::PROBE_SAMPLES
            )));
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("SPEEDTEST_CONFIG_URL") {
            self.config_url = url.trim().to_string();
        }

        if let Ok(url) = std::env::var("SPEEDTEST_SERVERS_URL") {
            self.servers_url = url.trim().to_string();
        }

        if let Ok(format) = std::env::var("SPEEDTEST_DOCUMENT_FORMAT") {
            self.document_format = format
                .parse()
                .map_err(|e| AppError::config(format!("Invalid SPEEDTEST_DOCUMENT_FORMAT value '{}': {}", format, e)))?;
        }

        if let Ok(value) = std::env::var("SPEEDTEST_CONNECT_TIMEOUT_MS") {
            self.connect_timeout_ms = parse_env("SPEEDTEST_CONNECT_TIMEOUT_MS", &value)?;
        }

        if let Ok(value) = std::env::var("SPEEDTEST_READ_TIMEOUT_MS") {
            self.read_timeout_ms = parse_env("SPEEDTEST_READ_TIMEOUT_MS", &value)?;
        }

        if let Ok(value) = std::env::var("SPEEDTEST_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_env("SPEEDTEST_REQUEST_TIMEOUT_SECS", &value)?;
        }

        if let Ok(value) = std::env::var("SPEEDTEST_RETRY_ATTEMPTS") {
            self.retry_attempts = parse_env("SPEEDTEST_RETRY_ATTEMPTS", &value)?;
        }

        if let Ok(value) = std::env::var("SPEEDTEST_MIN_PROBE_SUCCESSES") {
            self.min_probe_successes = parse_env("SPEEDTEST_MIN_PROBE_SUCCESSES", &value)?;
        }

        if let Ok(value) = std::env::var("ENABLE_COLOR") {
            self.enable_color = parse_env("ENABLE_COLOR", &value)?;
        }

        Ok(())
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))
}

fn validate_http_url(name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(AppError::config(format!("The {} cannot be empty", name)));
    }
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        Ok(parsed) => Err(AppError::config(format!(
            "The {} must use http or https, got '{}'",
            name,
            parsed.scheme()
        ))),
        Err(e) => Err(AppError::config(format!("Invalid {} '{}': {}", name, value, e))),
    }
}

// Default value functions for serde
fn default_config_url() -> String {
    crate::defaults::DEFAULT_CONFIG_URL.to_string()
}

fn default_servers_url() -> String {
    crate::defaults::DEFAULT_SERVERS_URL.to_string()
}

fn default_connect_timeout_ms() -> u64 {
    crate::defaults::DEFAULT_CONNECT_TIMEOUT.as_millis() as u64
}

fn default_read_timeout_ms() -> u64 {
    crate::defaults::DEFAULT_READ_TIMEOUT.as_millis() as u64
}

fn default_request_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_REQUEST_TIMEOUT.as_secs()
}

fn default_retry_attempts() -> u32 {
    crate::defaults::DEFAULT_RETRY_ATTEMPTS
}

fn default_min_probe_successes() -> usize {
    crate::defaults::DEFAULT_MIN_PROBE_SUCCESSES
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
