//! Environment variable catalogue and validation

use crate::error::{AppError, Result};
use crate::models::Config;

/// Environment variables understood by [`Config::merge_from_env`]
pub const SUPPORTED_ENV_VARS: &[(&str, &str, &str)] = &[
    ("SPEEDTEST_CONFIG_URL", "Client location document URL", crate::defaults::DEFAULT_CONFIG_URL),
    ("SPEEDTEST_SERVERS_URL", "Server directory document URL", crate::defaults::DEFAULT_SERVERS_URL),
    ("SPEEDTEST_DOCUMENT_FORMAT", "Format of both documents (xml, json)", "xml"),
    ("SPEEDTEST_CONNECT_TIMEOUT_MS", "Connect timeout per request (1-60000)", "1000"),
    ("SPEEDTEST_READ_TIMEOUT_MS", "Read inactivity timeout per request (1-60000)", "1000"),
    ("SPEEDTEST_REQUEST_TIMEOUT_SECS", "Hard cap per request in seconds (1-300)", "30"),
    ("SPEEDTEST_RETRY_ATTEMPTS", "Attempts per request for transient failures (1-5)", "1"),
    ("SPEEDTEST_MIN_PROBE_SUCCESSES", "Answered latency probes a server needs (0-6)", "5"),
    ("ENABLE_COLOR", "Enable colored output", "true"),
];

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Supported variables as `(name, description, default)`
    pub fn supported_env_vars() -> &'static [(&'static str, &'static str, &'static str)] {
        SUPPORTED_ENV_VARS
    }

    /// Names of supported variables currently set in the process environment
    pub fn active_env_vars() -> Vec<&'static str> {
        SUPPORTED_ENV_VARS
            .iter()
            .map(|(name, _, _)| *name)
            .filter(|name| std::env::var_os(name).is_some())
            .collect()
    }

    /// Validate one variable the same way the full configuration would
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        let mut config = Config::default();
        let value = value.trim();
        match key {
            "SPEEDTEST_CONFIG_URL" => config.config_url = value.to_string(),
            "SPEEDTEST_SERVERS_URL" => config.servers_url = value.to_string(),
            "SPEEDTEST_DOCUMENT_FORMAT" => {
                config.document_format = value
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?
            }
            "SPEEDTEST_CONNECT_TIMEOUT_MS" => config.connect_timeout_ms = parse(key, value)?,
            "SPEEDTEST_READ_TIMEOUT_MS" => config.read_timeout_ms = parse(key, value)?,
            "SPEEDTEST_REQUEST_TIMEOUT_SECS" => config.request_timeout_secs = parse(key, value)?,
            "SPEEDTEST_RETRY_ATTEMPTS" => config.retry_attempts = parse(key, value)?,
            "SPEEDTEST_MIN_PROBE_SUCCESSES" => config.min_probe_successes = parse(key, value)?,
            "ENABLE_COLOR" => config.enable_color = parse(key, value)?,
            _ => return Ok(()),
        }
        config.validate()
    }

    /// Help text listing every supported variable
    pub fn help_text() -> String {
        let mut out = String::from("ENVIRONMENT:\n");
        for (name, description, default) in SUPPORTED_ENV_VARS {
            out.push_str(&format!("  {:<32} {} [default: {}]\n", name, description, default));
        }
        out
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))
}
