//! Configuration parsing from CLI arguments and environment variables

use crate::{cli::Cli, config::env::EnvManager, error::Result, models::Config};

/// Builds the effective configuration: defaults, then environment, then CLI
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();
        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) {
        let cli = &self.cli;

        if let Some(ms) = cli.timeout_ms {
            config.read_timeout_ms = ms;
        }
        if let Some(ms) = cli.connect_timeout_ms {
            config.connect_timeout_ms = ms;
        }
        if let Some(secs) = cli.request_timeout {
            config.request_timeout_secs = secs;
        }
        if let Some(ref url) = cli.config_url {
            config.config_url = url.clone();
        }
        if let Some(ref url) = cli.servers_url {
            config.servers_url = url.clone();
        }
        if let Some(format) = cli.document_format {
            config.document_format = format;
        }
        if let Some(retries) = cli.retries {
            config.retry_attempts = retries;
        }
        if let Some(min) = cli.min_probe_successes {
            config.min_probe_successes = min as usize;
        }

        if cli.color {
            config.enable_color = true;
        } else if cli.no_color {
            config.enable_color = false;
        }

        // CLI-only settings
        config.output_format = cli.format;
        config.verbose = cli.verbose;
        config.debug = cli.debug;
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Configuration summary for debug logging
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Config URL: {}", config.config_url));
    summary.push(format!("Servers URL: {}", config.servers_url));
    summary.push(format!("Document format: {}", config.document_format));
    summary.push(format!(
        "Timeouts: connect {}ms, read {}ms, request {}s",
        config.connect_timeout_ms, config.read_timeout_ms, config.request_timeout_secs
    ));
    summary.push(format!("Retry attempts: {}", config.retry_attempts));
    summary.push(format!("Minimum probe successes: {}", config.min_probe_successes));
    summary.push(format!("Color Output: {}", config.enable_color));

    let active = EnvManager::active_env_vars();
    if !active.is_empty() {
        summary.push(format!("From environment: {}", active.join(", ")));
    }

    summary.join("\n")
}
