//! Command-line interface

use crate::types::{DocumentFormat, OutputFormat};
use clap::Parser;

/// Network Speed Tester - latency, download and upload against the nearest speedtest.net server
#[derive(Parser, Debug, Clone)]
#[command(name = "nst")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Read inactivity timeout per request in milliseconds
    #[arg(long, value_name = "MS", value_parser = parse_millis)]
    pub timeout_ms: Option<u64>,

    /// Connect timeout per request in milliseconds
    #[arg(long, value_name = "MS", value_parser = parse_millis)]
    pub connect_timeout_ms: Option<u64>,

    /// Hard cap on a whole request in seconds
    #[arg(long, value_name = "SECS", value_parser = parse_duration)]
    pub request_timeout: Option<u64>,

    /// Client location document URL
    #[arg(long, value_name = "URL")]
    pub config_url: Option<String>,

    /// Server directory document URL
    #[arg(long, value_name = "URL")]
    pub servers_url: Option<String>,

    /// Result output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Format of the location and directory documents
    #[arg(long, value_enum)]
    pub document_format: Option<DocumentFormat>,

    /// Attempts per request for transient transport failures
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=5))]
    pub retries: Option<u32>,

    /// Answered latency probes (of 6) a server needs to be preferred
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(0..=6))]
    pub min_probe_successes: Option<u64>,

    /// Force colored output
    #[arg(long, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Log selection and transfer progress to stderr
    #[arg(long)]
    pub verbose: bool,

    /// Log everything as JSON lines to stderr
    #[arg(long)]
    pub debug: bool,

    /// List supported environment variables and exit
    #[arg(long)]
    pub env_help: bool,
}

impl Cli {
    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }
}

/// Parse a millisecond timeout, 1..=60000
fn parse_millis(s: &str) -> Result<u64, String> {
    let ms: u64 = s.parse().map_err(|_| format!("Invalid timeout: {}", s))?;
    if ms == 0 {
        Err("Timeout must be greater than 0".to_string())
    } else if ms > 60_000 {
        Err("Timeout cannot exceed 60000 ms".to_string())
    } else {
        Ok(ms)
    }
}

/// Parse duration from seconds string
fn parse_duration(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Duration must be greater than 0".to_string())
            } else if secs > 300 {
                Err("Duration cannot exceed 300 seconds".to_string())
            } else {
                Ok(secs)
            }
        })
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}
