//! Type definitions and aliases

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Wire format of the client-location and server-directory documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// speedtest.net legacy `<settings>` documents
    #[default]
    Xml,
    /// JSON records with `url`/`ip`, `lat` and `lon` keys
    Json,
}

impl FromStr for DocumentFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "xml" => Ok(Self::Xml),
            "json" => Ok(Self::Json),
            other => Err(AppError::parse(format!("Unknown document format: {}", other))),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xml => f.write_str("xml"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// How the final result is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

/// Direction of one transfer pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferDirection {
    Download,
    Upload,
}

impl TransferDirection {
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Download => "download",
            Self::Upload => "upload",
        }
    }
}

impl fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Download => f.write_str("Download"),
            Self::Upload => f.write_str("Upload"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_format_parsing() {
        assert_eq!("XML".parse::<DocumentFormat>().unwrap(), DocumentFormat::Xml);
        assert_eq!(" json ".parse::<DocumentFormat>().unwrap(), DocumentFormat::Json);
        assert!("yaml".parse::<DocumentFormat>().is_err());
        assert_eq!(DocumentFormat::default().to_string(), "xml");
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(TransferDirection::Download.to_string(), "Download");
        assert_eq!(TransferDirection::Upload.verb(), "upload");
    }
}
