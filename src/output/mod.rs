//! Result rendering
//!
//! JSON is the machine-readable default with exactly the keys of
//! [`SpeedTestResult`]; the text report is for people and may be colored.

mod colored;

pub use colored::{LatencyLevel, TextFormatter};

use crate::{error::Result, models::SpeedTestResult, types::OutputFormat};

/// Renders a finished speed test
pub trait OutputFormatter: Send + Sync {
    fn format_result(&self, result: &SpeedTestResult) -> Result<String>;
}

/// Pretty-printed JSON document
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_result(&self, result: &SpeedTestResult) -> Result<String> {
        Ok(serde_json::to_string_pretty(result)?)
    }
}

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    pub fn create_formatter(format: OutputFormat, enable_color: bool) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Json => Box::new(JsonFormatter),
            OutputFormat::Text => Box::new(TextFormatter::new(enable_color)),
        }
    }
}
