//! Human-readable report with optional terminal colors

use super::OutputFormatter;
use crate::{error::Result, models::SpeedTestResult};
use colored::*;

/// Latency classification for color coding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyLevel {
    Excellent, // < 20ms
    Good,      // 20-50ms
    Fair,      // 50-150ms
    Poor,      // >= 150ms
}

impl LatencyLevel {
    pub fn from_millis(latency_ms: f64) -> Self {
        if latency_ms < 20.0 {
            Self::Excellent
        } else if latency_ms < 50.0 {
            Self::Good
        } else if latency_ms < 150.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Red,
        }
    }
}

/// Plain or colored multi-line report
#[derive(Debug, Clone, Copy)]
pub struct TextFormatter {
    use_color: bool,
}

impl TextFormatter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn paint(&self, text: String, color: Color) -> String {
        if self.use_color {
            text.as_str().color(color).bold().to_string()
        } else {
            text
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format_result(&self, result: &SpeedTestResult) -> Result<String> {
        let latency = format!("{:.3} ms", result.latency_millis);
        let level = LatencyLevel::from_millis(result.latency_millis);

        let mut out = String::new();
        out.push_str(&format!("Server: {}\n", result.server));
        out.push_str(&format!("Latency: {}\n", self.paint(latency, level.color())));
        out.push_str(&format!("Download: {}\n", self.paint(result.download_human(), Color::Cyan)));
        out.push_str(&format!("Upload: {}", self.paint(result.upload_human(), Color::Magenta)));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_levels() {
        assert_eq!(LatencyLevel::from_millis(5.0), LatencyLevel::Excellent);
        assert_eq!(LatencyLevel::from_millis(20.0), LatencyLevel::Good);
        assert_eq!(LatencyLevel::from_millis(75.0), LatencyLevel::Fair);
        assert_eq!(LatencyLevel::from_millis(999_999_000.0), LatencyLevel::Poor);
    }

    #[test]
    fn test_plain_report() {
        let result = SpeedTestResult {
            server: "http://st.example".to_string(),
            latency_millis: 16.25,
            download_bps: 2000.0,
            upload_bps: 512.0,
        };
        let text = TextFormatter::new(false).format_result(&result).unwrap();
        assert_eq!(
            text,
            "Server: http://st.example\nLatency: 16.250 ms\nDownload: 1.95 Kbps\nUpload: 512.00 bps"
        );
    }

    #[test]
    fn test_colored_report_keeps_values() {
        colored::control::set_override(true);
        let result = SpeedTestResult {
            server: "http://st.example".to_string(),
            latency_millis: 200.0,
            download_bps: 3.0 * 1024.0 * 1024.0,
            upload_bps: 0.0,
        };
        let text = TextFormatter::new(true).format_result(&result).unwrap();
        assert!(text.contains("3.00 Mbps"));
        assert!(text.contains("\u{1b}["));
        colored::control::unset_override();
    }
}
