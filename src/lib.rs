//! Network Speed Tester
//!
//! Measures latency, download and upload throughput against the
//! speedtest.net server network. The nearest servers by coordinate are
//! probed for latency, the fastest one is selected, and concurrent transfer
//! passes are timed against it.

pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod directory;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod selection;
pub mod stats;
pub mod transfer;
pub mod types;

// Re-export commonly used types
pub use app::SpeedTest;
pub use error::{AppError, Result};
pub use models::{Config, GeoPoint, SelectedServer, SpeedTestResult, TransferResult};
pub use stats::{bits_per_second, humanize, trimmed_mean};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build information set by `build.rs`
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const GIT_COMMIT: &str = env!("GIT_COMMIT");
pub const TARGET_TRIPLE: &str = env!("TARGET_TRIPLE");

/// Default configuration values and protocol constants
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_CONFIG_URL: &str = "http://www.speedtest.net/speedtest-config.php";
    pub const DEFAULT_SERVERS_URL: &str = "http://www.speedtest.net/speedtest-servers.php";

    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);
    pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_RETRY_ATTEMPTS: u32 = 1;
    pub const DEFAULT_MIN_PROBE_SUCCESSES: usize = 5;
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    /// Sequential latency requests per candidate
    pub const PROBE_SAMPLES: usize = 6;
    /// Nearest candidates that get probed
    pub const TOP_CANDIDATES: usize = 3;
    /// Seconds recorded for a probe that failed or timed out
    pub const LATENCY_SENTINEL_SECS: f64 = 999_999.0;

    pub const LATENCY_PATH: &str = "speedtest/latency.txt";
    pub const UPLOAD_PATH: &str = "speedtest/upload.php";
    pub const UPLOAD_FIELD: &str = "content0";

    pub const DOWNLOAD_FILES: &[&str] = &["speedtest/random750x750.jpg", "speedtest/random1500x1500.jpg"];
    pub const DOWNLOAD_RUNS: usize = 2;
    pub const UPLOAD_SIZES: &[usize] = &[19_719, 48_396];
    pub const UPLOAD_RUNS: usize = 4;
}
