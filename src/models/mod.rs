//! Data models and structures for the network speed tester

pub mod config;
pub mod geo;
pub mod metrics;
pub mod server;

// Re-export main model types
pub use config::Config;
pub use geo::{distance, GeoPoint};
pub use metrics::{SpeedTestResult, TransferResult};
pub use server::{ClientLocation, LatencyMeasurement, RankedServer, SelectedServer, ServerCandidate};
