//! Transfer pass aggregates and the final speed test record

use crate::error::Result;
use crate::stats;
use crate::types::TransferDirection;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Aggregate of one transfer pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferResult {
    pub direction: TransferDirection,
    /// Bytes moved by all units together
    pub total_bytes: u64,
    /// Wall-clock span from dispatch of the first unit to completion of the last
    pub elapsed_seconds: f64,
    /// Units dispatched
    pub units: usize,
    /// Units that failed and contributed zero bytes
    pub failed_units: usize,
}

impl TransferResult {
    pub fn new(direction: TransferDirection, unit_bytes: &[u64], failed_units: usize, elapsed: Duration) -> Self {
        Self {
            direction,
            total_bytes: unit_bytes.iter().sum(),
            elapsed_seconds: elapsed.as_secs_f64(),
            units: unit_bytes.len(),
            failed_units,
        }
    }

    /// Aggregate throughput of the pass
    pub fn bits_per_second(&self) -> Result<f64> {
        stats::bits_per_second(self.total_bytes, self.elapsed_seconds)
    }

    pub fn succeeded_units(&self) -> usize {
        self.units - self.failed_units
    }
}

/// Final output record; serialized with exactly these camelCase keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedTestResult {
    pub server: String,
    pub latency_millis: f64,
    pub download_bps: f64,
    pub upload_bps: f64,
}

impl SpeedTestResult {
    pub fn download_human(&self) -> String {
        stats::humanize(self.download_bps)
    }

    pub fn upload_human(&self) -> String {
        stats::humanize(self.upload_bps)
    }
}
