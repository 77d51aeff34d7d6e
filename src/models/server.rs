//! Server directory and selection data models

use super::geo::GeoPoint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Client record from the location document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientLocation {
    /// Public IP as reported by the network; informational only
    pub ip: String,
    pub point: GeoPoint,
}

/// One test server listed in the directory, URL already reduced to its origin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerCandidate {
    pub url: String,
    pub coordinate: GeoPoint,
}

impl ServerCandidate {
    pub fn new(url: impl Into<String>, coordinate: GeoPoint) -> Self {
        Self {
            url: url.into(),
            coordinate,
        }
    }
}

/// Candidate annotated with its distance from the client
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedServer {
    pub url: String,
    pub distance: f64,
}

/// Candidate annotated with its probed latency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyMeasurement {
    pub url: String,
    pub latency_millis: f64,
    /// How many of the probe samples completed with a 2xx answer
    pub successful_samples: usize,
}

/// The server all transfers run against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedServer {
    pub url: String,
    pub latency_millis: f64,
}

impl From<LatencyMeasurement> for SelectedServer {
    fn from(measurement: LatencyMeasurement) -> Self {
        Self {
            url: measurement.url,
            latency_millis: measurement.latency_millis,
        }
    }
}

impl fmt::Display for SelectedServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {:.3} ms", self.url, self.latency_millis)
    }
}
