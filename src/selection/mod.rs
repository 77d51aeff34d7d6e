//! Server selection
//!
//! [`ServerSelector`] ranks the directory by distance from the client, keeps
//! the nearest few and re-ranks them by [`LatencyProber`] measurements.

mod prober;
mod selector;

pub use prober::{latency_millis, LatencyProber};
pub use selector::{nearest, rank_by_distance, rank_by_latency, ServerSelector};
