//! Throughput sampling
//!
//! A pass builds a fixed plan of [`TransferUnit`]s and runs all of them
//! concurrently against the selected server. The aggregate bytes and the
//! wall-clock span of the whole pass become one [`TransferResult`].
//!
//! [`TransferResult`]: crate::models::TransferResult

mod plan;
mod sampler;

pub use plan::{download_plan, parse_upload_echo, random_payload, upload_plan, TransferUnit};
pub use sampler::TransferSampler;
