//! Fixed workload plans for the download and upload passes

use crate::{
    client::{endpoint, HttpRequest},
    defaults::{DOWNLOAD_FILES, DOWNLOAD_RUNS, UPLOAD_FIELD, UPLOAD_PATH, UPLOAD_RUNS, UPLOAD_SIZES},
    error::{AppError, Result},
    types::TransferDirection,
};
use chrono::Utc;
use rand::Rng;

/// One independently executed transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferUnit {
    /// Fetch a fixed remote file; `run` starts at 1
    Download { path: String, run: usize },
    /// Post a random payload; `nonce` busts intermediate caches
    Upload { payload: String, nonce: u32 },
}

impl TransferUnit {
    pub fn direction(&self) -> TransferDirection {
        match self {
            Self::Download { .. } => TransferDirection::Download,
            Self::Upload { .. } => TransferDirection::Upload,
        }
    }

    /// Build the request for this unit against `base_url`.
    ///
    /// Download requests carry the current time in milliseconds, so call this
    /// at dispatch time.
    pub fn to_request(&self, base_url: &str) -> HttpRequest {
        match self {
            Self::Download { path, run } => HttpRequest::get(endpoint(base_url, path))
                .with_query("x", Utc::now().timestamp_millis())
                .with_query("y", run),
            Self::Upload { payload, nonce } => {
                HttpRequest::post_form(endpoint(base_url, UPLOAD_PATH), [(UPLOAD_FIELD, payload.as_str())])
                    .with_query("x", nonce)
            }
        }
    }
}

/// Every manifest file, [`DOWNLOAD_RUNS`] times each
pub fn download_plan() -> Vec<TransferUnit> {
    DOWNLOAD_FILES
        .iter()
        .flat_map(|path| {
            (1..=DOWNLOAD_RUNS).map(move |run| TransferUnit::Download {
                path: path.to_string(),
                run,
            })
        })
        .collect()
}

/// Every payload size, [`UPLOAD_RUNS`] times each, each payload freshly drawn
pub fn upload_plan<R: Rng + ?Sized>(rng: &mut R) -> Vec<TransferUnit> {
    let mut plan = Vec::with_capacity(UPLOAD_SIZES.len() * UPLOAD_RUNS);
    for &size in UPLOAD_SIZES.iter() {
        for _ in 0..UPLOAD_RUNS {
            plan.push(TransferUnit::Upload {
                payload: random_payload(rng, size),
                nonce: rng.gen(),
            });
        }
    }
    plan
}

/// `len` random uppercase ASCII letters
pub fn random_payload<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len).map(|_| rng.gen_range(b'A'..=b'Z') as char).collect()
}

/// Byte count echoed by the upload endpoint, e.g. `size=19719`.
///
/// The digits right after the first `=` are authoritative; anything after
/// them is ignored.
pub fn parse_upload_echo(body: &str) -> Result<u64> {
    let (_, value) = body
        .split_once('=')
        .ok_or_else(|| AppError::malformed_response(format!("upload echo without '=': {:?}", body)))?;

    let value = value.trim_start();
    let digits_end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    if digits_end == 0 {
        return Err(AppError::malformed_response(format!(
            "upload echo has no byte count: {:?}",
            body
        )));
    }

    value[..digits_end]
        .parse()
        .map_err(|e| AppError::malformed_response(format!("upload echo byte count: {}", e)))
}
