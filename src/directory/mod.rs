//! Client location and server directory documents
//!
//! Selection logic never looks at wire formats. It asks a [`LocationParser`]
//! for the client record and a [`DirectoryParser`] for the candidate list;
//! [`parsers_for`] picks the pair matching the configured [`DocumentFormat`].

mod json;
mod xml;

pub use json::{JsonDirectoryParser, JsonLocationParser};
pub use xml::{XmlDirectoryParser, XmlLocationParser};

use crate::{
    error::{AppError, Result},
    models::{ClientLocation, GeoPoint, ServerCandidate},
    types::DocumentFormat,
};
use std::sync::Arc;
use url::Url;

/// Extracts the client record from a location document
pub trait LocationParser: Send + Sync {
    fn parse(&self, document: &[u8]) -> Result<ClientLocation>;
}

/// Extracts every listed test server from a directory document.
///
/// Entries with an unusable URL or coordinate are skipped; an empty result is
/// left for the caller to reject.
pub trait DirectoryParser: Send + Sync {
    fn parse(&self, document: &[u8]) -> Result<Vec<ServerCandidate>>;
}

/// Parser pair for one document format
pub fn parsers_for(format: DocumentFormat) -> (Arc<dyn LocationParser>, Arc<dyn DirectoryParser>) {
    match format {
        DocumentFormat::Xml => (Arc::new(XmlLocationParser), Arc::new(XmlDirectoryParser)),
        DocumentFormat::Json => (Arc::new(JsonLocationParser), Arc::new(JsonDirectoryParser)),
    }
}

/// Reduce a listed server URL to its scheme, host and port.
///
/// Directory entries usually point at the upload script, e.g.
/// `http://host:8080/speedtest/upload.php`; every endpoint used later is
/// rebuilt from the root `http://host:8080`.
pub fn normalize_server_root(raw: &str) -> Result<String> {
    let url = Url::parse(raw.trim())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::validation(format!(
            "server URL must be http or https: {}",
            raw
        )));
    }
    if url.host_str().is_none() {
        return Err(AppError::validation(format!("server URL has no host: {}", raw)));
    }
    Ok(url.origin().ascii_serialization())
}

/// Build a candidate from raw attribute text, `None` if any part is unusable
fn candidate_from_parts(url: &str, lat: f64, lon: f64) -> Option<ServerCandidate> {
    let root = normalize_server_root(url).ok()?;
    let point = GeoPoint::new(lat, lon).ok()?;
    Some(ServerCandidate::new(root, point))
}

fn utf8(document: &[u8]) -> Result<&str> {
    std::str::from_utf8(document)
        .map_err(|e| AppError::parse(format!("document is not valid UTF-8: {}", e)))
}
