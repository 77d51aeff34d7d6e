//! JSON documents
//!
//! Location: `{"ip": "..", "lat": .., "lon": ..}`. Directory: an array of
//! `{"url": "..", "lat": .., "lon": ..}` records, the shape of the
//! speedtest.net JS server list. Coordinates may be numbers or numeric
//! strings; other keys are ignored.

use super::{candidate_from_parts, DirectoryParser, LocationParser};
use crate::{
    error::{AppError, Result},
    models::{ClientLocation, GeoPoint, ServerCandidate},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Number(f64),
    Text(String),
}

impl Coordinate {
    fn value(&self) -> Result<f64> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| AppError::parse(format!("invalid coordinate '{}'", s))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ClientRecord {
    ip: String,
    lat: Coordinate,
    lon: Coordinate,
}

#[derive(Debug, Deserialize)]
struct ServerRecord {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    lat: Option<Coordinate>,
    #[serde(default)]
    lon: Option<Coordinate>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLocationParser;

impl LocationParser for JsonLocationParser {
    fn parse(&self, document: &[u8]) -> Result<ClientLocation> {
        let record: ClientRecord = serde_json::from_slice(document)?;
        let point = GeoPoint::new(record.lat.value()?, record.lon.value()?)?;
        Ok(ClientLocation { ip: record.ip, point })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonDirectoryParser;

impl DirectoryParser for JsonDirectoryParser {
    fn parse(&self, document: &[u8]) -> Result<Vec<ServerCandidate>> {
        let records: Vec<ServerRecord> = serde_json::from_slice(document)?;
        Ok(records
            .iter()
            .filter_map(|r| {
                let lat = r.lat.as_ref()?.value().ok()?;
                let lon = r.lon.as_ref()?.value().ok()?;
                candidate_from_parts(r.url.as_deref()?, lat, lon)
            })
            .collect())
    }
}
