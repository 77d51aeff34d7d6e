//! Two-pass server selection: geographic pre-filter, then measured latency

use super::LatencyProber;
use crate::{
    client::{HttpRequest, HttpTransport},
    defaults::{DEFAULT_MIN_PROBE_SUCCESSES, PROBE_SAMPLES, TOP_CANDIDATES},
    directory::{self, DirectoryParser, LocationParser, XmlDirectoryParser, XmlLocationParser},
    error::{AppError, Result},
    logging::{NoopRecorder, Recorder},
    models::{ClientLocation, Config, GeoPoint, LatencyMeasurement, RankedServer, SelectedServer, ServerCandidate},
};
use std::sync::Arc;

/// Picks the server every transfer runs against
pub struct ServerSelector {
    transport: Arc<dyn HttpTransport>,
    location_parser: Arc<dyn LocationParser>,
    directory_parser: Arc<dyn DirectoryParser>,
    config_url: String,
    servers_url: String,
    min_probe_successes: usize,
    recorder: Arc<dyn Recorder>,
}

impl ServerSelector {
    /// Selector reading speedtest.net XML documents from the given URLs
    pub fn new(transport: Arc<dyn HttpTransport>, config_url: impl Into<String>, servers_url: impl Into<String>) -> Self {
        Self {
            transport,
            location_parser: Arc::new(XmlLocationParser),
            directory_parser: Arc::new(XmlDirectoryParser),
            config_url: config_url.into(),
            servers_url: servers_url.into(),
            min_probe_successes: DEFAULT_MIN_PROBE_SUCCESSES,
            recorder: Arc::new(NoopRecorder),
        }
    }

    pub fn from_config(transport: Arc<dyn HttpTransport>, config: &Config) -> Self {
        let (location, directory) = directory::parsers_for(config.document_format);
        Self::new(transport, config.config_url.as_str(), config.servers_url.as_str())
            .with_parsers(location, directory)
            .with_min_probe_successes(config.min_probe_successes)
    }

    pub fn with_parsers(mut self, location: Arc<dyn LocationParser>, directory: Arc<dyn DirectoryParser>) -> Self {
        self.location_parser = location;
        self.directory_parser = directory;
        self
    }

    pub fn with_min_probe_successes(mut self, min: usize) -> Self {
        self.min_probe_successes = min;
        self
    }

    pub fn with_recorder(mut self, recorder: Arc<dyn Recorder>) -> Self {
        self.recorder = recorder;
        self
    }

    /// Run the full selection.
    ///
    /// Any failure to fetch or parse either document, and an empty directory,
    /// is a [`AppError::Selection`]. Probe failures never are.
    pub async fn select(&self) -> Result<SelectedServer> {
        let client = self.locate_client().await?;
        self.recorder.record(&format!("Your IP: {}", client.ip));
        self.recorder.record(&format!("Your coordinates: {}", client.point));

        let candidates = self.load_candidates().await?;
        let ranked = rank_by_distance(&client.point, &candidates);
        self.recorder
            .record(&format!("{} servers sorted by distance, nearest {}", ranked.len(), describe(&ranked)));

        let prober = LatencyProber::new(self.transport.clone()).with_recorder(self.recorder.clone());
        let mut measurements = Vec::with_capacity(TOP_CANDIDATES);
        for server in nearest(&ranked, TOP_CANDIDATES) {
            measurements.push(prober.probe(&server.url).await?);
        }

        let by_latency = rank_by_latency(measurements, self.min_probe_successes);
        for m in &by_latency {
            self.recorder.record(&format!(
                "Top candidate {} - {:.3} ms ({} of {} probes answered)",
                m.url, m.latency_millis, m.successful_samples, PROBE_SAMPLES
            ));
        }

        let best = by_latency
            .into_iter()
            .next()
            .ok_or_else(|| AppError::selection("no candidate server could be probed"))?;

        if best.successful_samples < self.min_probe_successes {
            self.recorder.warn(&format!(
                "No server answered at least {} latency probes; using {} anyway",
                self.min_probe_successes, best.url
            ));
        }

        let selected = SelectedServer::from(best);
        self.recorder.record(&format!("Automatically selected server: {}", selected));
        Ok(selected)
    }

    /// Fetch and parse the client location document
    pub async fn locate_client(&self) -> Result<ClientLocation> {
        let body = self.fetch_document(&self.config_url).await?;
        self.location_parser.parse(&body).map_err(|e| {
            AppError::selection(format!("location document from {} is unusable: {}", self.config_url, e))
        })
    }

    /// Fetch and parse the server directory; never returns an empty list
    pub async fn load_candidates(&self) -> Result<Vec<ServerCandidate>> {
        let body = self.fetch_document(&self.servers_url).await?;
        let candidates = self.directory_parser.parse(&body).map_err(|e| {
            AppError::selection(format!("server directory from {} is unusable: {}", self.servers_url, e))
        })?;

        if candidates.is_empty() {
            return Err(AppError::selection(format!(
                "server directory from {} lists no usable servers",
                self.servers_url
            )));
        }
        Ok(candidates)
    }

    async fn fetch_document(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .transport
            .execute(HttpRequest::get(url))
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::selection(format!("could not fetch {}: {}", url, e)))?;
        Ok(response.body)
    }
}

/// Annotate every candidate with its distance from `origin`, nearest first.
///
/// The sort is stable, so equidistant servers keep their directory order.
pub fn rank_by_distance(origin: &GeoPoint, candidates: &[ServerCandidate]) -> Vec<RankedServer> {
    let mut ranked: Vec<RankedServer> = candidates
        .iter()
        .map(|c| RankedServer {
            url: c.url.clone(),
            distance: origin.distance(&c.coordinate),
        })
        .collect();
    ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    ranked
}

/// The first `n` entries, or all of them when fewer are listed
pub fn nearest(ranked: &[RankedServer], n: usize) -> &[RankedServer] {
    &ranked[..n.min(ranked.len())]
}

/// Order measurements for selection.
///
/// Candidates with at least `min_successes` answered probes come first; within
/// each group lower latency wins.
pub fn rank_by_latency(mut measurements: Vec<LatencyMeasurement>, min_successes: usize) -> Vec<LatencyMeasurement> {
    measurements.sort_by(|a, b| {
        let qualified_a = a.successful_samples >= min_successes;
        let qualified_b = b.successful_samples >= min_successes;
        qualified_b
            .cmp(&qualified_a)
            .then_with(|| a.latency_millis.total_cmp(&b.latency_millis))
    });
    measurements
}

fn describe(ranked: &[RankedServer]) -> String {
    nearest(ranked, TOP_CANDIDATES)
        .iter()
        .map(|s| format!("{} ({:.4})", s.url, s.distance))
        .collect::<Vec<_>>()
        .join(", ")
}
