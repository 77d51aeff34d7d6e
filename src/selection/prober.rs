//! Round-trip latency probing against one candidate server

use crate::{
    client::{endpoint, HttpRequest, HttpTransport},
    defaults::{LATENCY_PATH, LATENCY_SENTINEL_SECS, PROBE_SAMPLES},
    error::Result,
    logging::{NoopRecorder, Recorder},
    models::LatencyMeasurement,
    stats,
};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;

/// Times sequential requests to a server's latency endpoint
pub struct LatencyProber {
    transport: Arc<dyn HttpTransport>,
    recorder: Arc<dyn Recorder>,
}

impl LatencyProber {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            recorder: Arc::new(NoopRecorder),
        }
    }

    pub fn with_recorder(mut self, recorder: Arc<dyn Recorder>) -> Self {
        self.recorder = recorder;
        self
    }

    /// Probe `base_url` with [`PROBE_SAMPLES`] sequential requests.
    ///
    /// Samples run one after another so they never contend with each other.
    /// A request that fails, times out or answers non-2xx contributes
    /// [`LATENCY_SENTINEL_SECS`] instead of aborting the probe. The result is
    /// the trimmed mean of the samples in milliseconds.
    pub async fn probe(&self, base_url: &str) -> Result<LatencyMeasurement> {
        let url = endpoint(base_url, LATENCY_PATH);
        let mut samples = Vec::with_capacity(PROBE_SAMPLES);
        let mut successes = 0;

        for _ in 0..PROBE_SAMPLES {
            let request = HttpRequest::get(url.as_str()).with_query("x", Utc::now().timestamp_millis());
            let started = Instant::now();
            let outcome = self.transport.execute(request).await;
            let elapsed = started.elapsed().as_secs_f64();

            match outcome {
                Ok(response) if response.is_success() => {
                    samples.push(elapsed);
                    successes += 1;
                }
                Ok(response) => {
                    self.recorder
                        .record(&format!("{} latency probe answered {}", base_url, response.status_code));
                    samples.push(LATENCY_SENTINEL_SECS);
                }
                Err(e) => {
                    self.recorder.record(&format!("{} latency probe failed: {}", base_url, e));
                    samples.push(LATENCY_SENTINEL_SECS);
                }
            }
        }

        let latency_millis = latency_millis(&samples)?;
        Ok(LatencyMeasurement {
            url: base_url.to_string(),
            latency_millis,
            successful_samples: successes,
        })
    }
}

/// Trimmed mean of per-request durations in seconds, scaled to milliseconds
pub fn latency_millis(samples_secs: &[f64]) -> Result<f64> {
    Ok(stats::trimmed_mean(samples_secs)? * 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{fake::FakeTransport, HttpResponse};
    use crate::error::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_latency_scaled_to_millis() {
        let samples = [0.010, 0.020, 0.015, LATENCY_SENTINEL_SECS, 0.012, 0.018];
        let millis = latency_millis(&samples).unwrap();
        assert!((millis - 16.25).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_probe_issues_six_cache_busted_requests() {
        let transport = Arc::new(FakeTransport::new(|_| Ok(HttpResponse::new(200, "test=test"))));
        let prober = LatencyProber::new(transport.clone());

        let measurement = prober.probe("http://speedtest.example.net:8080").await.unwrap();

        assert_eq!(measurement.url, "http://speedtest.example.net:8080");
        assert_eq!(measurement.successful_samples, PROBE_SAMPLES);
        assert!(measurement.latency_millis < 1000.0);

        let requests = transport.requests();
        assert_eq!(requests.len(), PROBE_SAMPLES);
        for request in &requests {
            assert_eq!(request.url, "http://speedtest.example.net:8080/speedtest/latency.txt");
            assert_eq!(request.query.len(), 1);
            assert_eq!(request.query[0].0, "x");
            assert!(request.query[0].1.parse::<i64>().is_ok());
        }
    }

    #[tokio::test]
    async fn test_single_failure_is_trimmed_away() {
        let calls = AtomicUsize::new(0);
        let transport = Arc::new(FakeTransport::new(move |_| {
            if calls.fetch_add(1, Ordering::SeqCst) == 2 {
                Err(AppError::timeout("operation timed out"))
            } else {
                Ok(HttpResponse::new(200, ""))
            }
        }));

        let measurement = LatencyProber::new(transport).probe("http://a.example").await.unwrap();

        assert_eq!(measurement.successful_samples, 5);
        assert!(measurement.latency_millis < 1000.0);
    }

    #[tokio::test]
    async fn test_unreachable_server_gets_sentinel_latency() {
        let transport = Arc::new(FakeTransport::new(|_| Err(AppError::network("connection refused"))));

        let measurement = LatencyProber::new(transport).probe("http://down.example").await.unwrap();

        assert_eq!(measurement.successful_samples, 0);
        assert_eq!(measurement.latency_millis, LATENCY_SENTINEL_SECS * 1000.0);
    }

    #[tokio::test]
    async fn test_error_status_counts_as_failure() {
        let transport = Arc::new(FakeTransport::new(|_| Ok(HttpResponse::new(404, "not found"))));

        let measurement = LatencyProber::new(transport).probe("http://a.example").await.unwrap();

        assert_eq!(measurement.successful_samples, 0);
    }
}
