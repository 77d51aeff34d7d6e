//! Concurrent execution of one transfer pass

use super::plan::{download_plan, parse_upload_echo, upload_plan, TransferUnit};
use crate::{
    client::HttpTransport,
    error::Result,
    logging::{NoopRecorder, Recorder},
    models::TransferResult,
    types::TransferDirection,
};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;

/// Runs every unit of a plan as its own tokio task and aggregates the bytes
pub struct TransferSampler {
    transport: Arc<dyn HttpTransport>,
    recorder: Arc<dyn Recorder>,
}

impl TransferSampler {
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

    pub async fn download(&self, base_url: &str) -> TransferResult {
        self.run(base_url, TransferDirection::Download, download_plan())
            .await
    }

    pub async fn upload(&self, base_url: &str) -> TransferResult {
        let plan = upload_plan(&mut rand::thread_rng());
        self.run(base_url, TransferDirection::Upload, plan).await
    }

    /// Dispatch all units at once, wait for every one, then aggregate.
    ///
    /// A unit that errors or whose task dies contributes zero bytes. Elapsed
    /// time spans dispatch of the first unit to completion of the last.
    pub async fn run(&self, base_url: &str, direction: TransferDirection, plan: Vec<TransferUnit>) -> TransferResult {
        let started = Instant::now();

        let handles: Vec<_> = plan
            .into_iter()
            .map(|unit| {
                let transport = self.transport.clone();
                let base_url = base_url.to_string();
                tokio::spawn(async move { measure_unit(transport.as_ref(), &unit, &base_url).await })
            })
            .collect();

        let outcomes = join_all(handles).await;
        let elapsed = started.elapsed();

        let mut unit_bytes = Vec::with_capacity(outcomes.len());
        let mut failed = 0;
        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(Ok(bytes)) => unit_bytes.push(bytes),
                Ok(Err(e)) => {
                    self.recorder
                        .record(&format!("{} unit {} failed: {}", direction, index, e));
                    failed += 1;
                    unit_bytes.push(0);
                }
                Err(e) => {
                    self.recorder
                        .record(&format!("{} unit {} did not finish: {}", direction, index, e));
                    failed += 1;
                    unit_bytes.push(0);
                }
            }
        }

        let result = TransferResult::new(direction, &unit_bytes, failed, elapsed);
        self.recorder.record(&format!(
            "Took {:.3} seconds to {} {} bytes in {} units",
            result.elapsed_seconds,
            direction.verb(),
            result.total_bytes,
            result.units
        ));
        result
    }
}

async fn measure_unit(transport: &dyn HttpTransport, unit: &TransferUnit, base_url: &str) -> Result<u64> {
    let response = transport
        .execute(unit.to_request(base_url))
        .await?
        .error_for_status()?;

    match unit {
        TransferUnit::Download { .. } => Ok(response.body_size() as u64),
        TransferUnit::Upload { .. } => parse_upload_echo(&response.text()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{fake::FakeTransport, HttpRequest, HttpResponse};
    use crate::error::AppError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn echo_upload(request: &HttpRequest) -> HttpResponse {
        let len = request
            .form
            .as_ref()
            .and_then(|f| f.first())
            .map(|(_, v)| v.len())
            .unwrap_or(0);
        HttpResponse::new(200, format!("size={}", len))
    }

    #[tokio::test]
    async fn test_download_pass_sums_all_units() {
        let transport = Arc::new(FakeTransport::new(|request| {
            let size = if request.url.ends_with("random750x750.jpg") { 1000 } else { 4000 };
            Ok(HttpResponse::new(200, vec![0u8; size]))
        }));

        let result = TransferSampler::new(transport.clone())
            .download("http://st.example")
            .await;

        assert_eq!(result.direction, TransferDirection::Download);
        assert_eq!(result.units, 4);
        assert_eq!(result.failed_units, 0);
        assert_eq!(result.total_bytes, 2 * 1000 + 2 * 4000);
        assert!(result.elapsed_seconds > 0.0);
        assert_eq!(transport.requests().len(), 4);
    }

    #[tokio::test]
    async fn test_upload_pass_uses_echoed_counts() {
        let transport = Arc::new(FakeTransport::new(|request| Ok(echo_upload(request))));

        let result = TransferSampler::new(transport).upload("http://st.example").await;

        assert_eq!(result.units, 8);
        assert_eq!(result.total_bytes, 4 * 19719 + 4 * 48396);
        assert!(result.bits_per_second().unwrap() > 0.0);
    }

    #[tokio::test]
    async fn test_failed_units_contribute_zero() {
        let transport = Arc::new(FakeTransport::new(|request| {
            if request.query.iter().any(|(k, v)| k == "y" && v == "2") {
                Err(AppError::timeout("operation timed out"))
            } else {
                Ok(HttpResponse::new(200, vec![0u8; 100]))
            }
        }));

        let result = TransferSampler::new(transport).download("http://st.example").await;

        assert_eq!(result.units, 4);
        assert_eq!(result.failed_units, 2);
        assert_eq!(result.total_bytes, 200);
    }

    #[tokio::test]
    async fn test_all_units_failing_is_zero_rate() {
        let transport = Arc::new(FakeTransport::new(|_| Err(AppError::network("connection reset"))));

        let result = TransferSampler::new(transport).upload("http://st.example").await;

        assert_eq!(result.total_bytes, 0);
        assert_eq!(result.failed_units, 8);
        assert_eq!(result.bits_per_second().unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_malformed_echo_and_error_status_count_zero() {
        let transport = Arc::new(FakeTransport::new(|request| {
            let nonce_even = request
                .query
                .iter()
                .any(|(k, v)| k == "x" && v.parse::<u32>().map(|n| n % 2 == 0).unwrap_or(false));
            if nonce_even {
                Ok(HttpResponse::new(200, "upload ok"))
            } else {
                Ok(HttpResponse::new(500, "size=1"))
            }
        }));

        let result = TransferSampler::new(transport).upload("http://st.example").await;

        assert_eq!(result.total_bytes, 0);
        assert_eq!(result.failed_units, 8);
    }

    #[tokio::test]
    async fn test_panicking_unit_does_not_crash_pass() {
        let transport = Arc::new(FakeTransport::new(|request| {
            if request.url.ends_with("random1500x1500.jpg") {
                panic!("transport bug");
            }
            Ok(HttpResponse::new(200, vec![0u8; 10]))
        }));

        let result = TransferSampler::new(transport).download("http://st.example").await;

        assert_eq!(result.total_bytes, 20);
        assert_eq!(result.failed_units, 2);
    }

    #[tokio::test]
    async fn test_summary_is_recorded() {
        #[derive(Default)]
        struct Collect(Mutex<Vec<String>>);
        impl Recorder for Collect {
            fn record(&self, message: &str) {
                self.0.lock().unwrap().push(message.to_string());
            }
        }

        let recorder = Arc::new(Collect::default());
        let transport = Arc::new(FakeTransport::new(|_| Ok(HttpResponse::new(200, vec![0u8; 5]))));
        TransferSampler::new(transport)
            .with_recorder(recorder.clone())
            .download("http://st.example")
            .await;

        let messages = recorder.0.lock().unwrap();
        assert!(messages
            .iter()
            .any(|m| m.starts_with("Took ") && m.ends_with("to download 20 bytes in 4 units")));
    }

    /// Answers every request after a fixed delay, tracking peak concurrency
    struct SlowTransport {
        delay: Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl SlowTransport {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl HttpTransport for SlowTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if request.form.is_some() {
                Ok(echo_upload(&request))
            } else {
                Ok(HttpResponse::new(200, vec![0u8; 256]))
            }
        }
    }

    #[tokio::test]
    async fn test_units_run_concurrently() {
        let delay = Duration::from_millis(300);

        let transport = Arc::new(SlowTransport::new(delay));
        let download = TransferSampler::new(transport.clone()).download("http://st.example").await;
        assert_eq!(transport.peak.load(Ordering::SeqCst), download.units);
        assert!(
            download.elapsed_seconds < delay.as_secs_f64() * download.units as f64 / 2.0,
            "download took {:.3}s",
            download.elapsed_seconds
        );
        assert!(download.elapsed_seconds >= delay.as_secs_f64());

        let transport = Arc::new(SlowTransport::new(delay));
        let upload = TransferSampler::new(transport.clone()).upload("http://st.example").await;
        assert_eq!(transport.peak.load(Ordering::SeqCst), upload.units);
        assert!(
            upload.elapsed_seconds < delay.as_secs_f64() * upload.units as f64 / 2.0,
            "upload took {:.3}s",
            upload.elapsed_seconds
        );
        assert_eq!(upload.total_bytes, 4 * 19719 + 4 * 48396);
    }
}
