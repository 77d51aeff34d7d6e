//! Main application orchestration and execution

use crate::{
    cli::Cli,
    client::{HttpTransport, NetworkClient},
    config::{display_config_summary, load_config},
    error::Result,
    logging::{Logger, NoopRecorder, Recorder},
    models::{Config, SpeedTestResult},
    output::OutputFormatterFactory,
    selection::ServerSelector,
    transfer::TransferSampler,
};
use std::sync::Arc;

/// One complete measurement: select, download, upload
pub struct SpeedTest {
    selector: ServerSelector,
    sampler: TransferSampler,
    recorder: Arc<dyn Recorder>,
}

impl SpeedTest {
    pub fn new(selector: ServerSelector, sampler: TransferSampler) -> Self {
        Self {
            selector,
            sampler,
            recorder: Arc::new(NoopRecorder),
        }
    }

    /// Wire every component to one transport and recorder
    pub fn with_transport(transport: Arc<dyn HttpTransport>, config: &Config, recorder: Arc<dyn Recorder>) -> Self {
        let selector = ServerSelector::from_config(transport.clone(), config).with_recorder(recorder.clone());
        let sampler = TransferSampler::new(transport).with_recorder(recorder.clone());
        Self {
            selector,
            sampler,
            recorder,
        }
    }

    /// Build the reqwest transport from `config` and wire everything to it
    pub fn from_config(config: &Config, recorder: Arc<dyn Recorder>) -> Result<Self> {
        let transport: Arc<dyn HttpTransport> = Arc::new(NetworkClient::from_config(config)?);
        Ok(Self::with_transport(transport, config, recorder))
    }

    /// Selection errors abort the run; failed transfer units only lower the rates
    pub async fn run(&self) -> Result<SpeedTestResult> {
        let server = self.selector.select().await?;
        self.recorder.record(&format!("Server {}", server.url));

        let download = self.sampler.download(&server.url).await;
        let download_bps = download.bits_per_second()?;
        self.recorder
            .record(&format!("Download: {}", crate::stats::humanize(download_bps)));

        let upload = self.sampler.upload(&server.url).await;
        let upload_bps = upload.bits_per_second()?;
        self.recorder
            .record(&format!("Upload: {}", crate::stats::humanize(upload_bps)));

        Ok(SpeedTestResult {
            server: server.url,
            latency_millis: server.latency_millis,
            download_bps,
            upload_bps,
        })
    }
}

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
}

impl App {
    /// Create a new application instance with CLI configuration
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Load configuration, run the speed test and render the result
    pub async fn run(self) -> Result<String> {
        let config = load_config(self.cli)?;
        let logger = Logger::with_config("nst", &config);

        logger
            .debug("Configuration loaded")
            .field("version", crate::VERSION)
            .field("commit", crate::GIT_COMMIT)
            .field("built", crate::BUILD_TIME)
            .field("target", crate::TARGET_TRIPLE)
            .field("summary", display_config_summary(&config))
            .log();

        let recorder: Arc<dyn Recorder> = Arc::new(logger.child("speedtest"));
        let speed_test = SpeedTest::from_config(&config, recorder)?;

        let result = match speed_test.run().await {
            Ok(result) => result,
            Err(e) => {
                logger.error("Speed test failed").error_info(&e).log();
                return Err(e);
            }
        };

        logger
            .info("Speed test complete")
            .field("server", &result.server)
            .field("latency_millis", result.latency_millis)
            .field("download_bps", result.download_bps)
            .field("upload_bps", result.upload_bps)
            .log();

        OutputFormatterFactory::create_formatter(config.output_format, config.enable_color).format_result(&result)
    }
}
