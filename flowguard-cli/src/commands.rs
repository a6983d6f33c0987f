use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info, warn};

use flowguard_capture::CaptureSource;
use flowguard_classifier::{load_artifacts, Classifier, LabelEncoder, LabelMapper, LinearModel};
use flowguard_config::AgentConfig;
use flowguard_core::features::keys;
use flowguard_core::{LogEvent, StopSignal};
use flowguard_engine::{CycleOrchestrator, CycleSettings};
use flowguard_reporter::{HttpReporter, ReportSink, ReporterSettings};
use flowguard_telemetry::{EventLogger, MetricsRecorder};

#[derive(Parser)]
#[command(name = "flowguard", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the capture/classify/report loop until interrupted
    Run(ConfigArgs),
    /// Validate the configuration and model artifacts, then exit
    CheckConfig(ConfigArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to the agent configuration (.yaml, .yml or .json)
    #[arg(short, long, default_value = "flowguard.yaml")]
    pub config: PathBuf,
}

/// Keys the reported flow metrics are read from.
const METRIC_KEYS: [&str; 6] = [
    keys::FLOW_DURATION,
    keys::TOTAL_FWD_PACKETS,
    keys::TOTAL_LENGTH_FWD_PACKETS,
    keys::AVERAGE_PACKET_SIZE,
    keys::FLOW_PACKETS_PER_SEC,
    keys::FLOW_BYTES_PER_SEC,
];

pub async fn run_agent(args: ConfigArgs) -> Result<()> {
    let config = load_config(&args)?;
    EventLogger::init(&config.logging.level, config.logging.file.as_deref())
        .context("failed to initialise logging")?;
    let device = config.device();

    let metrics = MetricsRecorder::new().context("failed to register metrics")?;
    let (model, labels) = load_model(&config)?;

    let reporter = Arc::new(
        HttpReporter::new(
            ReporterSettings {
                device: device.clone(),
                endpoint: config.collector.endpoint.clone(),
                workers: config.collector.workers,
                report_timeout: config.collector.report_timeout(),
                log_timeout: config.collector.log_timeout(),
            },
            Some(metrics.clone()),
        )
        .context("failed to set up the collector reporter")?,
    );

    let stop = StopSignal::new();
    spawn_signal_handler(stop.clone(), Arc::clone(&reporter), device.clone());

    emit(
        reporter.as_ref(),
        LogEvent::info(format!("{device} - Service starting...")),
    );

    let model: Arc<dyn Classifier> = Arc::new(model);
    let labels: Arc<dyn LabelMapper> = Arc::new(labels);
    let sink: Arc<dyn ReportSink> = reporter.clone();
    let orchestrator = CycleOrchestrator::new(
        CycleSettings::from_config(&config),
        capture_source(&config),
        model,
        labels,
        sink,
        stop,
    )
    .with_metrics(metrics.clone());

    orchestrator.run().await;

    let grace = config.cycle.shutdown_grace();
    if tokio::time::timeout(grace, reporter.drain()).await.is_err() {
        warn!(?grace, "shutdown grace period elapsed, abandoning in-flight reports");
    }

    match metrics.gather_metrics() {
        Ok(text) => debug!("final metrics:\n{text}"),
        Err(err) => warn!(error = %err, "failed to render metrics"),
    }
    info!("{device} - Service stopped");
    Ok(())
}

pub fn check_config(args: ConfigArgs) -> Result<()> {
    let config = load_config(&args)?;
    EventLogger::init(&config.logging.level, None).context("failed to initialise logging")?;
    let (model, labels) = load_model(&config)?;

    info!(
        device = %config.device_ip,
        interface = %config.capture.interface,
        endpoint = %config.collector.endpoint,
        features = model.schema().len(),
        classes = labels.len(),
        "configuration OK"
    );
    Ok(())
}

fn load_config(args: &ConfigArgs) -> Result<AgentConfig> {
    AgentConfig::load_from_path(&args.config)
        .with_context(|| format!("failed to load configuration from {}", args.config.display()))
}

fn load_model(config: &AgentConfig) -> Result<(LinearModel, LabelEncoder)> {
    let (model, labels) = load_artifacts(&config.model.model_path, &config.model.label_encoder_path)
        .context("failed to load model artifacts")?;

    let missing = missing_metric_keys(model.schema());
    if !missing.is_empty() {
        warn!(
            ?missing,
            "model schema lacks metric features; reports will carry zeroed metrics"
        );
    }
    Ok((model, labels))
}

fn missing_metric_keys(schema: &[String]) -> Vec<&'static str> {
    METRIC_KEYS
        .into_iter()
        .filter(|key| !schema.iter().any(|name| name == key))
        .collect()
}

#[cfg(feature = "live")]
fn capture_source(config: &AgentConfig) -> Arc<dyn CaptureSource> {
    Arc::new(flowguard_capture::PcapCaptureSource::new(
        config.capture.promiscuous,
        config.capture.snaplen,
    ))
}

#[cfg(not(feature = "live"))]
fn capture_source(_config: &AgentConfig) -> Arc<dyn CaptureSource> {
    warn!("built without the `live` feature; every capture will fail");
    Arc::new(flowguard_capture::UnavailableCaptureSource)
}

fn emit(sink: &dyn ReportSink, event: LogEvent) {
    EventLogger::record(&event);
    sink.submit_log(event);
}

/// Raises `stop` on the first SIGINT or SIGTERM.
fn spawn_signal_handler(stop: StopSignal, reporter: Arc<HttpReporter>, device: String) {
    tokio::spawn(async move {
        if let Err(err) = shutdown_signal().await {
            warn!(error = %err, "cannot listen for shutdown signals");
            return;
        }
        emit(
            reporter.as_ref(),
            LogEvent::info(format!("{device} - Service stopping...")),
        );
        stop.raise();
    });
}

#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::parse_from(["flowguard", "check-config", "--config", "/etc/flowguard.yaml"]);
        let Commands::CheckConfig(args) = cli.command else {
            panic!("expected check-config");
        };
        assert_eq!(args.config, PathBuf::from("/etc/flowguard.yaml"));

        let cli = Cli::parse_from(["flowguard", "run"]);
        assert!(matches!(cli.command, Commands::Run(_)));
    }

    #[test]
    fn reports_missing_metric_keys() {
        let schema: Vec<String> = METRIC_KEYS[..4].iter().map(|k| k.to_string()).collect();
        assert_eq!(
            missing_metric_keys(&schema),
            vec![keys::FLOW_PACKETS_PER_SEC, keys::FLOW_BYTES_PER_SEC]
        );
    }

    #[test]
    fn load_config_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let args = ConfigArgs {
            config: dir.path().join("missing.yaml"),
        };
        let err = load_config(&args).unwrap_err();
        assert!(err.to_string().contains("missing.yaml"));
    }
}
