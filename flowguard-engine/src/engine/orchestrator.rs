//! The capture → extract → classify → report cycle, repeated until stopped.
//!
//! A cycle never fails outward: every stage failure becomes exactly one
//! ERROR event naming the stage and the device, and the loop moves on to the
//! pause. The stop signal is only consulted between cycles, so a capture or
//! report already underway always runs to completion.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use flowguard_capture::{CaptureSource, FlowFilter, Packet};
use flowguard_classifier::{classify, Classifier, LabelMapper, Ranking};
use flowguard_config::AgentConfig;
use flowguard_core::{FlowMetrics, LogEvent, ReportPayload, StopSignal};
use flowguard_features::{FeatureExtractor, FlowFeatures};
use flowguard_reporter::ReportSink;
use flowguard_telemetry::{EventLogger, MetricsRecorder};
use tokio::task::spawn_blocking;
use tracing::{debug, info, instrument};

use crate::engine::error::{CycleError, CycleStage};

#[derive(Debug, Clone, PartialEq)]
pub struct CycleSettings {
    pub device: IpAddr,
    pub interface: String,
    pub window: Duration,
    pub pause: Duration,
    pub top_k: usize,
}

impl CycleSettings {
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            device: config.device_ip,
            interface: config.capture.interface.clone(),
            window: config.capture.window(),
            pause: config.cycle.pause(),
            top_k: config.cycle.top_k,
        }
    }
}

/// How one cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A report was handed to the sink; carries the top label.
    Reported { label: String },
    /// No device traffic in the window.
    EmptyWindow,
    Failed(CycleStage),
}

pub struct CycleOrchestrator {
    settings: CycleSettings,
    device_name: String,
    filter: FlowFilter,
    extractor: FeatureExtractor,
    capture: Arc<dyn CaptureSource>,
    classifier: Arc<dyn Classifier>,
    labels: Arc<dyn LabelMapper>,
    sink: Arc<dyn ReportSink>,
    metrics: Option<MetricsRecorder>,
    stop: StopSignal,
}

impl CycleOrchestrator {
    pub fn new(
        settings: CycleSettings,
        capture: Arc<dyn CaptureSource>,
        classifier: Arc<dyn Classifier>,
        labels: Arc<dyn LabelMapper>,
        sink: Arc<dyn ReportSink>,
        stop: StopSignal,
    ) -> Self {
        Self {
            device_name: settings.device.to_string(),
            filter: FlowFilter::new(settings.device),
            extractor: FeatureExtractor::new(settings.device),
            settings,
            capture,
            classifier,
            labels,
            sink,
            metrics: None,
            stop,
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsRecorder) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Runs cycles until the stop signal is raised. Returns the number of
    /// cycles that ran.
    #[instrument(skip_all, fields(device = %self.device_name, interface = %self.settings.interface))]
    pub async fn run(&self) -> u64 {
        info!(
            window = ?self.settings.window,
            pause = ?self.settings.pause,
            "cycle loop started"
        );

        let mut cycles = 0u64;
        while !self.stop.is_raised() {
            let outcome = self.run_cycle().await;
            cycles += 1;
            debug!(cycle = cycles, ?outcome, "cycle finished");

            tokio::select! {
                _ = tokio::time::sleep(self.settings.pause) => {}
                _ = self.stop.raised() => {}
            }
        }

        info!(cycles, "cycle loop stopped");
        cycles
    }

    /// Runs exactly one cycle.
    pub async fn run_cycle(&self) -> CycleOutcome {
        self.count(|m| m.inc_cycles());

        let window = match self.capture_window().await {
            Ok(window) => window,
            Err(err) => return self.fail(CycleStage::Capture, err),
        };
        self.count(|m| m.observe_window(window.len()));

        let started = Instant::now();
        let (features, ranking) = match self.classify_window(window).await {
            Ok(Some(classified)) => classified,
            Ok(None) => {
                self.count(|m| m.inc_empty_windows());
                self.emit(LogEvent::warn(format!(
                    "{} - No features extracted.",
                    self.device_name
                )));
                return CycleOutcome::EmptyWindow;
            }
            Err(err) => return self.fail(CycleStage::Classification, err),
        };
        self.count(|m| m.observe_classification(started.elapsed()));

        let flow_metrics = FlowMetrics::from_features(&features.vector).unwrap_or_else(|err| {
            self.count(|m| m.inc_degraded_metrics());
            self.emit(LogEvent::error(format!(
                "{} - Error during metrics: {}",
                self.device_name,
                CycleError::from(err)
            )));
            FlowMetrics::zeroed()
        });

        let label = ranking.top_label().to_string();
        debug!(peers = %features.peers, confidence = ranking.confidence(), "window classified");
        self.sink
            .submit_report(ReportPayload::new(ranking, flow_metrics, features.peers));
        self.emit(LogEvent::info(format!(
            "{} - Most likely traffic: {label}",
            self.device_name
        )));

        CycleOutcome::Reported { label }
    }

    async fn capture_window(&self) -> Result<Vec<Packet>, CycleError> {
        let capture = Arc::clone(&self.capture);
        let interface = self.settings.interface.clone();
        let window = self.settings.window;
        let filter = self.filter;

        let packets = spawn_blocking(move || {
            capture.capture(&interface, window, &|packet| filter.accepts(packet))
        })
        .await??;
        Ok(packets)
    }

    /// Extracts and classifies off the async workers; a panicking model
    /// surfaces as a join error instead of unwinding through the loop.
    async fn classify_window(
        &self,
        window: Vec<Packet>,
    ) -> Result<Option<(FlowFeatures, Ranking)>, CycleError> {
        let extractor = self.extractor;
        let classifier = Arc::clone(&self.classifier);
        let labels = Arc::clone(&self.labels);
        let top_k = self.settings.top_k;

        spawn_blocking(move || -> Result<_, CycleError> {
            let Some(features) = extractor.extract(&window, classifier.schema()) else {
                return Ok(None);
            };
            let ranking = classify(
                classifier.as_ref(),
                labels.as_ref(),
                &features.vector,
                top_k,
            )?;
            Ok(Some((features, ranking)))
        })
        .await?
    }

    fn fail(&self, stage: CycleStage, err: CycleError) -> CycleOutcome {
        self.count(|m| m.record_failure(stage.as_str()));
        self.emit(LogEvent::error(format!(
            "{} - Error during {stage}: {err}",
            self.device_name
        )));
        CycleOutcome::Failed(stage)
    }

    /// Records locally and forwards to the collector.
    fn emit(&self, event: LogEvent) {
        EventLogger::record(&event);
        self.sink.submit_log(event);
    }

    fn count(&self, update: impl FnOnce(&MetricsRecorder)) {
        if let Some(metrics) = &self.metrics {
            update(metrics);
        }
    }
}
