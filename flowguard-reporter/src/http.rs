//! HTTP delivery through a bounded pool of tokio tasks.
//!
//! Every submission becomes one task in a `JoinSet`. A task waits for one of
//! `workers` semaphore permits, makes a single attempt and exits; finished
//! tasks are reaped on the next submission or by [`HttpReporter::drain`].

use std::sync::Arc;
use std::time::Duration;

use flowguard_core::{LogEvent, ReportPayload};
use flowguard_telemetry::{EventLogger, MetricsRecorder};
use parking_lot::Mutex;
use reqwest::{Client, StatusCode};
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn, Instrument, Span};

use crate::endpoint::log_endpoint;
use crate::error::ReportError;
use crate::sink::ReportSink;

#[derive(Debug, Clone)]
pub struct ReporterSettings {
    /// Device identity prefixed to every event message.
    pub device: String,
    pub endpoint: String,
    pub workers: usize,
    pub report_timeout: Duration,
    pub log_timeout: Duration,
}

struct Delivery {
    client: Client,
    device: String,
    report_endpoint: String,
    log_endpoint: String,
    report_timeout: Duration,
    log_timeout: Duration,
    metrics: Option<MetricsRecorder>,
}

pub struct HttpReporter {
    delivery: Arc<Delivery>,
    permits: Arc<Semaphore>,
    tasks: Mutex<JoinSet<()>>,
    runtime: Handle,
}

impl HttpReporter {
    /// Must be called from within a tokio runtime; tasks are spawned on it.
    pub fn new(
        settings: ReporterSettings,
        metrics: Option<MetricsRecorder>,
    ) -> Result<Self, ReportError> {
        let log_endpoint = log_endpoint(&settings.endpoint)?;
        let client = Client::builder().build().map_err(ReportError::Client)?;
        let runtime = Handle::try_current().map_err(|e| ReportError::Runtime(e.to_string()))?;

        debug!(
            report = %settings.endpoint,
            logs = %log_endpoint,
            workers = settings.workers,
            "reporter ready"
        );

        Ok(Self {
            delivery: Arc::new(Delivery {
                client,
                device: settings.device,
                report_endpoint: settings.endpoint,
                log_endpoint,
                report_timeout: settings.report_timeout,
                log_timeout: settings.log_timeout,
                metrics,
            }),
            permits: Arc::new(Semaphore::new(settings.workers.max(1))),
            tasks: Mutex::new(JoinSet::new()),
            runtime,
        })
    }

    pub fn log_endpoint(&self) -> &str {
        &self.delivery.log_endpoint
    }

    /// Tasks submitted and not yet reaped.
    pub fn in_flight(&self) -> usize {
        let mut tasks = self.tasks.lock();
        reap(&mut tasks);
        tasks.len()
    }

    /// Waits for every submitted task to finish.
    ///
    /// Dropping the returned future (for example on a shutdown timeout)
    /// aborts whatever is still running.
    pub async fn drain(&self) {
        let mut tasks = std::mem::take(&mut *self.tasks.lock());
        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                warn!(error = %err, "reporter task join failed");
            }
        }
    }

    fn spawn<F>(&self, work: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        let mut tasks = self.tasks.lock();
        reap(&mut tasks);
        tasks.spawn_on(
            async move {
                // Closed only if the reporter is gone; nothing left to do then.
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                work.await;
            }
            .instrument(Span::current()),
            &self.runtime,
        );
    }
}

impl ReportSink for HttpReporter {
    fn submit_report(&self, payload: ReportPayload) {
        let delivery = Arc::clone(&self.delivery);
        self.spawn(async move { delivery.deliver_report(payload).await });
    }

    fn submit_log(&self, event: LogEvent) {
        let delivery = Arc::clone(&self.delivery);
        self.spawn(async move { delivery.forward_log(&event).await });
    }
}

fn reap(tasks: &mut JoinSet<()>) {
    while let Some(joined) = tasks.try_join_next() {
        if let Err(err) = joined {
            warn!(error = %err, "reporter task join failed");
        }
    }
}

impl Delivery {
    async fn deliver_report(&self, payload: ReportPayload) {
        let event = match self.post_report(&payload).await {
            Ok(()) => {
                self.count(|m| m.reports_sent.inc());
                LogEvent::info(format!("{} - Prediction POST successful!", self.device))
            }
            Err(err) => {
                self.count(|m| m.reports_failed.inc());
                LogEvent::error(format!(
                    "{} - Error sending prediction to {}: {err}",
                    self.device, self.report_endpoint
                ))
            }
        };
        EventLogger::record(&event);
        self.forward_log(&event).await;
    }

    async fn post_report(&self, payload: &ReportPayload) -> Result<(), ReportError> {
        let response = self
            .client
            .post(&self.report_endpoint)
            .timeout(self.report_timeout)
            .json(payload)
            .send()
            .await?;
        match response.status() {
            StatusCode::OK | StatusCode::CREATED => Ok(()),
            status => Err(ReportError::Status(status.as_u16())),
        }
    }

    /// One attempt; a failure here is only logged locally.
    async fn forward_log(&self, event: &LogEvent) {
        let result = self
            .client
            .post(&self.log_endpoint)
            .timeout(self.log_timeout)
            .json(event)
            .send()
            .await
            .map_err(ReportError::from)
            .and_then(|response| {
                let status = response.status();
                if status.is_success() {
                    Ok(())
                } else {
                    Err(ReportError::Status(status.as_u16()))
                }
            });

        match result {
            Ok(()) => self.count(|m| m.logs_forwarded.inc()),
            Err(err) => {
                self.count(|m| m.logs_failed.inc());
                warn!(
                    endpoint = %self.log_endpoint,
                    level = %event.severity,
                    error = %err,
                    "failed to forward log event"
                );
            }
        }
    }

    fn count(&self, update: impl FnOnce(&MetricsRecorder)) {
        if let Some(metrics) = &self.metrics {
            update(metrics);
        }
    }
}
