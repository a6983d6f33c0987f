//! ## flowguard-telemetry::metrics
//! **Prometheus counters for the capture/classify/report cycle**
//!
//! Kept in a private registry and rendered as text at shutdown. There is no
//! exporter endpoint.

use std::time::Duration;

use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub cycles: IntCounter,
    pub cycle_failures: IntCounterVec,
    pub empty_windows: IntCounter,
    pub degraded_metrics: IntCounter,
    pub window_packets: Histogram,
    pub classification_latency: Histogram,
    pub reports_sent: IntCounter,
    pub reports_failed: IntCounter,
    pub logs_forwarded: IntCounter,
    pub logs_failed: IntCounter,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let cycles = IntCounter::new("flowguard_cycles_total", "Capture cycles started")?;
        let cycle_failures = IntCounterVec::new(
            Opts::new("flowguard_cycle_failures_total", "Cycles aborted, by stage"),
            &["stage"],
        )?;
        let empty_windows = IntCounter::new(
            "flowguard_empty_windows_total",
            "Capture windows with no device traffic",
        )?;
        let degraded_metrics = IntCounter::new(
            "flowguard_degraded_metrics_total",
            "Reported cycles whose flow metrics fell back to zeros",
        )?;
        let window_packets = Histogram::with_opts(
            HistogramOpts::new(
                "flowguard_window_packets",
                "Filtered packets per capture window",
            )
            .buckets(vec![1.0, 10.0, 100.0, 1_000.0, 10_000.0, 100_000.0]),
        )?;
        let classification_latency = Histogram::with_opts(
            HistogramOpts::new(
                "flowguard_classification_latency_seconds",
                "Feature extraction plus classification time",
            )
            .buckets(vec![0.000_1, 0.001, 0.01, 0.1, 1.0]),
        )?;
        let reports_sent =
            IntCounter::new("flowguard_reports_sent_total", "Reports accepted by the collector")?;
        let reports_failed =
            IntCounter::new("flowguard_reports_failed_total", "Reports the collector did not accept")?;
        let logs_forwarded =
            IntCounter::new("flowguard_logs_forwarded_total", "Log events forwarded")?;
        let logs_failed =
            IntCounter::new("flowguard_logs_failed_total", "Log events that failed to forward")?;

        registry.register(Box::new(cycles.clone()))?;
        registry.register(Box::new(cycle_failures.clone()))?;
        registry.register(Box::new(empty_windows.clone()))?;
        registry.register(Box::new(degraded_metrics.clone()))?;
        registry.register(Box::new(window_packets.clone()))?;
        registry.register(Box::new(classification_latency.clone()))?;
        registry.register(Box::new(reports_sent.clone()))?;
        registry.register(Box::new(reports_failed.clone()))?;
        registry.register(Box::new(logs_forwarded.clone()))?;
        registry.register(Box::new(logs_failed.clone()))?;

        Ok(Self {
            registry,
            cycles,
            cycle_failures,
            empty_windows,
            degraded_metrics,
            window_packets,
            classification_latency,
            reports_sent,
            reports_failed,
            logs_forwarded,
            logs_failed,
        })
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }

    pub fn inc_cycles(&self) {
        self.cycles.inc();
    }

    pub fn record_failure(&self, stage: &str) {
        self.cycle_failures.with_label_values(&[stage]).inc();
    }

    pub fn inc_empty_windows(&self) {
        self.empty_windows.inc();
    }

    pub fn inc_degraded_metrics(&self) {
        self.degraded_metrics.inc();
    }

    pub fn observe_window(&self, packets: usize) {
        self.window_packets.observe(packets as f64);
    }

    pub fn observe_classification(&self, elapsed: Duration) {
        self.classification_latency.observe(elapsed.as_secs_f64());
    }
}
