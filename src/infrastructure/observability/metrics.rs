//! Prometheus instruments pushed for every log record.
//!
//! Each bridge owns its own registry; nothing is registered on the process-wide
//! default registry, so two bridges never see each other's series.

use crate::domain::record::LogObservation;
use prometheus::{
    Gauge, GaugeVec, IntCounter, Opts, Registry, TextEncoder, proto::MetricFamily,
};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Per-bridge registry with the three log instruments
#[derive(Clone)]
pub struct LogMetrics {
    registry: Arc<Registry>,
    snapshot_lock: Arc<Mutex<()>>,
    /// One series per log line, labeled by id, timestamp and content
    pub log_message: GaugeVec,
    /// Count of ERROR records
    pub errors_total: IntCounter,
    /// Seconds since the bridge was constructed
    pub processing_time_seconds: Gauge,
}

impl LogMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let log_message = GaugeVec::new(
            Opts::new("log_message", "Log message with content"),
            &["unique_id", "timestamp", "log_content"],
        )?;
        registry.register(Box::new(log_message.clone()))?;

        let errors_total = IntCounter::with_opts(Opts::new(
            "promhttp_metric_handler_errors_total",
            "Total number of log errors",
        ))?;
        registry.register(Box::new(errors_total.clone()))?;

        let processing_time_seconds = Gauge::with_opts(Opts::new(
            "lambda_processing_time_seconds",
            "Seconds elapsed since the log handler started",
        ))?;
        registry.register(Box::new(processing_time_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            snapshot_lock: Arc::new(Mutex::new(())),
            log_message,
            errors_total,
            processing_time_seconds,
        })
    }

    /// Set the series for `obs` to 1.
    pub fn record_message(&self, obs: &LogObservation) {
        self.log_message
            .with_label_values(&[
                obs.unique_id.as_str(),
                obs.timestamp.as_str(),
                obs.content.as_str(),
            ])
            .set(1.0);
    }

    /// Drop every `log_message` series.
    pub fn clear_messages(&self) {
        self.log_message.reset();
    }

    pub fn inc_errors(&self) {
        self.errors_total.inc();
    }

    pub fn set_processing_time(&self, seconds: f64) {
        self.processing_time_seconds.set(seconds);
    }

    /// Replace the `log_message` series with `observations`, count their
    /// errors, refresh the processing time from `started` and gather.
    ///
    /// Runs under one lock, so a snapshot only ever holds its own series even
    /// when several threads push through the same registry.
    pub fn snapshot(
        &self,
        observations: &[LogObservation],
        started: Instant,
    ) -> Vec<MetricFamily> {
        let _guard = self
            .snapshot_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        self.clear_messages();
        for obs in observations {
            self.record_message(obs);
            if obs.is_error() {
                self.inc_errors();
            }
        }
        self.set_processing_time(started.elapsed().as_secs_f64());
        self.gather()
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        encoder
            .encode_to_string(&self.gather())
            .unwrap_or_default()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
