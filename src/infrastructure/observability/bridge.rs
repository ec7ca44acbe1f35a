//! Log-record to Pushgateway bridge.
//!
//! Every emitted record becomes one `log_message` series, bumps the error
//! counter when it is an ERROR, refreshes the processing-time gauge, and is
//! pushed to the gateway together with the rest of the registry. With tracing
//! enabled, each record also gets a `log_entry_handler` span under the
//! bridge-wide `log_session` root span.
//!
//! `emit` blocks on the HTTP push. Callers that need buffered spans flushed
//! must call [`LogMetricsBridge::shutdown`]; the `Drop` hook is a fallback only.
//!
//! Shutdown stops new records, not records already past the shutdown check:
//! an immediate-mode `emit` in flight when another thread shuts down may still
//! push its line. Buffered records are never stranded; they are accepted under
//! the buffer lock only while the bridge is running, and shutdown drains that
//! buffer under the same lock.

use crate::config::{BridgeConfig, PushMode};
use crate::domain::errors::{BridgeError, PushError};
use crate::domain::ports::{MessageFormatter, MetricsPusher, RecordFormatter};
use crate::domain::record::{LogObservation, LogRecord};
use crate::infrastructure::observability::metrics::LogMetrics;
use crate::infrastructure::observability::session::{ENTRY_SPAN_NAME, TracingSession};
use crate::infrastructure::pushgateway::PushgatewayClient;
use opentelemetry::KeyValue;
use opentelemetry_sdk::trace::{Span, TracerProvider};
use prometheus::proto::MetricFamily;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use tracing::{debug, warn};

pub struct LogMetricsBridge {
    job: String,
    grouping: Vec<(String, String)>,
    mode: PushMode,
    metrics: LogMetrics,
    pusher: Box<dyn MetricsPusher>,
    formatter: Box<dyn RecordFormatter>,
    session: Mutex<Option<TracingSession>>,
    tracing: bool,
    buffer: Mutex<Vec<LogObservation>>,
    start_time: Instant,
    shut_down: AtomicBool,
}

impl LogMetricsBridge {
    /// Bridge for `job` pushing to the gateway at `gateway_url`, tracing off.
    pub fn new(gateway_url: &str, job: &str) -> Result<Self, BridgeError> {
        Self::from_config(&BridgeConfig::new(gateway_url, job))
    }

    /// Bridge wired to the HTTP Pushgateway client and, when configured, a
    /// Jaeger agent. A tracing setup failure yields no bridge at all.
    pub fn from_config(config: &BridgeConfig) -> Result<Self, BridgeError> {
        let pusher = PushgatewayClient::with_timeout(&config.gateway_url, config.push_timeout)?;

        let mut builder = Self::builder(&config.job, pusher).mode(config.push_mode);
        for (name, value) in &config.grouping {
            builder = builder.grouping_key(name, value);
        }
        if let Some(host) = &config.jaeger_agent_host {
            let session = TracingSession::jaeger(host, config.jaeger_agent_port, &config.job)?;
            builder = builder.session(session);
        }

        builder.build()
    }

    pub fn builder(job: &str, pusher: impl MetricsPusher + 'static) -> LogMetricsBridgeBuilder {
        LogMetricsBridgeBuilder {
            job: job.to_string(),
            grouping: Vec::new(),
            mode: PushMode::Immediate,
            pusher: Box::new(pusher),
            formatter: Box::new(MessageFormatter),
            session: None,
        }
    }

    /// Observe one record.
    ///
    /// In immediate mode the whole registry is pushed before returning and a
    /// push failure is returned as-is. In buffered mode the observation is
    /// queued for [`push_logs`](Self::push_logs). A no-op after shutdown.
    pub fn emit(&self, record: &LogRecord) -> Result<(), BridgeError> {
        if self.is_shut_down() {
            return Ok(());
        }

        let content = self.formatter.format(record);
        let obs = LogObservation::capture(content, record.level);

        // Held until the end of this call so the span also closes when the push fails.
        let _span = self.entry_span(&obs);

        match self.mode {
            PushMode::Immediate => {
                let families = self
                    .metrics
                    .snapshot(std::slice::from_ref(&obs), self.start_time);
                self.push(&families)?;
            }
            PushMode::Buffered => {
                let mut buffer = self.lock_buffer();
                // Shutdown may have drained the buffer since the check above.
                if !self.is_shut_down() {
                    buffer.push(obs);
                }
            }
        }

        Ok(())
    }

    /// Drain the buffer and push every buffered observation in one request.
    ///
    /// Returns how many observations went out. An empty buffer pushes nothing.
    /// A no-op after shutdown.
    pub fn push_logs(&self) -> Result<usize, BridgeError> {
        if self.is_shut_down() {
            return Ok(0);
        }
        self.flush_buffer()
    }

    /// End the tracing session and stop accepting records. Idempotent.
    ///
    /// Observations still buffered are pushed first; a failure there is
    /// logged, not returned.
    pub fn shutdown(&self) {
        if self
            .shut_down
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        if let Err(e) = self.flush_buffer() {
            warn!("Final push of buffered log records failed: {}", e);
        }

        let session = self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(session) = session {
            session.end();
        }
        debug!("Log metrics bridge for job {} shut down", self.job);
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    pub fn job(&self) -> &str {
        &self.job
    }

    pub fn mode(&self) -> PushMode {
        self.mode
    }

    /// Whether the bridge was built with a tracing session. Unchanged by
    /// shutdown.
    pub fn tracing_enabled(&self) -> bool {
        self.tracing
    }

    pub fn buffered_len(&self) -> usize {
        self.lock_buffer().len()
    }

    pub fn metrics(&self) -> &LogMetrics {
        &self.metrics
    }

    /// Current registry in Prometheus text format.
    pub fn render(&self) -> String {
        self.metrics.render()
    }

    fn flush_buffer(&self) -> Result<usize, BridgeError> {
        let drained: Vec<LogObservation> = std::mem::take(&mut *self.lock_buffer());
        if drained.is_empty() {
            return Ok(0);
        }

        let families = self.metrics.snapshot(&drained, self.start_time);
        self.push(&families)?;

        Ok(drained.len())
    }

    fn push(&self, families: &[MetricFamily]) -> Result<(), PushError> {
        self.pusher.push(&self.job, &self.grouping, families)
    }

    fn entry_span(&self, obs: &LogObservation) -> Option<Span> {
        let session = self.session.lock().ok()?;
        session.as_ref().map(|s| {
            s.child(
                ENTRY_SPAN_NAME,
                vec![
                    KeyValue::new("log_message", obs.content.clone()),
                    KeyValue::new("timestamp", obs.timestamp.clone()),
                    KeyValue::new("unique_id", obs.unique_id.clone()),
                ],
            )
        })
    }

    fn lock_buffer(&self) -> MutexGuard<'_, Vec<LogObservation>> {
        self.buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for LogMetricsBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub struct LogMetricsBridgeBuilder {
    job: String,
    grouping: Vec<(String, String)>,
    mode: PushMode,
    pusher: Box<dyn MetricsPusher>,
    formatter: Box<dyn RecordFormatter>,
    session: Option<TracingSession>,
}

impl LogMetricsBridgeBuilder {
    pub fn mode(mut self, mode: PushMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn grouping_key(mut self, name: &str, value: &str) -> Self {
        self.grouping.push((name.to_string(), value.to_string()));
        self
    }

    pub fn formatter(mut self, formatter: impl RecordFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    /// Trace through an existing provider (opens the `log_session` root span),
    /// with the job as service name.
    pub fn tracer_provider(self, provider: TracerProvider) -> Self {
        let session = TracingSession::start(provider, &self.job);
        self.session(session)
    }

    /// Trace to a Jaeger agent at `host:port`, using the job as service name.
    pub fn jaeger_agent(self, host: &str, port: u16) -> Result<Self, BridgeError> {
        let session = TracingSession::jaeger(host, port, &self.job)?;
        Ok(self.session(session))
    }

    fn session(mut self, session: TracingSession) -> Self {
        if let Some(previous) = self.session.replace(session) {
            previous.end();
        }
        self
    }

    pub fn build(self) -> Result<LogMetricsBridge, BridgeError> {
        Ok(LogMetricsBridge {
            job: self.job,
            grouping: self.grouping,
            mode: self.mode,
            metrics: LogMetrics::new()?,
            pusher: self.pusher,
            formatter: self.formatter,
            tracing: self.session.is_some(),
            session: Mutex::new(self.session),
            buffer: Mutex::new(Vec::new()),
            start_time: Instant::now(),
            shut_down: AtomicBool::new(false),
        })
    }
}
