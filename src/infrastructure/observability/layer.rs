//! `tracing-subscriber` layer feeding events into a [`LogMetricsBridge`].

use crate::domain::record::LogRecord;
use crate::infrastructure::observability::bridge::LogMetricsBridge;
use std::cell::Cell;
use std::fmt;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Targets whose events never reach the bridge: the HTTP stack used for the
/// push logs from its own worker thread, and the exporters log on flush.
const IGNORED_TARGETS: &[&str] = &[
    "log_metrics_bridge",
    "reqwest",
    "hyper",
    "hyper_util",
    "h2",
    "rustls",
    "opentelemetry",
    "opentelemetry_sdk",
    "opentelemetry_jaeger",
];

thread_local! {
    static IN_EMIT: Cell<bool> = const { Cell::new(false) };
}

/// Forwards every event it sees to the bridge as a [`LogRecord`].
///
/// Level filtering is left to the subscriber stack (`EnvFilter`,
/// `Layer::with_filter`). A failed push is reported on stderr and the record
/// is dropped; the caller of the log macro never sees the error.
pub struct PushgatewayLayer {
    bridge: Arc<LogMetricsBridge>,
}

impl PushgatewayLayer {
    pub fn new(bridge: Arc<LogMetricsBridge>) -> Self {
        Self { bridge }
    }

    pub fn bridge(&self) -> &Arc<LogMetricsBridge> {
        &self.bridge
    }

    /// Shut the bridge down. Later events are ignored.
    pub fn close(&self) {
        self.bridge.shutdown();
    }

    fn ignored(target: &str) -> bool {
        IGNORED_TARGETS.iter().any(|prefix| {
            target == *prefix
                || target
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with("::"))
        })
    }
}

impl<S> Layer<S> for PushgatewayLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if Self::ignored(metadata.target()) || self.bridge.is_shut_down() {
            return;
        }
        if IN_EMIT.with(|flag| flag.replace(true)) {
            return;
        }

        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);
        let record = LogRecord::new(*metadata.level(), visitor.finish())
            .with_target(metadata.target());

        let result = self.bridge.emit(&record);
        IN_EMIT.with(|flag| flag.set(false));

        if let Err(e) = result {
            eprintln!(
                "log-metrics-bridge: dropped {} record from {}: {}",
                record.level, record.target, e
            );
        }
    }
}

/// Collects the `message` field, then appends other fields as `key=value`.
#[derive(Default)]
struct RecordVisitor {
    message: String,
    fields: Vec<String>,
}

impl RecordVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            return self.message;
        }
        let fields = self.fields.join(" ");
        if self.message.is_empty() {
            fields
        } else {
            format!("{} {}", self.message, fields)
        }
    }
}

impl Visit for RecordVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignored_targets() {
        assert!(PushgatewayLayer::ignored("hyper"));
        assert!(PushgatewayLayer::ignored("hyper::client::pool"));
        assert!(PushgatewayLayer::ignored("log_metrics_bridge::infrastructure"));
        assert!(!PushgatewayLayer::ignored("hyperion"));
        assert!(!PushgatewayLayer::ignored("my_app::handler"));
    }

    #[test]
    fn test_visitor_message_and_fields() {
        let visitor = RecordVisitor {
            message: "request done".to_string(),
            fields: vec!["status=200".to_string(), "path=\"/x\"".to_string()],
        };
        assert_eq!(visitor.finish(), "request done status=200 path=\"/x\"");
    }

    #[test]
    fn test_visitor_fields_only() {
        let visitor = RecordVisitor {
            message: String::new(),
            fields: vec!["count=3".to_string()],
        };
        assert_eq!(visitor.finish(), "count=3");
    }
}
