use log_metrics_bridge::infrastructure::mock::RecordingPusher;
use log_metrics_bridge::{LogMetricsBridge, LogRecord};
use opentelemetry_sdk::export::trace::SpanData;
use opentelemetry_sdk::testing::trace::InMemorySpanExporter;
use opentelemetry_sdk::trace::TracerProvider;
use tracing::Level;

struct Harness {
    bridge: LogMetricsBridge,
    pusher: RecordingPusher,
    exporter: InMemorySpanExporter,
    // Keeps the span processor alive after the bridge drops its handle.
    _provider: TracerProvider,
}

fn traced_bridge() -> Harness {
    let exporter = InMemorySpanExporter::default();
    let provider = TracerProvider::builder()
        .with_simple_exporter(exporter.clone())
        .build();
    let pusher = RecordingPusher::new();
    let bridge = LogMetricsBridge::builder("job_collector", pusher.clone())
        .tracer_provider(provider.clone())
        .build()
        .expect("bridge");

    Harness {
        bridge,
        pusher,
        exporter,
        _provider: provider,
    }
}

fn span_count(exporter: &InMemorySpanExporter, name: &str) -> usize {
    exporter
        .get_finished_spans()
        .unwrap()
        .iter()
        .filter(|s| s.name == name)
        .count()
}

fn attribute(span: &SpanData, key: &str) -> Option<String> {
    span.attributes
        .iter()
        .find(|kv| kv.key.as_str() == key)
        .map(|kv| kv.value.to_string())
}

#[test]
fn test_emit_after_shutdown_is_noop() {
    let h = traced_bridge();

    h.bridge.shutdown();
    h.bridge.emit(&LogRecord::new(Level::ERROR, "too late")).unwrap();

    assert_eq!(h.pusher.push_count(), 0);
    assert_eq!(span_count(&h.exporter, "log_entry_handler"), 0);
    assert_eq!(h.bridge.metrics().errors_total.get(), 0);
}

#[test]
fn test_double_shutdown_ends_root_once() {
    let h = traced_bridge();

    h.bridge.shutdown();
    h.bridge.shutdown();
    drop(h.bridge);

    assert_eq!(span_count(&h.exporter, "log_session"), 1);
}

#[test]
fn test_drop_shuts_down() {
    let h = traced_bridge();

    h.bridge.emit(&LogRecord::new(Level::INFO, "hello")).unwrap();
    assert_eq!(span_count(&h.exporter, "log_session"), 0);

    drop(h.bridge);

    assert_eq!(span_count(&h.exporter, "log_session"), 1);
}

#[test]
fn test_entry_spans_under_root_with_attributes() {
    let h = traced_bridge();

    h.bridge.emit(&LogRecord::new(Level::INFO, "hello")).unwrap();
    h.bridge.shutdown();

    let spans = h.exporter.get_finished_spans().unwrap();
    let root = spans.iter().find(|s| s.name == "log_session").unwrap();
    let entry = spans.iter().find(|s| s.name == "log_entry_handler").unwrap();
    assert_eq!(entry.parent_span_id, root.span_context.span_id());

    let push = h.pusher.last_push().unwrap();
    let id = push.unique_ids()[0].clone();
    let stamp = push.label_values("timestamp")[0].clone();
    assert_eq!(attribute(entry, "log_message").as_deref(), Some("hello"));
    assert_eq!(attribute(entry, "unique_id"), Some(id));
    assert_eq!(attribute(entry, "timestamp"), Some(stamp));
}

#[test]
fn test_span_closed_when_push_fails() {
    let exporter = InMemorySpanExporter::default();
    let provider = TracerProvider::builder()
        .with_simple_exporter(exporter.clone())
        .build();
    let bridge = LogMetricsBridge::builder("job", RecordingPusher::failing())
        .tracer_provider(provider.clone())
        .build()
        .unwrap();

    assert!(bridge.emit(&LogRecord::new(Level::INFO, "unsent")).is_err());

    assert_eq!(span_count(&exporter, "log_entry_handler"), 1);
}

#[test]
fn test_shutdown_without_tracing() {
    let pusher = RecordingPusher::new();
    let bridge = LogMetricsBridge::builder("job", pusher.clone()).build().unwrap();
    assert!(!bridge.tracing_enabled());

    bridge.emit(&LogRecord::new(Level::INFO, "before")).unwrap();
    bridge.shutdown();
    bridge.emit(&LogRecord::new(Level::INFO, "after")).unwrap();

    assert_eq!(pusher.push_count(), 1);
    assert!(bridge.is_shut_down());
    assert!(!bridge.tracing_enabled());
}

#[test]
fn test_tracing_enabled_survives_shutdown() {
    let h = traced_bridge();
    assert!(h.bridge.tracing_enabled());

    h.bridge.shutdown();

    assert!(h.bridge.tracing_enabled());
    assert_eq!(span_count(&h.exporter, "log_session"), 1);
}

#[test]
fn test_injected_provider_traces_under_job_name() {
    let h = traced_bridge();

    h.bridge.emit(&LogRecord::new(Level::INFO, "hello")).unwrap();
    h.bridge.shutdown();

    let spans = h.exporter.get_finished_spans().unwrap();
    assert_eq!(spans.len(), 2);
    assert!(spans
        .iter()
        .all(|s| s.instrumentation_lib.name == "job_collector"));
}

#[test]
fn test_concurrent_shutdown_ends_root_once() {
    let h = traced_bridge();
    let bridge = std::sync::Arc::new(h.bridge);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let bridge = bridge.clone();
            std::thread::spawn(move || bridge.shutdown())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(span_count(&h.exporter, "log_session"), 1);
}
