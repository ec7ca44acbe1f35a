use crate::domain::errors::TracingError;
use opentelemetry::KeyValue;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::{Config, TracerProvider};

/// Tracer provider exporting to a Jaeger agent over UDP, one span at a time.
pub fn agent_provider(
    host: &str,
    port: u16,
    service_name: &str,
) -> Result<TracerProvider, TracingError> {
    let endpoint = format!("{}:{}", host, port);

    opentelemetry_jaeger::new_agent_pipeline()
        .with_endpoint(endpoint.as_str())
        .with_service_name(service_name)
        .with_trace_config(Config::default().with_resource(Resource::new(vec![
            KeyValue::new("service.name", service_name.to_string()),
        ])))
        .build_simple()
        .map_err(|source| TracingError::Init { endpoint, source })
}

