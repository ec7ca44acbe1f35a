//! Root tracing session spanning a bridge's whole lifetime.

use crate::domain::errors::TracingError;
use opentelemetry::trace::{Span as _, TraceContextExt, Tracer as _, TracerProvider as _};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::trace::{Span, Tracer, TracerProvider};
use tracing::{debug, info};

pub const ROOT_SPAN_NAME: &str = "log_session";
pub const ENTRY_SPAN_NAME: &str = "log_entry_handler";

/// Tracer, provider and the `log_session` root context.
///
/// The provider is private to the session; it is never installed as the global
/// tracer provider.
pub struct TracingSession {
    service_name: String,
    provider: TracerProvider,
    tracer: Tracer,
    root: Context,
}

impl TracingSession {
    /// Open the root span on a tracer named after `service_name`.
    pub fn start(provider: TracerProvider, service_name: &str) -> Self {
        let tracer = provider.tracer(service_name.to_string());
        let root_span = tracer.start(ROOT_SPAN_NAME);
        let root = Context::new().with_span(root_span);

        Self {
            service_name: service_name.to_string(),
            provider,
            tracer,
            root,
        }
    }

    /// Session exporting to a Jaeger agent at `host:port`.
    pub fn jaeger(host: &str, port: u16, service_name: &str) -> Result<Self, TracingError> {
        info!(
            "Initializing Jaeger exporter with host: {}, port: {}",
            host, port
        );
        let provider = super::jaeger::agent_provider(host, port, service_name)?;
        info!("Jaeger exporter initialized");
        Ok(Self::start(provider, service_name))
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Child span under the root context. The span ends when dropped.
    pub fn child(&self, name: &'static str, attributes: Vec<KeyValue>) -> Span {
        let mut span = self.tracer.start_with_context(name, &self.root);
        span.set_attributes(attributes);
        span
    }

    /// End the root span and flush the provider. Consumes the session, so the
    /// root span can only be ended once.
    pub fn end(self) {
        self.root.span().end();

        for result in self.provider.force_flush() {
            if let Err(e) = result {
                debug!("Tracer provider flush failed: {}", e);
            }
        }
        // Dropping the last provider handle shuts its span processors down.
        drop(self.tracer);
        drop(self.provider);
    }
}
