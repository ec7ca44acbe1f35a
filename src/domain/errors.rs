use thiserror::Error;

/// Errors raised while transmitting a registry snapshot to the Pushgateway
#[derive(Debug, Error)]
pub enum PushError {
    #[error("Invalid Pushgateway address {address}: {reason}")]
    InvalidUrl { address: String, reason: String },

    #[error("Failed to encode metrics: {0}")]
    Encode(#[from] prometheus::Error),

    #[error("Pushgateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Pushgateway returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Push rejected: {reason}")]
    Rejected { reason: String },

    #[error("Pushgateway push thread unavailable: {reason}")]
    Worker { reason: String },
}

/// Errors raised while setting up the tracing backend
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("Failed to initialize Jaeger exporter for {endpoint}: {source}")]
    Init {
        endpoint: String,
        #[source]
        source: opentelemetry::trace::TraceError,
    },
}

/// Errors surfaced by the bridge itself
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Push(#[from] PushError),

    #[error(transparent)]
    Tracing(#[from] TracingError),

    #[error("Failed to register metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}
