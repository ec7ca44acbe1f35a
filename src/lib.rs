//! Logging sink that pushes a Prometheus snapshot to a Pushgateway for every
//! log record and, optionally, records a Jaeger span per record.
//!
//! ```rust,ignore
//! use log_metrics_bridge::{LogMetricsBridge, PushgatewayLayer};
//! use std::sync::Arc;
//! use tracing_subscriber::prelude::*;
//!
//! let bridge = Arc::new(LogMetricsBridge::new("localhost:9091", "job_collector")?);
//! tracing_subscriber::registry()
//!     .with(PushgatewayLayer::new(bridge.clone()))
//!     .init();
//!
//! tracing::info!("hello");
//! bridge.shutdown();
//! ```

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{BridgeConfig, PushMode};
pub use domain::errors::{BridgeError, PushError, TracingError};
pub use domain::ports::{LevelPrefixFormatter, MessageFormatter, MetricsPusher, RecordFormatter};
pub use domain::record::{LogObservation, LogRecord};
pub use infrastructure::PushgatewayClient;
pub use infrastructure::observability::{
    LogMetrics, LogMetricsBridge, LogMetricsBridgeBuilder, PushgatewayLayer, TracingSession,
};

#[cfg(test)]
mod config_tests;
