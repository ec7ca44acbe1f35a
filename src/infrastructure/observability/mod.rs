//! Push-based log observability
//!
//! Log records are turned into metrics and spans and sent **outbound only**:
//!
//! 1. **Prometheus Pushgateway**: the full per-bridge registry, pushed per record
//!    (or per [`LogMetricsBridge::push_logs`] call in buffered mode)
//! 2. **Jaeger** (optional): one `log_entry_handler` span per record under a
//!    `log_session` root span
//!
//! Nothing here listens for requests.

pub mod bridge;
pub mod jaeger;
pub mod layer;
pub mod metrics;
pub mod session;

pub use bridge::{LogMetricsBridge, LogMetricsBridgeBuilder};
pub use layer::PushgatewayLayer;
pub use metrics::LogMetrics;
pub use session::TracingSession;
