pub mod mock;
pub mod observability;
pub mod pushgateway;

pub use pushgateway::PushgatewayClient;
