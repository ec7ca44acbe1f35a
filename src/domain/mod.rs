// Domain-specific error types
pub mod errors;

// Port interfaces (transport, formatting)
pub mod ports;

// Log records and the observations derived from them
pub mod record;
