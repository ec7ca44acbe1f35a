//! Jaeger tracing configuration parsing from environment variables.

use anyhow::{Context, Result};
use std::env;

/// Default UDP port of the Jaeger agent (compact thrift)
pub const DEFAULT_AGENT_PORT: u16 = 6831;

/// Jaeger agent environment configuration
#[derive(Debug, Clone)]
pub struct TracingEnvConfig {
    pub enabled: bool,
    pub agent_host: String,
    pub agent_port: u16,
}

impl Default for TracingEnvConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            agent_host: "localhost".to_string(),
            agent_port: DEFAULT_AGENT_PORT,
        }
    }
}

impl TracingEnvConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            enabled: env::var("JAEGER_ENABLED")
                .unwrap_or_else(|_| "false".to_string())
                .parse::<bool>()
                .context("Failed to parse JAEGER_ENABLED (expected true or false)")?,
            agent_host: env::var("JAEGER_AGENT_HOST").unwrap_or_else(|_| "localhost".to_string()),
            agent_port: env::var("JAEGER_AGENT_PORT")
                .unwrap_or_else(|_| DEFAULT_AGENT_PORT.to_string())
                .parse::<u16>()
                .context("Failed to parse JAEGER_AGENT_PORT")?,
        })
    }
}
