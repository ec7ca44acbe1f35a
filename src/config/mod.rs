//! Configuration module for the log metrics bridge.
//!
//! Configuration is loaded from environment variables, organized by concern:
//! Pushgateway transport and Jaeger tracing.

mod pushgateway_config;
mod tracing_config;

pub use pushgateway_config::{PushMode, PushgatewayEnvConfig};
pub use tracing_config::{DEFAULT_AGENT_PORT, TracingEnvConfig};

use anyhow::{Context, Result};
use std::time::Duration;

/// Bridge configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    // Pushgateway
    pub gateway_url: String,
    pub job: String,
    pub push_timeout: Duration,
    pub push_mode: PushMode,
    pub grouping: Vec<(String, String)>,

    // Tracing
    pub jaeger_agent_host: Option<String>,
    pub jaeger_agent_port: u16,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new(PushgatewayEnvConfig::default().url, "job_collector")
    }
}

impl BridgeConfig {
    /// Configuration pushing to `gateway_url` under `job`, tracing disabled.
    pub fn new(gateway_url: impl Into<String>, job: impl Into<String>) -> Self {
        Self {
            gateway_url: gateway_url.into(),
            job: job.into(),
            push_timeout: Duration::from_secs(30),
            push_mode: PushMode::Immediate,
            grouping: Vec::new(),
            jaeger_agent_host: None,
            jaeger_agent_port: DEFAULT_AGENT_PORT,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let push = PushgatewayEnvConfig::from_env().context("Failed to load Pushgateway config")?;
        let tracing = TracingEnvConfig::from_env().context("Failed to load tracing config")?;

        Ok(Self {
            gateway_url: push.url,
            job: push.job,
            push_timeout: Duration::from_secs(push.timeout_secs),
            push_mode: push.mode,
            grouping: Vec::new(),
            jaeger_agent_host: tracing.enabled.then_some(tracing.agent_host),
            jaeger_agent_port: tracing.agent_port,
        })
    }

    pub fn with_jaeger_agent(mut self, host: impl Into<String>, port: u16) -> Self {
        self.jaeger_agent_host = Some(host.into());
        self.jaeger_agent_port = port;
        self
    }

    pub fn with_push_mode(mut self, mode: PushMode) -> Self {
        self.push_mode = mode;
        self
    }

    /// Extra grouping-key label appended to the push URL after the job.
    pub fn with_grouping_key(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.grouping.push((name.into(), value.into()));
        self
    }

    pub fn tracing_enabled(&self) -> bool {
        self.jaeger_agent_host.is_some()
    }
}
