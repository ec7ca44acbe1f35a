//! Pushgateway configuration parsing from environment variables.

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// When pushes happen relative to `emit`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PushMode {
    /// One full-registry push per emitted record
    #[default]
    Immediate,
    /// Records accumulate until `push_logs` drains them in a single push
    Buffered,
}

impl FromStr for PushMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "immediate" => Ok(PushMode::Immediate),
            "buffered" => Ok(PushMode::Buffered),
            _ => anyhow::bail!(
                "Invalid PUSH_MODE: {}. Must be 'immediate' or 'buffered'",
                s
            ),
        }
    }
}

/// Pushgateway environment configuration
#[derive(Debug, Clone)]
pub struct PushgatewayEnvConfig {
    pub url: String,
    pub job: String,
    pub timeout_secs: u64,
    pub mode: PushMode,
}

impl Default for PushgatewayEnvConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9091".to_string(),
            job: "job_collector".to_string(),
            timeout_secs: 30,
            mode: PushMode::Immediate,
        }
    }
}

impl PushgatewayEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let timeout_secs = env::var("PUSHGATEWAY_TIMEOUT_SECS")
            .unwrap_or_else(|_| defaults.timeout_secs.to_string())
            .parse::<u64>()
            .context("Failed to parse PUSHGATEWAY_TIMEOUT_SECS")?;

        let mode = match env::var("PUSH_MODE") {
            Ok(raw) => PushMode::from_str(&raw)?,
            Err(_) => defaults.mode,
        };

        Ok(Self {
            url: env::var("PUSHGATEWAY_URL").unwrap_or(defaults.url),
            job: env::var("PUSHGATEWAY_JOB").unwrap_or(defaults.job),
            timeout_secs,
            mode,
        })
    }
}
