use chrono::{SecondsFormat, Utc};
use tracing::Level;
use uuid::Uuid;

/// A log record as handed to the bridge by the logging framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl LogRecord {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            target: String::new(),
            message: message.into(),
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::ERROR
    }
}

/// Facts derived from one emitted record.
///
/// Every observation carries a fresh v4 UUID, so two observations of the same
/// text still land on distinct `log_message` series.
#[derive(Debug, Clone, PartialEq)]
pub struct LogObservation {
    pub unique_id: String,
    /// UTC capture time, RFC 3339 with microseconds.
    pub timestamp: String,
    pub content: String,
    pub level: Level,
}

impl LogObservation {
    /// Capture an observation of already-rendered text now.
    pub fn capture(content: String, level: Level) -> Self {
        Self {
            unique_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            content,
            level,
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::ERROR
    }
}
