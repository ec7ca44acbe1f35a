use crate::domain::errors::PushError;
use crate::domain::record::LogRecord;
use prometheus::proto::MetricFamily;

/// Transport for one full-registry snapshot.
///
/// Implementations replace every series of the `(job, grouping)` group on the
/// gateway with `families`.
pub trait MetricsPusher: Send + Sync {
    fn push(
        &self,
        job: &str,
        grouping: &[(String, String)],
        families: &[MetricFamily],
    ) -> Result<(), PushError>;
}

/// Renders a record into the text stored on the `log_message` series and the
/// `log_message` span attribute.
pub trait RecordFormatter: Send + Sync {
    fn format(&self, record: &LogRecord) -> String;
}

impl<F> RecordFormatter for F
where
    F: Fn(&LogRecord) -> String + Send + Sync,
{
    fn format(&self, record: &LogRecord) -> String {
        self(record)
    }
}

/// The message text, nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageFormatter;

impl RecordFormatter for MessageFormatter {
    fn format(&self, record: &LogRecord) -> String {
        record.message.clone()
    }
}

/// `LEVEL target: message`, or `LEVEL message` when the record has no target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelPrefixFormatter;

impl RecordFormatter for LevelPrefixFormatter {
    fn format(&self, record: &LogRecord) -> String {
        if record.target.is_empty() {
            format!("{} {}", record.level, record.message)
        } else {
            format!("{} {}: {}", record.level, record.target, record.message)
        }
    }
}
