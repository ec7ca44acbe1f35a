use crate::domain::errors::PushError;
use crate::domain::ports::MetricsPusher;
use prometheus::{TextEncoder, proto::MetricFamily};
use std::sync::{Arc, Mutex};

/// One push as seen by [`RecordingPusher`]
#[derive(Debug, Clone)]
pub struct RecordedPush {
    pub job: String,
    pub grouping: Vec<(String, String)>,
    /// Snapshot in Prometheus text format
    pub body: String,
}

impl RecordedPush {
    /// Value of an unlabeled sample, e.g. `lambda_processing_time_seconds`.
    pub fn value(&self, metric: &str) -> Option<f64> {
        self.body.lines().find_map(|line| {
            line.strip_prefix(metric)
                .and_then(|rest| rest.strip_prefix(' '))
                .and_then(|v| v.trim().parse().ok())
        })
    }

    /// Number of `log_message` series in the snapshot.
    pub fn message_series(&self) -> usize {
        self.body
            .lines()
            .filter(|line| line.starts_with("log_message{"))
            .count()
    }

    /// `unique_id` label values of the `log_message` series.
    pub fn unique_ids(&self) -> Vec<String> {
        self.label_values("unique_id")
    }

    pub fn label_values(&self, label: &str) -> Vec<String> {
        let needle = format!("{}=\"", label);
        self.body
            .lines()
            .filter(|line| line.starts_with("log_message{"))
            .filter_map(|line| {
                let start = line.find(&needle)? + needle.len();
                let end = line[start..].find('"')?;
                Some(line[start..start + end].to_string())
            })
            .collect()
    }
}

/// In-memory [`MetricsPusher`] that records every push.
///
/// Clones share the same record, so tests keep one handle and give the other
/// to the bridge.
#[derive(Clone, Default)]
pub struct RecordingPusher {
    pushes: Arc<Mutex<Vec<RecordedPush>>>,
    fail: bool,
}

impl RecordingPusher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every push, then rejects it.
    pub fn failing() -> Self {
        Self {
            pushes: Arc::default(),
            fail: true,
        }
    }

    pub fn pushes(&self) -> Vec<RecordedPush> {
        self.pushes.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn push_count(&self) -> usize {
        self.pushes.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn last_push(&self) -> Option<RecordedPush> {
        self.pushes.lock().ok().and_then(|p| p.last().cloned())
    }
}

impl MetricsPusher for RecordingPusher {
    fn push(
        &self,
        job: &str,
        grouping: &[(String, String)],
        families: &[MetricFamily],
    ) -> Result<(), PushError> {
        let body = TextEncoder::new().encode_to_string(families)?;
        if let Ok(mut pushes) = self.pushes.lock() {
            pushes.push(RecordedPush {
                job: job.to_string(),
                grouping: grouping.to_vec(),
                body,
            });
        }

        if self.fail {
            return Err(PushError::Rejected {
                reason: "recording pusher set to fail".to_string(),
            });
        }
        Ok(())
    }
}
