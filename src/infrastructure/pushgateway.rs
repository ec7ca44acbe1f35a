//! Blocking Pushgateway client.
//!
//! Pushes use PUT, which replaces every series of the `job` (and grouping key)
//! group on the gateway with the pushed snapshot.
//!
//! The `reqwest` blocking client lives on its own thread: it is built, used and
//! dropped there, never on the caller's thread. A log call made from inside an
//! async runtime therefore waits on a channel instead of running (or dropping)
//! the blocking client's internal runtime in an async context. Requests from
//! all callers are sent one at a time, in arrival order.

use crate::domain::errors::PushError;
use crate::domain::ports::MetricsPusher;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use crossbeam_channel::{Receiver, Sender};
use prometheus::{Encoder, TextEncoder, proto::MetricFamily};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;
use url::Url;

struct PushRequest {
    url: Url,
    content_type: String,
    body: Vec<u8>,
    reply: Sender<Result<(), PushError>>,
}

pub struct PushgatewayClient {
    base: Url,
    requests: Sender<PushRequest>,
}

impl PushgatewayClient {
    /// Client for `address` (`host:port` or a full URL) with the default
    /// 30s request timeout.
    pub fn new(address: &str) -> Result<Self, PushError> {
        Self::with_timeout(address, Duration::from_secs(30))
    }

    pub fn with_timeout(address: &str, timeout: Duration) -> Result<Self, PushError> {
        let base = parse_gateway(address)?;

        let (requests, inbox) = crossbeam_channel::unbounded();
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);
        std::thread::Builder::new()
            .name("pushgateway-push".to_string())
            .spawn(move || run_push_thread(inbox, ready_tx, timeout))
            .map_err(|e| PushError::Worker {
                reason: e.to_string(),
            })?;
        ready_rx.recv().map_err(|_| push_thread_gone())??;

        Ok(Self { base, requests })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `{base}/metrics/job/{job}[/{label}/{value}...]`
    pub fn push_url(&self, job: &str, grouping: &[(String, String)]) -> Result<Url, PushError> {
        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| PushError::InvalidUrl {
                address: self.base.to_string(),
                reason: "cannot be a base URL".to_string(),
            })?;
            segments.pop_if_empty().push("metrics");
            push_label(&mut segments, "job", job);
            for (name, value) in grouping {
                push_label(&mut segments, name, value);
            }
        }
        Ok(url)
    }
}

impl MetricsPusher for PushgatewayClient {
    fn push(
        &self,
        job: &str,
        grouping: &[(String, String)],
        families: &[MetricFamily],
    ) -> Result<(), PushError> {
        let encoder = TextEncoder::new();
        let mut body = Vec::new();
        encoder.encode(families, &mut body)?;

        let (reply, response) = crossbeam_channel::bounded(1);
        self.requests
            .send(PushRequest {
                url: self.push_url(job, grouping)?,
                content_type: encoder.format_type().to_string(),
                body,
                reply,
            })
            .map_err(|_| push_thread_gone())?;

        response.recv().map_err(|_| push_thread_gone())?
    }
}

/// Owns the blocking client until every `PushgatewayClient` handle is gone.
fn run_push_thread(
    inbox: Receiver<PushRequest>,
    ready: Sender<Result<(), reqwest::Error>>,
    timeout: Duration,
) {
    let client = match Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    if ready.send(Ok(())).is_err() {
        return;
    }

    for request in inbox {
        let result = send(&client, request.url, request.content_type, request.body);
        // The caller may have given up waiting; nothing left to report to.
        let _ = request.reply.send(result);
    }
    debug!("Pushgateway push thread stopped");
}

fn send(client: &Client, url: Url, content_type: String, body: Vec<u8>) -> Result<(), PushError> {
    let response = client
        .put(url)
        .header(CONTENT_TYPE, content_type)
        .body(body)
        .send()?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(PushError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(())
}

fn push_thread_gone() -> PushError {
    PushError::Worker {
        reason: "push thread exited".to_string(),
    }
}

fn parse_gateway(address: &str) -> Result<Url, PushError> {
    let with_scheme = if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    };

    let url = Url::parse(&with_scheme).map_err(|e| PushError::InvalidUrl {
        address: address.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(PushError::InvalidUrl {
            address: address.to_string(),
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }

    Ok(url)
}

/// Values the gateway cannot take as a plain path segment (empty, or holding a
/// `/`) go out as `name@base64/value`.
fn push_label(segments: &mut url::PathSegmentsMut<'_>, name: &str, value: &str) {
    if value.is_empty() {
        segments.push(&format!("{}@base64", name)).push("=");
    } else if value.contains('/') {
        segments
            .push(&format!("{}@base64", name))
            .push(&URL_SAFE.encode(value));
    } else {
        segments.push(name).push(value);
    }
}
