//! Transport to the index backend
//!
//! [`Transport`] is the seam tests replace. [`HttpTransport`] talks HTTP via
//! `ureq`. Because `ureq` blocks, the request runs on a worker thread while
//! the caller polls its [`Context`]; on cancellation or deadline the caller
//! returns immediately and the worker's result is dropped.
//!
//! A blocking `ureq` call cannot be interrupted, so an abandoned worker keeps
//! its connection until the request finishes or its own timeout fires. That
//! timeout is the transport timeout, shortened to the context's remaining
//! time when the context has a deadline. Plain cancellation without a
//! deadline leaves the worker running for at most the transport timeout.

use cairn_core::{Context, Error};
use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::debug;

/// How often a waiting caller checks its context
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Default cap on a response body (1 GiB)
pub const DEFAULT_MAX_RESPONSE_BYTES: u64 = 1 << 30;

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
}

/// A request to the backend
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// HTTP method
    pub method: Method,
    /// Path below the endpoint, starting with `/`
    pub path: String,
    /// JSON body
    pub body: Vec<u8>,
}

impl Request {
    /// POST with a JSON body
    pub fn post(path: impl Into<String>, body: Vec<u8>) -> Self {
        Request {
            method: Method::Post,
            path: path.into(),
            body,
        }
    }

    /// PUT with a JSON body
    pub fn put(path: impl Into<String>, body: Vec<u8>) -> Self {
        Request {
            method: Method::Put,
            path: path.into(),
            body,
        }
    }
}

/// Status and body of a backend response, success or not
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    /// HTTP status
    pub status: u16,
    /// Response body
    pub body: Vec<u8>,
}

impl RawResponse {
    /// True for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Why a request produced no response
#[derive(Debug, Clone, PartialEq)]
pub enum SendError {
    /// The caller's context was cancelled or its deadline passed
    Cancelled,
    /// The request timed out on the transport's own timeout
    Timeout,
    /// Connection refused, DNS failure, reset, unreadable body, ...
    Network(String),
}

impl SendError {
    /// Convert into the crate error for `operation`
    pub fn into_error(self, operation: &str) -> Error {
        match self {
            SendError::Cancelled => Error::cancelled(operation),
            SendError::Timeout => Error::TransportError {
                operation: operation.to_string(),
                reason: "request timed out".to_string(),
            },
            SendError::Network(reason) => Error::TransportError {
                operation: operation.to_string(),
                reason,
            },
        }
    }
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::Cancelled => write!(f, "cancelled"),
            SendError::Timeout => write!(f, "timed out"),
            SendError::Network(msg) => write!(f, "network error: {}", msg),
        }
    }
}

impl std::error::Error for SendError {}

/// Sends requests to the backend
///
/// Implementations make a single attempt and must return
/// `SendError::Cancelled` promptly once `ctx` is done.
pub trait Transport: Send + Sync {
    /// Send `request` and return whatever status the backend answered with
    fn send(&self, ctx: &Context, request: Request) -> Result<RawResponse, SendError>;
}

/// HTTP transport backed by `ureq`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: String,
    timeout: Duration,
    max_response_bytes: u64,
}

impl HttpTransport {
    /// Create a transport for `endpoint` (e.g. `http://localhost:9201`)
    ///
    /// `timeout` caps every request; a context deadline can shorten it.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        HttpTransport {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            timeout,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }

    /// Cap response bodies at `limit` bytes; larger bodies fail with `Network`
    pub fn with_max_response_bytes(mut self, limit: u64) -> Self {
        self.max_response_bytes = limit;
        self
    }

    /// Endpoint without trailing slash
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Timeout given to the worker for a request made under `ctx`
    fn request_timeout(&self, ctx: &Context) -> Duration {
        match ctx.remaining() {
            Some(remaining) => remaining.min(self.timeout),
            None => self.timeout,
        }
    }

    fn perform(
        url: String,
        request: Request,
        timeout: Duration,
        max_response_bytes: u64,
    ) -> Result<RawResponse, SendError> {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        let agent = ureq::Agent::new_with_config(config);

        let sent = match request.method {
            Method::Get => agent.get(&url).call(),
            Method::Post => agent
                .post(&url)
                .header("Content-Type", "application/json")
                .send(&request.body[..]),
            Method::Put => agent
                .put(&url)
                .header("Content-Type", "application/json")
                .send(&request.body[..]),
        };

        let mut response = sent.map_err(|e| match e {
            ureq::Error::Timeout(_) => SendError::Timeout,
            other => SendError::Network(other.to_string()),
        })?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .with_config()
            .limit(max_response_bytes)
            .read_to_vec()
            .map_err(|e| SendError::Network(format!("failed to read response: {}", e)))?;

        Ok(RawResponse { status, body })
    }
}

impl Transport for HttpTransport {
    fn send(&self, ctx: &Context, request: Request) -> Result<RawResponse, SendError> {
        if ctx.is_done() {
            return Err(SendError::Cancelled);
        }

        let timeout = self.request_timeout(ctx);
        let max_response_bytes = self.max_response_bytes;
        let url = format!("{}{}", self.endpoint, request.path);
        debug!(target: "cairn::search", url = %url, "Sending backend request");

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            // The receiver is gone if the caller was cancelled.
            let _ = tx.send(Self::perform(url, request, timeout, max_response_bytes));
        });

        loop {
            match rx.recv_timeout(CANCEL_POLL_INTERVAL) {
                Ok(Err(SendError::Timeout)) if ctx.is_done() => return Err(SendError::Cancelled),
                Ok(result) => return result,
                Err(RecvTimeoutError::Timeout) => {
                    if ctx.is_done() {
                        debug!(target: "cairn::search", "Backend request abandoned: context done");
                        return Err(SendError::Cancelled);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(SendError::Network("request worker exited".to_string()))
                }
            }
        }
    }
}
