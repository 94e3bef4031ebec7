//! Search execution against the backend
//!
//! The executor encodes a built body, sends it to the scoped index, and
//! classifies the response. It makes exactly one attempt; retry policy
//! belongs to callers.

use crate::index::IndexScope;
use crate::response::classify_response;
use crate::transport::{RawResponse, Request, SendError, Transport};
use cairn_core::{Context, Error, Result};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Runs search bodies against a [`Transport`]
#[derive(Clone)]
pub struct SearchExecutor {
    transport: Arc<dyn Transport>,
}

impl SearchExecutor {
    /// Create an executor over `transport`
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        SearchExecutor { transport }
    }

    /// Send `body` to `scope`'s index and return the successful response
    ///
    /// # Errors
    /// - `EncodingError` if the body cannot be serialized
    /// - `CancellationError` if `ctx` is done before or during the request
    /// - `TransportError` if no response arrived
    /// - `BackendResponseError` / `ResponseClassificationError` for non-2xx
    pub fn execute(
        &self,
        ctx: &Context,
        operation: &str,
        scope: &IndexScope,
        body: &JsonValue,
    ) -> Result<RawResponse> {
        let payload = serde_json::to_vec(body).map_err(|e| Error::EncodingError {
            operation: operation.to_string(),
            reason: e.to_string(),
        })?;

        if ctx.is_done() {
            return Err(Error::cancelled(operation));
        }

        let index = scope.index_name();
        let started = Instant::now();
        debug!(
            target: "cairn::search",
            operation,
            index = %index,
            bytes = payload.len(),
            "Executing search"
        );

        let response = self
            .transport
            .send(ctx, Request::post(format!("/{}/_search", index), payload))
            .map_err(|e| {
                let e = match e {
                    SendError::Timeout if ctx.is_done() => SendError::Cancelled,
                    other => other,
                };
                warn!(target: "cairn::search", operation, index = %index, error = %e, "Search request failed");
                e.into_error(operation)
            })?;

        if let Err(e) = classify_response(operation, &response) {
            warn!(
                target: "cairn::search",
                operation,
                index = %index,
                status = response.status,
                error = %e,
                "Backend rejected search"
            );
            return Err(e);
        }

        debug!(
            target: "cairn::search",
            operation,
            index = %index,
            status = response.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Search completed"
        );
        Ok(response)
    }
}
