//! Classification of non-success backend responses
//!
//! Error payloads look like either
//! `{"error": {"type": "...", "reason": "..."}, "status": 404}` or
//! `{"error": "..."}`. Anything else is unclassifiable and reported as
//! `ResponseClassificationError` rather than a decode failure.

use crate::transport::RawResponse;
use cairn_core::{Error, Result};
use serde_json::Value as JsonValue;

/// Longest body excerpt included in an error
const MAX_EXCERPT: usize = 200;

/// `Ok(())` for 2xx responses, otherwise the classified backend error
pub fn classify_response(operation: &str, response: &RawResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }

    let unclassifiable = |reason: String| Error::ResponseClassificationError {
        operation: operation.to_string(),
        status: response.status,
        reason,
    };

    let json: JsonValue = serde_json::from_slice(&response.body).map_err(|e| {
        unclassifiable(format!(
            "invalid error payload ({}): {}",
            e,
            excerpt(&response.body)
        ))
    })?;

    let (error_type, reason) = match json.get("error") {
        Some(JsonValue::Object(obj)) => {
            let field = |name: &str| obj.get(name).and_then(|v| v.as_str()).map(str::to_string);
            match (field("type"), field("reason")) {
                (Some(t), Some(r)) => (t, r),
                (Some(t), None) => (t, "no reason given".to_string()),
                (None, Some(r)) => ("unknown".to_string(), r),
                (None, None) => {
                    return Err(unclassifiable(format!(
                        "error object without type or reason: {}",
                        excerpt(&response.body)
                    )))
                }
            }
        }
        Some(JsonValue::String(s)) => ("error".to_string(), s.clone()),
        _ => {
            return Err(unclassifiable(format!(
                "missing error field: {}",
                excerpt(&response.body)
            )))
        }
    };

    Err(Error::BackendResponseError {
        operation: operation.to_string(),
        status: response.status,
        error_type,
        reason,
    })
}

fn excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    text.chars().take(MAX_EXCERPT).collect()
}
