//! Shared test utilities for the integration suites.
//!
//! Import via `mod common;` from a suite's main.rs.

#![allow(dead_code)]

use cairn::{CairnConfig, Class, Context, Method, Property, RawResponse, Request, SendError, Transport};
use parking_lot::Mutex;
use serde_json::{json, Value as JsonValue};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// ============================================================================
// FakeBackend
// ============================================================================

/// In-process stand-in for the index backend
///
/// PUTs (index creation) always succeed. Searches pop the next queued
/// reply, or answer with no hits when the queue is empty. Every request is
/// recorded.
#[derive(Default)]
pub struct FakeBackend {
    replies: Mutex<VecDeque<RawResponse>>,
    requests: Mutex<Vec<Request>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Option<Duration>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Backend that sleeps on every request
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(FakeBackend {
            delay: Some(delay),
            ..Self::default()
        })
    }

    pub fn reply(&self, status: u16, body: JsonValue) {
        self.replies.lock().push_back(RawResponse {
            status,
            body: serde_json::to_vec(&body).unwrap(),
        });
    }

    pub fn reply_hits(&self, hits: Vec<JsonValue>) {
        self.reply(200, json!({ "hits": { "hits": hits } }));
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().clone()
    }

    pub fn puts(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == Method::Put)
            .map(|r| r.path.clone())
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Transport for FakeBackend {
    fn send(&self, ctx: &Context, request: Request) -> Result<RawResponse, SendError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        let cancelled = ctx.is_done();
        let is_put = request.method == Method::Put;
        self.requests.lock().push(request);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if cancelled {
            return Err(SendError::Cancelled);
        }
        if is_put {
            return Ok(RawResponse {
                status: 200,
                body: br#"{"acknowledged":true}"#.to_vec(),
            });
        }
        Ok(self.replies.lock().pop_front().unwrap_or(RawResponse {
            status: 200,
            body: br#"{"hits":{"hits":[]}}"#.to_vec(),
        }))
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn memory_config() -> CairnConfig {
    CairnConfig::default()
}

pub fn city() -> Class {
    Class::new("city")
        .with_property(Property::new("name", &["string"]))
        .with_property(Property::new("population", &["int"]))
}

pub fn hit(id: &str, kind: &str, class: &str, vector: &[f32], props: JsonValue) -> JsonValue {
    let mut source = json!({
        "_kind": kind,
        "_class_name": class,
        "_vector": cairn::vector_to_base64(vector),
    });
    if let (Some(src), Some(props)) = (source.as_object_mut(), props.as_object()) {
        for (k, v) in props {
            src.insert(k.clone(), v.clone());
        }
    }
    json!({ "_id": id, "_score": 1.0, "_source": source })
}
