//! Search through the Cairn handle

use crate::common::*;
use cairn::{Cairn, Context, Error, Filter, Kind, Operator, PropertyValue};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

fn cairn_with_city(backend: Arc<FakeBackend>) -> Cairn {
    let cairn = Cairn::with_transport(memory_config(), backend).unwrap();
    cairn.add_thing(&Context::background(), None, city()).unwrap();
    cairn
}

fn last_body(backend: &FakeBackend) -> JsonValue {
    let requests = backend.requests();
    serde_json::from_slice(&requests[requests.len() - 1].body).unwrap()
}

#[test]
fn test_filter_only_query_is_compiled_filter() {
    let backend = FakeBackend::new();
    let cairn = cairn_with_city(backend.clone());
    let filter = Filter::clause("population", Operator::GreaterThan, 1_000_000i64);

    cairn
        .class_search(&Context::background(), Kind::Thing, "City", Some(10), Some(&filter))
        .unwrap();

    let body = last_body(&backend);
    assert_eq!(
        body,
        json!({ "query": { "range": { "population": { "gt": 1_000_000 } } }, "size": 10 })
    );
}

#[test]
fn test_vector_query_envelope() {
    let backend = FakeBackend::new();
    let cairn = cairn_with_city(backend.clone());

    cairn
        .vector_class_search(&Context::background(), Kind::Thing, "City", &[1.0, 2.0, 3.0], Some(5), None)
        .unwrap();

    let body = last_body(&backend);
    let fs = &body["query"]["function_score"];
    assert_eq!(fs["boost_mode"], "replace");
    assert_eq!(
        fs["functions"][0]["script_score"]["script"]["params"]["vector"],
        json!([1.0, 2.0, 3.0])
    );
    assert_eq!(body["size"], 5);
}

#[test]
fn test_hits_decode_with_typed_properties() {
    let backend = FakeBackend::new();
    let cairn = cairn_with_city(backend.clone());
    backend.reply_hits(vec![
        hit("b9d4d3f2-1c1e-4a52-9e7a-3a0b8c6f7a10", "thing", "City", &[0.25, -1.5], json!({"name": "Berlin", "population": 3_645_000})),
        hit("c0a1b2c3-0000-4000-8000-000000000000", "thing", "City", &[0.5, 0.5], json!({"name": "Bonn"})),
    ]);

    let results = cairn
        .vector_search(&Context::background(), &[0.25, -1.5], Some(2), None)
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, "b9d4d3f2-1c1e-4a52-9e7a-3a0b8c6f7a10");
    assert_eq!(results[0].vector, vec![0.25, -1.5]);
    assert_eq!(results[0].properties["population"], PropertyValue::Int(3_645_000));
    assert_eq!(results[1].properties["name"], PropertyValue::String("Bonn".to_string()));
    assert!(!results[1].properties.contains_key("population"));
}

#[test]
fn test_malformed_vector_fails_whole_batch() {
    let backend = FakeBackend::new();
    let cairn = cairn_with_city(backend.clone());
    let mut broken = hit("x", "thing", "City", &[1.0], json!({}));
    broken["_source"]["_vector"] = json!(cairn_b64(&[1, 2, 3]));
    backend.reply_hits(vec![hit("ok", "thing", "City", &[1.0], json!({})), broken]);

    let err = cairn
        .vector_search(&Context::background(), &[1.0], None, None)
        .unwrap_err();

    assert!(matches!(err, Error::DecodeError { index: Some(1), .. }));
}

#[test]
fn test_unknown_kind_fails_whole_batch() {
    let backend = FakeBackend::new();
    let cairn = cairn_with_city(backend.clone());
    backend.reply_hits(vec![hit("a", "event", "City", &[1.0], json!({}))]);

    let err = cairn
        .vector_search(&Context::background(), &[1.0], None, None)
        .unwrap_err();
    assert!(matches!(err, Error::DecodeError { index: Some(0), .. }));
}

#[test]
fn test_cancelled_context_reports_cancellation() {
    let backend = FakeBackend::new();
    let cairn = cairn_with_city(backend.clone());
    let ctx = Context::background();
    ctx.cancel();

    let err = cairn.vector_search(&ctx, &[1.0], None, None).unwrap_err();
    assert!(matches!(err, Error::CancellationError { .. }));
    assert!(err.is_retryable());
}

#[test]
fn test_unparseable_backend_error_is_distinct() {
    let backend = FakeBackend::new();
    let cairn = cairn_with_city(backend.clone());
    backend.reply(503, json!("service unavailable"));

    let err = cairn
        .class_search(&Context::background(), Kind::Thing, "City", None, None)
        .unwrap_err();
    assert!(matches!(err, Error::ResponseClassificationError { status: 503, .. }));
}

#[test]
fn test_vector_round_trip_through_decoder() {
    let original: Vec<f32> = vec![0.0, 1.0, -1.0, 3.5, 1e-30, -7.25e12];
    assert_eq!(cairn::base64_to_vector(&cairn::vector_to_base64(&original)).unwrap(), original);

    let backend = FakeBackend::new();
    let cairn = cairn_with_city(backend.clone());
    backend.reply_hits(vec![hit("a", "thing", "City", &original, json!({}))]);
    let results = cairn
        .vector_search(&Context::background(), &original, Some(1), None)
        .unwrap();
    assert_eq!(results[0].vector, original);
}

fn cairn_b64(bytes: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}
