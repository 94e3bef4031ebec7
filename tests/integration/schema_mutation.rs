//! Schema mutation through the Cairn handle

use crate::common::*;
use cairn::{AdminListAuthorizer, Cairn, Class, Context, Error, Kind, Principal, Property};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn cairn_with(backend: Arc<FakeBackend>) -> Cairn {
    Cairn::with_transport(memory_config(), backend).unwrap()
}

#[test]
fn test_added_class_is_retrievable_under_normalized_name() {
    let backend = FakeBackend::new();
    let cairn = cairn_with(backend.clone());

    cairn.add_thing(&Context::background(), None, city()).unwrap();

    let (kind, class) = cairn.schema().get_class("City").unwrap();
    assert_eq!(kind, Kind::Thing);
    assert_eq!(class.name, "City");
    assert!(cairn.schema().get_class("city").is_none());
    assert_eq!(backend.puts(), vec!["/class_thing_city".to_string()]);
}

#[test]
fn test_duplicate_across_kinds_leaves_count_unchanged() {
    let cairn = cairn_with(FakeBackend::new());
    let ctx = Context::background();
    cairn.add_thing(&ctx, None, city()).unwrap();
    let before = cairn.schema().class_count();

    let err = cairn.add_action(&ctx, None, Class::new("City")).unwrap_err();

    assert!(matches!(err, Error::DuplicateClassName { name } if name == "City"));
    assert_eq!(cairn.schema().class_count(), before);
}

#[test]
fn test_properties_colliding_after_normalization() {
    let cairn = cairn_with(FakeBackend::new());
    let class = Class::new("Town")
        .with_property(Property::new("Name", &["string"]))
        .with_property(Property::new("name", &["text"]));

    let err = cairn.add_thing(&Context::background(), None, class).unwrap_err();

    assert!(matches!(err, Error::DuplicatePropertyName { class, property } if class == "Town" && property == "name"));
    assert!(cairn.schema().get_class("Town").is_none());
    assert_eq!(cairn.schema().class_count(), 0);
}

#[test]
fn test_cross_reference_requires_existing_class() {
    let cairn = cairn_with(FakeBackend::new());
    let ctx = Context::background();
    let trip = Class::new("Trip").with_property(Property::new("destination", &["City"]));

    let err = cairn.add_action(&ctx, None, trip.clone()).unwrap_err();
    assert!(matches!(err, Error::InvalidDataType { .. }));

    cairn.add_thing(&ctx, None, city()).unwrap();
    cairn.add_action(&ctx, None, trip).unwrap();
    assert_eq!(cairn.schema().class_count(), 2);
}

#[test]
fn test_permission_denied_touches_nothing() {
    let backend = FakeBackend::new();
    let cairn = Cairn::with_authorizer(
        memory_config(),
        backend.clone(),
        Arc::new(AdminListAuthorizer::new(["root"])),
    )
    .unwrap();
    let ctx = Context::background();

    let err = cairn
        .add_thing(&ctx, Some(&Principal::new("guest")), city())
        .unwrap_err();
    assert!(matches!(err, Error::PermissionDenied { .. }));
    assert!(backend.requests().is_empty());

    cairn
        .add_thing(&ctx, Some(&Principal::new("root")), city())
        .unwrap();
    assert_eq!(cairn.schema().class_count(), 1);
}

#[test]
fn test_concurrent_adds_all_land_one_at_a_time() {
    const N: usize = 12;

    let backend = FakeBackend::slow(Duration::from_millis(5));
    let cairn = Arc::new(cairn_with(backend.clone()));
    let barrier = Arc::new(Barrier::new(N));

    let handles: Vec<_> = (0..N)
        .map(|i| {
            let cairn = Arc::clone(&cairn);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let kind = if i % 2 == 0 { Kind::Thing } else { Kind::Action };
                let class = Class::new(format!("class{}", i))
                    .with_property(Property::new("label", &["string"]));
                cairn
                    .schema()
                    .add_class(&Context::background(), None, kind, class)
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    assert_eq!(cairn.schema().class_count(), N);
    assert_eq!(backend.puts().len(), N);
    // Migrations happen under the schema lock, so they never overlap.
    assert_eq!(backend.max_in_flight(), 1);
}
