//! Decoding backend hits into typed search results
//!
//! Decoding is strict and atomic: the first malformed hit fails the whole
//! batch with a `DecodeError` naming that hit's position, and no partial
//! results are returned. Output order is backend order.
//!
//! Property values are typed through a [`ClassRegistry`] built from a
//! schema snapshot; the JSON shape of a value never decides its type.

use crate::index::{is_reserved_key, KEY_CLASS_NAME, KEY_KIND, KEY_VECTOR};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use byteorder::{ByteOrder, LittleEndian};
use cairn_core::{
    CrossRef, DataType, Error, Kind, PrimitiveDataType, PropertyValue, Result, SchemaState,
    VectorSearchResult,
};
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use std::collections::{BTreeMap, HashMap};

// ============================================================================
// Vector encoding
// ============================================================================

/// Encode a vector as base64 of little-endian f32 bytes
pub fn vector_to_base64(vector: &[f32]) -> String {
    let mut bytes = vec![0u8; vector.len() * 4];
    LittleEndian::write_f32_into(vector, &mut bytes);
    BASE64.encode(&bytes)
}

/// Decode base64 of little-endian f32 bytes
///
/// Errors describe the failure: malformed base64, or a byte length that is
/// not a multiple of 4.
pub fn base64_to_vector(encoded: &str) -> std::result::Result<Vec<f32>, String> {
    let bytes = BASE64
        .decode(encoded)
        .map_err(|e| format!("invalid base64 vector: {}", e))?;
    if bytes.len() % 4 != 0 {
        return Err(format!(
            "vector byte length {} is not a multiple of 4",
            bytes.len()
        ));
    }
    let mut vector = vec![0f32; bytes.len() / 4];
    LittleEndian::read_f32_into(&bytes, &mut vector);
    Ok(vector)
}

// ============================================================================
// Class registry
// ============================================================================

/// Property types of one class
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDescriptor {
    /// Kind the class belongs to
    pub kind: Kind,
    /// Property name to resolved data type
    pub properties: HashMap<String, DataType>,
}

/// Class name to property descriptors, built from a schema snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassRegistry {
    classes: HashMap<String, ClassDescriptor>,
}

impl ClassRegistry {
    /// Build from `schema`
    ///
    /// Properties whose data type no longer resolves are left out; a hit
    /// carrying one then fails as an unknown property.
    pub fn from_schema(schema: &SchemaState) -> Self {
        let classes = schema
            .classes()
            .map(|(kind, class)| {
                let properties = class
                    .properties
                    .iter()
                    .filter_map(|p| {
                        schema
                            .find_property_data_type(&p.data_type)
                            .ok()
                            .map(|dt| (p.name.clone(), dt))
                    })
                    .collect();
                (class.name.clone(), ClassDescriptor { kind, properties })
            })
            .collect();
        ClassRegistry { classes }
    }

    /// Descriptor for `class_name`
    pub fn get(&self, class_name: &str) -> Option<&ClassDescriptor> {
        self.classes.get(class_name)
    }

    /// Number of registered classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// True if no classes are registered
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

// ============================================================================
// Property parsing
// ============================================================================

/// Parse the non-reserved fields of `source` into typed property values
///
/// `null` values are omitted. An unknown property or a value that does not
/// match its declared type is an error.
pub fn parse_properties(
    descriptor: &ClassDescriptor,
    source: &Map<String, JsonValue>,
) -> std::result::Result<BTreeMap<String, PropertyValue>, String> {
    let mut properties = BTreeMap::new();
    for (key, raw) in source {
        if is_reserved_key(key) || raw.is_null() {
            continue;
        }
        let data_type = descriptor
            .properties
            .get(key)
            .ok_or_else(|| format!("unknown property '{}'", key))?;
        let value = parse_value(data_type, raw)
            .map_err(|reason| format!("property '{}': {}", key, reason))?;
        properties.insert(key.clone(), value);
    }
    Ok(properties)
}

fn parse_value(data_type: &DataType, raw: &JsonValue) -> std::result::Result<PropertyValue, String> {
    let mismatch = |expected: &str| format!("expected {}, got {}", expected, raw);

    match data_type {
        DataType::Primitive(p) => match p {
            PrimitiveDataType::String => raw
                .as_str()
                .map(|s| PropertyValue::String(s.to_string()))
                .ok_or_else(|| mismatch("string")),
            PrimitiveDataType::Text => raw
                .as_str()
                .map(|s| PropertyValue::Text(s.to_string()))
                .ok_or_else(|| mismatch("text")),
            PrimitiveDataType::Date => raw
                .as_str()
                .map(|s| PropertyValue::Date(s.to_string()))
                .ok_or_else(|| mismatch("date string")),
            PrimitiveDataType::Int => raw
                .as_i64()
                .map(PropertyValue::Int)
                .ok_or_else(|| mismatch("integer")),
            PrimitiveDataType::Number => raw
                .as_f64()
                .map(PropertyValue::Number)
                .ok_or_else(|| mismatch("number")),
            PrimitiveDataType::Boolean => raw
                .as_bool()
                .map(PropertyValue::Boolean)
                .ok_or_else(|| mismatch("boolean")),
            PrimitiveDataType::GeoCoordinates => parse_geo(raw).ok_or_else(|| mismatch("geo point")),
        },
        DataType::Reference(_) => parse_references(raw).ok_or_else(|| mismatch("reference list")),
    }
}

// Accepts the backend's geo_point object form `{lat, lon}` as well as
// `{latitude, longitude}`.
fn parse_geo(raw: &JsonValue) -> Option<PropertyValue> {
    let obj = raw.as_object()?;
    let coord = |short: &str, long: &str| {
        obj.get(short)
            .or_else(|| obj.get(long))
            .and_then(|v| v.as_f64())
    };
    Some(PropertyValue::GeoCoordinates {
        latitude: coord("lat", "latitude")?,
        longitude: coord("lon", "longitude")?,
    })
}

fn parse_references(raw: &JsonValue) -> Option<PropertyValue> {
    let beacon = |v: &JsonValue| {
        v.get("beacon").and_then(|b| b.as_str()).map(|b| CrossRef {
            beacon: b.to_string(),
        })
    };
    let refs = match raw {
        JsonValue::Array(items) => items.iter().map(beacon).collect::<Option<Vec<_>>>()?,
        JsonValue::Object(_) => vec![beacon(raw)?],
        _ => return None,
    };
    Some(PropertyValue::References(refs))
}

// ============================================================================
// Response decoding
// ============================================================================

#[derive(Deserialize)]
struct SearchEnvelope {
    hits: HitsEnvelope,
}

#[derive(Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<JsonValue>,
}

#[derive(Deserialize)]
struct RawHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_score")]
    score: Option<f32>,
    #[serde(rename = "_source")]
    source: Map<String, JsonValue>,
}

/// Decode a successful search response body
///
/// # Errors
/// `DecodeError` with no index if the envelope is malformed, or with the
/// position of the first hit that fails.
pub fn decode_response(
    operation: &str,
    body: &[u8],
    registry: &ClassRegistry,
) -> Result<Vec<VectorSearchResult>> {
    let envelope: SearchEnvelope = serde_json::from_slice(body)
        .map_err(|e| Error::decode_envelope(operation, e.to_string()))?;

    envelope
        .hits
        .hits
        .into_iter()
        .enumerate()
        .map(|(index, hit)| {
            decode_hit(hit, registry).map_err(|reason| Error::decode_at(operation, index, reason))
        })
        .collect()
}

fn decode_hit(
    hit: JsonValue,
    registry: &ClassRegistry,
) -> std::result::Result<VectorSearchResult, String> {
    let hit: RawHit = serde_json::from_value(hit).map_err(|e| format!("malformed hit: {}", e))?;

    let kind_str = source_str(&hit.source, KEY_KIND)?;
    let kind = Kind::parse(kind_str).ok_or_else(|| format!("unrecognized kind '{}'", kind_str))?;

    let vector = base64_to_vector(source_str(&hit.source, KEY_VECTOR)?)?;

    let class_name = source_str(&hit.source, KEY_CLASS_NAME)?.to_string();
    let score = hit
        .score
        .ok_or_else(|| "missing relevance score".to_string())?;

    let descriptor = registry
        .get(&class_name)
        .ok_or_else(|| format!("unknown class '{}'", class_name))?;
    if descriptor.kind != kind {
        return Err(format!(
            "class '{}' is a {}, hit says {}",
            class_name, descriptor.kind, kind
        ));
    }
    let properties = parse_properties(descriptor, &hit.source)?;

    Ok(VectorSearchResult {
        id: hit.id,
        class_name,
        kind,
        score,
        vector,
        properties,
    })
}

fn source_str<'a>(source: &'a Map<String, JsonValue>, key: &str) -> std::result::Result<&'a str, String> {
    match source.get(key) {
        Some(JsonValue::String(s)) => Ok(s.as_str()),
        Some(other) => Err(format!("field '{}' is not a string: {}", key, other)),
        None => Err(format!("missing field '{}'", key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_core::{Class, Property};
    use proptest::prelude::*;
    use serde_json::json;

    fn schema() -> SchemaState {
        let mut schema = SchemaState::new();
        schema.things.classes.push(
            Class::new("City")
                .with_property(Property::new("name", &["string"]))
                .with_property(Property::new("population", &["int"]))
                .with_property(Property::new("area", &["number"]))
                .with_property(Property::new("location", &["geoCoordinates"])),
        );
        schema.actions.classes.push(
            Class::new("Visit")
                .with_property(Property::new("visitedAt", &["date"]))
                .with_property(Property::new("city", &["City"])),
        );
        schema
    }

    fn registry() -> ClassRegistry {
        ClassRegistry::from_schema(&schema())
    }

    fn hit(id: &str, kind: &str, class: &str, vector: &[f32], extra: JsonValue) -> JsonValue {
        let mut source = json!({
            "_kind": kind,
            "_class_name": class,
            "_vector": vector_to_base64(vector),
        });
        if let (Some(src), Some(extra)) = (source.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                src.insert(k.clone(), v.clone());
            }
        }
        json!({ "_id": id, "_score": 1.5, "_source": source })
    }

    fn body(hits: Vec<JsonValue>) -> Vec<u8> {
        serde_json::to_vec(&json!({ "hits": { "hits": hits } })).unwrap()
    }

    #[test]
    fn test_decodes_hits_in_order() {
        let hits = vec![
            hit("id-1", "thing", "City", &[1.0, 2.0], json!({"name": "Berlin", "population": 3_600_000})),
            hit("id-2", "action", "Visit", &[0.5], json!({"visitedAt": "2020-01-01T00:00:00Z"})),
        ];

        let results = decode_response("vector search", &body(hits), &registry()).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "id-1");
        assert_eq!(results[0].kind, Kind::Thing);
        assert_eq!(results[0].class_name, "City");
        assert_eq!(results[0].vector, vec![1.0, 2.0]);
        assert_eq!(results[0].score, 1.5);
        assert_eq!(
            results[0].properties.get("name"),
            Some(&PropertyValue::String("Berlin".to_string()))
        );
        assert_eq!(
            results[0].properties.get("population"),
            Some(&PropertyValue::Int(3_600_000))
        );
        assert_eq!(results[1].id, "id-2");
        assert_eq!(results[1].kind, Kind::Action);
    }

    #[test]
    fn test_empty_hits() {
        let results = decode_response("vector search", &body(vec![]), &registry()).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_unknown_kind_fails_batch() {
        let hits = vec![
            hit("a", "thing", "City", &[1.0], json!({})),
            hit("b", "gadget", "City", &[1.0], json!({})),
        ];
        let err = decode_response("vector search", &body(hits), &registry()).unwrap_err();
        assert!(matches!(
            err,
            Error::DecodeError { index: Some(1), reason, .. } if reason.contains("gadget")
        ));
    }

    #[test]
    fn test_invalid_base64_fails_batch() {
        let mut bad = hit("a", "thing", "City", &[1.0], json!({}));
        bad["_source"]["_vector"] = json!("!!not base64!!");
        let err = decode_response("vector search", &body(vec![bad]), &registry()).unwrap_err();
        assert!(matches!(err, Error::DecodeError { index: Some(0), .. }));
    }

    #[test]
    fn test_vector_length_not_multiple_of_four() {
        let mut bad = hit("b", "thing", "City", &[], json!({}));
        bad["_source"]["_vector"] = json!(BASE64.encode([1u8, 2, 3, 4, 5, 6]));
        let hits = vec![hit("a", "thing", "City", &[1.0], json!({})), bad];
        let err = decode_response("vector search", &body(hits), &registry()).unwrap_err();
        assert!(matches!(
            err,
            Error::DecodeError { index: Some(1), reason, .. } if reason.contains("multiple of 4")
        ));
    }

    #[test]
    fn test_unknown_class_and_property() {
        let hits = vec![hit("a", "thing", "Country", &[1.0], json!({}))];
        let err = decode_response("class search", &body(hits), &registry()).unwrap_err();
        assert!(matches!(err, Error::DecodeError { reason, .. } if reason.contains("Country")));

        let hits = vec![hit("a", "thing", "City", &[1.0], json!({"mayor": "x"}))];
        let err = decode_response("class search", &body(hits), &registry()).unwrap_err();
        assert!(matches!(err, Error::DecodeError { reason, .. } if reason.contains("mayor")));
    }

    #[test]
    fn test_kind_must_match_class() {
        let hits = vec![hit("a", "action", "City", &[1.0], json!({}))];
        let err = decode_response("class search", &body(hits), &registry()).unwrap_err();
        assert!(matches!(err, Error::DecodeError { index: Some(0), .. }));
    }

    #[test]
    fn test_type_mismatch() {
        let hits = vec![hit("a", "thing", "City", &[1.0], json!({"population": "many"}))];
        let err = decode_response("class search", &body(hits), &registry()).unwrap_err();
        assert!(matches!(err, Error::DecodeError { reason, .. } if reason.contains("population")));
    }

    #[test]
    fn test_typed_properties() {
        let hits = vec![
            hit(
                "a",
                "thing",
                "City",
                &[1.0],
                json!({"area": 891.8, "location": {"lat": 52.5, "lon": 13.4}, "name": null}),
            ),
            hit(
                "b",
                "action",
                "Visit",
                &[1.0],
                json!({"city": [{"beacon": "cairn://localhost/things/a"}]}),
            ),
        ];
        let results = decode_response("class search", &body(hits), &registry()).unwrap();

        let city = &results[0].properties;
        assert_eq!(city.get("area"), Some(&PropertyValue::Number(891.8)));
        assert_eq!(
            city.get("location"),
            Some(&PropertyValue::GeoCoordinates {
                latitude: 52.5,
                longitude: 13.4
            })
        );
        assert!(!city.contains_key("name"));

        assert_eq!(
            results[1].properties.get("city"),
            Some(&PropertyValue::References(vec![CrossRef {
                beacon: "cairn://localhost/things/a".to_string()
            }]))
        );
    }

    #[test]
    fn test_malformed_envelope() {
        let err = decode_response("vector search", b"not json", &registry()).unwrap_err();
        assert!(matches!(err, Error::DecodeError { index: None, .. }));
    }

    #[test]
    fn test_missing_id_is_indexed() {
        let mut bad = hit("a", "thing", "City", &[1.0], json!({}));
        if let Some(obj) = bad.as_object_mut() {
            obj.remove("_id");
        }
        let err = decode_response("vector search", &body(vec![bad]), &registry()).unwrap_err();
        assert!(matches!(err, Error::DecodeError { index: Some(0), .. }));
    }

    #[test]
    fn test_registry_contents() {
        let registry = registry();
        assert_eq!(registry.len(), 2);
        let visit = registry.get("Visit").unwrap();
        assert_eq!(visit.kind, Kind::Action);
        assert_eq!(
            visit.properties.get("city"),
            Some(&DataType::Reference(vec!["City".to_string()]))
        );
    }

    #[test]
    fn test_known_vector_round_trip() {
        let original = vec![1.0f32, -2.5, 0.0, 3.25e-7, f32::MAX];
        assert_eq!(base64_to_vector(&vector_to_base64(&original)).unwrap(), original);
    }

    proptest! {
        #[test]
        fn prop_vector_round_trip(v in proptest::collection::vec(any::<f32>().prop_filter("finite", |x| x.is_finite()), 0..64)) {
            let decoded = base64_to_vector(&vector_to_base64(&v)).unwrap();
            prop_assert_eq!(decoded, v);
        }
    }
}
