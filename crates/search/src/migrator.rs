//! Backend index creation for new classes

use crate::index::{class_index_name, KEY_CLASS_NAME, KEY_KIND, KEY_VECTOR};
use crate::response::classify_response;
use crate::transport::{Request, Transport};
use cairn_core::{Class, Context, Error, Kind, PrimitiveDataType, Result};
use cairn_schema::Migrator;
use serde_json::{json, Map, Value as JsonValue};
use std::sync::Arc;
use tracing::{debug, info};

/// Error type the backend reports when the index is already there
const ALREADY_EXISTS: &str = "resource_already_exists_exception";

/// Creates one backend index per class, with a mapping for its properties
#[derive(Clone)]
pub struct IndexMigrator {
    transport: Arc<dyn Transport>,
}

impl IndexMigrator {
    /// Create a migrator that issues requests through `transport`
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        IndexMigrator { transport }
    }

    /// Index creation body for `class`
    ///
    /// Primitive properties get a typed field. Cross-references are kept in
    /// the source but not indexed.
    pub fn mappings(class: &Class) -> JsonValue {
        let mut properties = Map::new();
        properties.insert(
            KEY_VECTOR.to_string(),
            json!({ "type": "binary", "doc_values": true }),
        );
        properties.insert(KEY_KIND.to_string(), json!({ "type": "keyword" }));
        properties.insert(KEY_CLASS_NAME.to_string(), json!({ "type": "keyword" }));

        for property in &class.properties {
            let field = match property.data_type.as_slice() {
                [single] => PrimitiveDataType::parse(single).map(field_type),
                _ => None,
            };
            let mapping = match field {
                Some(t) => json!({ "type": t }),
                None => json!({ "type": "object", "enabled": false }),
            };
            properties.insert(property.name.clone(), mapping);
        }

        json!({ "mappings": { "properties": properties } })
    }
}

fn field_type(primitive: PrimitiveDataType) -> &'static str {
    match primitive {
        PrimitiveDataType::String => "keyword",
        PrimitiveDataType::Text => "text",
        PrimitiveDataType::Int => "integer",
        PrimitiveDataType::Number => "float",
        PrimitiveDataType::Boolean => "boolean",
        PrimitiveDataType::Date => "date",
        PrimitiveDataType::GeoCoordinates => "geo_point",
    }
}

impl Migrator for IndexMigrator {
    fn add_class(&self, ctx: &Context, kind: Kind, class: &Class) -> Result<()> {
        let index = class_index_name(kind, &class.name);
        let failed = |reason: String| Error::MigrationError {
            class: class.name.clone(),
            reason,
        };

        let body = serde_json::to_vec(&Self::mappings(class))
            .map_err(|e| failed(format!("encoding mappings: {}", e)))?;

        debug!(target: "cairn::search", index = %index, "Creating class index");
        let response = self
            .transport
            .send(ctx, Request::put(format!("/{}", index), body))
            .map_err(|e| failed(format!("creating index {}: {}", index, e)))?;

        match classify_response("create index", &response) {
            Ok(()) => {
                info!(target: "cairn::search", index = %index, class = %class.name, "Class index created");
                Ok(())
            }
            Err(Error::BackendResponseError { error_type, .. }) if error_type == ALREADY_EXISTS => {
                debug!(target: "cairn::search", index = %index, "Class index already exists");
                Ok(())
            }
            Err(e) => Err(failed(e.to_string())),
        }
    }
}
