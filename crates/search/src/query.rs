//! Search body construction
//!
//! ## Body Shapes
//!
//! Without a vector the filter fragment is the whole query:
//!
//! ```text
//! { "query": F, "size": limit }
//! ```
//!
//! With a vector, F is wrapped in a `function_score` whose script replaces
//! the relevance score with the vector score. `boost_mode: replace` drops
//! the original score entirely; F still gates which documents match.
//!
//! ```text
//! { "query": { "function_score": {
//!     "query": F, "boost_mode": "replace",
//!     "functions": [ { "script_score": { "script": {
//!         "inline": "binary_vector_score", "lang": "knn",
//!         "params": { "cosine": bool, "field": "_vector", "vector": [..] } } } } ] } },
//!   "size": limit }
//! ```

use crate::filter::{match_all, Filter, FilterCompiler};
use crate::index::KEY_VECTOR;
use cairn_core::{Error, Result};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

/// Name of the backend scoring script
pub const SCRIPT_NAME: &str = "binary_vector_score";

/// Language the scoring script is registered under
pub const SCRIPT_LANG: &str = "knn";

/// Builds backend search bodies from a filter and an optional vector
#[derive(Clone)]
pub struct QueryBuilder {
    compiler: Arc<dyn FilterCompiler>,
    cosine: bool,
}

impl QueryBuilder {
    /// Create a builder
    ///
    /// `cosine` selects cosine similarity in the scoring script; `false`
    /// uses the script's dot-product scorer.
    pub fn new(compiler: Arc<dyn FilterCompiler>, cosine: bool) -> Self {
        QueryBuilder { compiler, cosine }
    }

    /// Whether cosine similarity is requested
    pub fn cosine(&self) -> bool {
        self.cosine
    }

    /// Build the search body
    ///
    /// # Errors
    /// `EncodingError` if the filter does not compile or the vector holds a
    /// value JSON cannot carry (NaN, infinity).
    pub fn build(
        &self,
        operation: &str,
        filter: Option<&Filter>,
        vector: Option<&[f32]>,
        limit: usize,
    ) -> Result<JsonValue> {
        let filter_query = match filter {
            Some(f) => self.compiler.compile(f).map_err(|reason| Error::EncodingError {
                operation: operation.to_string(),
                reason: format!("filter: {}", reason),
            })?,
            None => match_all(),
        };

        let query = match vector {
            None => filter_query,
            Some(v) => {
                if let Some(pos) = v.iter().position(|x| !x.is_finite()) {
                    return Err(Error::EncodingError {
                        operation: operation.to_string(),
                        reason: format!("vector element {} is not finite", pos),
                    });
                }
                self.function_score(filter_query, v)
            }
        };

        Ok(json!({
            "query": query,
            "size": limit,
        }))
    }

    fn function_score(&self, filter_query: JsonValue, vector: &[f32]) -> JsonValue {
        json!({
            "function_score": {
                "query": filter_query,
                "boost_mode": "replace",
                "functions": [
                    {
                        "script_score": {
                            "script": {
                                "inline": SCRIPT_NAME,
                                "lang": SCRIPT_LANG,
                                "params": {
                                    "cosine": self.cosine,
                                    "field": KEY_VECTOR,
                                    "vector": vector,
                                }
                            }
                        }
                    }
                ]
            }
        })
    }
}
