//! Vector repository: the search entry points
//!
//! Each call builds a body, executes it against the right index scope, and
//! decodes the hits against the current schema. Calls share no mutable
//! state and take no lock; any number can run concurrently.

use crate::config::SearchConfig;
use crate::decode::{decode_response, ClassRegistry};
use crate::executor::SearchExecutor;
use crate::filter::{BoolQueryCompiler, Filter, FilterCompiler};
use crate::index::IndexScope;
use crate::query::QueryBuilder;
use crate::transport::{HttpTransport, Transport};
use cairn_core::{Context, Kind, Result, SchemaState, VectorSearchResult};
use cairn_schema::SchemaManager;
use std::sync::Arc;
use tracing::debug;

/// Read-only view of the live schema
pub trait SchemaSnapshot: Send + Sync {
    /// Current schema
    fn snapshot(&self) -> SchemaState;
}

impl SchemaSnapshot for SchemaManager {
    fn snapshot(&self) -> SchemaState {
        SchemaManager::snapshot(self)
    }
}

impl SchemaSnapshot for SchemaState {
    fn snapshot(&self) -> SchemaState {
        self.clone()
    }
}

/// Search facade over one backend
pub struct VectorRepo {
    schema: Arc<dyn SchemaSnapshot>,
    builder: QueryBuilder,
    executor: SearchExecutor,
    default_limit: usize,
}

impl VectorRepo {
    /// Connect to the backend named in `config` over HTTP
    pub fn connect(config: &SearchConfig, schema: Arc<dyn SchemaSnapshot>) -> Result<Self> {
        config.validate()?;
        let transport = Arc::new(
            HttpTransport::new(config.endpoint.clone(), config.timeout())
                .with_max_response_bytes(config.max_response_bytes),
        );
        Ok(Self::with_transport(config, schema, transport))
    }

    /// Build over an arbitrary transport
    pub fn with_transport(
        config: &SearchConfig,
        schema: Arc<dyn SchemaSnapshot>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        VectorRepo {
            schema,
            builder: QueryBuilder::new(Arc::new(BoolQueryCompiler), config.cosine),
            executor: SearchExecutor::new(transport),
            default_limit: config.default_limit,
        }
    }

    /// Replace the filter compiler
    pub fn with_filter_compiler(mut self, compiler: Arc<dyn FilterCompiler>) -> Self {
        self.builder = QueryBuilder::new(compiler, self.builder.cosine());
        self
    }

    /// Filtered search within one class, backend relevance order
    pub fn class_search(
        &self,
        ctx: &Context,
        kind: Kind,
        class_name: &str,
        limit: Option<usize>,
        filter: Option<&Filter>,
    ) -> Result<Vec<VectorSearchResult>> {
        self.search(
            ctx,
            "class search",
            IndexScope::class(kind, class_name),
            filter,
            None,
            limit,
        )
    }

    /// Similarity search within one class
    pub fn vector_class_search(
        &self,
        ctx: &Context,
        kind: Kind,
        class_name: &str,
        vector: &[f32],
        limit: Option<usize>,
        filter: Option<&Filter>,
    ) -> Result<Vec<VectorSearchResult>> {
        self.search(
            ctx,
            "vector class search",
            IndexScope::class(kind, class_name),
            filter,
            Some(vector),
            limit,
        )
    }

    /// Similarity search across every class
    pub fn vector_search(
        &self,
        ctx: &Context,
        vector: &[f32],
        limit: Option<usize>,
        filter: Option<&Filter>,
    ) -> Result<Vec<VectorSearchResult>> {
        self.search(ctx, "vector search", IndexScope::All, filter, Some(vector), limit)
    }

    fn search(
        &self,
        ctx: &Context,
        operation: &str,
        scope: IndexScope,
        filter: Option<&Filter>,
        vector: Option<&[f32]>,
        limit: Option<usize>,
    ) -> Result<Vec<VectorSearchResult>> {
        let limit = limit.unwrap_or(self.default_limit);
        let body = self.builder.build(operation, filter, vector, limit)?;
        let response = self.executor.execute(ctx, operation, &scope, &body)?;

        let registry = ClassRegistry::from_schema(&self.schema.snapshot());
        let results = decode_response(operation, &response.body, &registry)?;

        debug!(target: "cairn::search", operation, index = %scope, hits = results.len(), "Search decoded");
        Ok(results)
    }
}
