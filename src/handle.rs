//! The `Cairn` handle: a schema manager wired to a vector repository

use crate::config::{CairnConfig, CONFIG_FILE_NAME, DEFAULT_SCHEMA_FILE};
use cairn_core::{Class, Context, Error, Kind, Principal, Result, VectorSearchResult};
use cairn_schema::{Authorizer, FileSchemaStore, InMemorySchemaStore, SchemaManager, SchemaStore};
use cairn_search::{Filter, HttpTransport, IndexMigrator, Transport, VectorRepo};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Schema manager and search repository over one backend
///
/// New classes get their backend index through an [`IndexMigrator`] on the
/// same transport searches use. Searches decode against the manager's live
/// schema.
///
/// # Example
///
/// ```ignore
/// use cairn::{Cairn, Class, Context, Property};
///
/// let cairn = Cairn::open("/var/lib/cairn")?;
/// let ctx = Context::background();
/// cairn.add_thing(&ctx, None, Class::new("city").with_property(Property::new("name", &["string"])))?;
/// let hits = cairn.vector_search(&ctx, &[0.1, 0.2, 0.3], Some(10), None)?;
/// ```
pub struct Cairn {
    schema: Arc<SchemaManager>,
    repo: VectorRepo,
    config: CairnConfig,
}

impl Cairn {
    /// Open with the configuration in `dir`
    ///
    /// Creates `dir` and a default `cairn.toml` if missing. The schema is
    /// persisted to `[schema] path`, resolved against `dir`, or to
    /// `schema.json` in `dir`.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| {
            Error::invalid_config(format!(
                "failed to create data directory '{}': {}",
                dir.display(),
                e
            ))
        })?;

        let config_path = dir.join(CONFIG_FILE_NAME);
        CairnConfig::write_default_if_missing(&config_path)?;
        let mut config = CairnConfig::from_file(&config_path)?;

        let schema_path = match config.schema.path.take() {
            Some(p) if p.is_relative() => dir.join(p),
            Some(p) => p,
            None => dir.join(DEFAULT_SCHEMA_FILE),
        };
        config.schema.path = Some(schema_path);

        Self::with_config(config)
    }

    /// Build from `config`, talking HTTP to `[search] endpoint`
    ///
    /// Without `[schema] path` the schema lives only in memory.
    pub fn with_config(config: CairnConfig) -> Result<Self> {
        config.validate()?;
        let transport = Arc::new(
            HttpTransport::new(config.search.endpoint.clone(), config.search.timeout())
                .with_max_response_bytes(config.search.max_response_bytes),
        );
        Self::with_transport(config, transport)
    }

    /// Build from `config` over an arbitrary transport
    pub fn with_transport(config: CairnConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Self::build(config, transport, None)
    }

    /// Like [`Cairn::with_transport`], with a custom authorizer for schema changes
    pub fn with_authorizer(
        config: CairnConfig,
        transport: Arc<dyn Transport>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Result<Self> {
        Self::build(config, transport, Some(authorizer))
    }

    fn build(
        config: CairnConfig,
        transport: Arc<dyn Transport>,
        authorizer: Option<Arc<dyn Authorizer>>,
    ) -> Result<Self> {
        config.validate()?;

        let store: Arc<dyn SchemaStore> = match &config.schema.path {
            Some(path) => Arc::new(FileSchemaStore::new(path.clone())),
            None => Arc::new(InMemorySchemaStore::default()),
        };
        let migrator = Arc::new(IndexMigrator::new(Arc::clone(&transport)));

        let mut manager = SchemaManager::open(&config.schema, store, migrator)?;
        if let Some(authorizer) = authorizer {
            manager = manager.with_authorizer(authorizer);
        }
        let schema = Arc::new(manager);

        let repo = VectorRepo::with_transport(&config.search, schema.clone(), transport);

        info!(
            target: "cairn::schema",
            classes = schema.class_count(),
            endpoint = %config.search.endpoint,
            persisted = config.schema.path.is_some(),
            "Cairn opened"
        );

        Ok(Cairn {
            schema,
            repo,
            config,
        })
    }

    /// Schema manager
    pub fn schema(&self) -> &SchemaManager {
        &self.schema
    }

    /// Search repository
    pub fn repo(&self) -> &VectorRepo {
        &self.repo
    }

    /// Effective configuration
    pub fn config(&self) -> &CairnConfig {
        &self.config
    }

    /// Schema file, if the schema is persisted
    pub fn schema_path(&self) -> Option<&PathBuf> {
        self.config.schema.path.as_ref()
    }

    /// Add a Thing class
    pub fn add_thing(&self, ctx: &Context, principal: Option<&Principal>, class: Class) -> Result<()> {
        self.schema.add_thing(ctx, principal, class)
    }

    /// Add an Action class
    pub fn add_action(&self, ctx: &Context, principal: Option<&Principal>, class: Class) -> Result<()> {
        self.schema.add_action(ctx, principal, class)
    }

    /// Filtered search within one class
    pub fn class_search(
        &self,
        ctx: &Context,
        kind: Kind,
        class_name: &str,
        limit: Option<usize>,
        filter: Option<&Filter>,
    ) -> Result<Vec<VectorSearchResult>> {
        self.repo.class_search(ctx, kind, class_name, limit, filter)
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
        self.repo
            .vector_class_search(ctx, kind, class_name, vector, limit, filter)
    }

    /// Similarity search across every class
    pub fn vector_search(
        &self,
        ctx: &Context,
        vector: &[f32],
        limit: Option<usize>,
        filter: Option<&Filter>,
    ) -> Result<Vec<VectorSearchResult>> {
        self.repo.vector_search(ctx, vector, limit, filter)
    }
}
