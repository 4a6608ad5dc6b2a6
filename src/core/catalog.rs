use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use crate::cache::layer::CacheLayer;
use crate::cache::ttl::CacheStats;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::stats::CatalogStats;
use crate::core::types::{Record, RecordId, RecordSet};
use crate::index::builder::IndexBuilder;
use crate::index::search_index::SearchIndex;
use crate::loader::cancel::LoadOptions;
use crate::loader::manifest::Manifest;
use crate::loader::shard_loader::ShardLoader;
use crate::loader::source::{FsSource, ShardSource};
use crate::query::planner::QueryPlanner;
use crate::query::types::{Filters, SortSpec};
use crate::search::executor::QueryEngine;
use crate::search::fuzzy::FuzzyConfig;
use crate::search::results::{QueryResult, Suggestion};
use crate::search::suggest::{suggest_from_index, SuggestIndex};

/// Read-only certification catalog: loads shards on demand, caches them
/// and answers filtered, sorted, paginated queries
pub struct Catalog {
    config: Config,

    loader: ShardLoader,
    cache: CacheLayer,

    builder: IndexBuilder,
    engine: QueryEngine,
}

impl Catalog {
    pub fn new(source: Arc<dyn ShardSource>, config: Config) -> Result<Self> {
        config.validate()?;

        info!(
            source = source.name(),
            manifest = %config.manifest_path,
            cache_ttl_secs = config.cache_ttl_secs,
            "opening catalog"
        );

        Ok(Catalog {
            loader: ShardLoader::new(source, &config),
            cache: CacheLayer::new(&config),
            builder: IndexBuilder::from_config(&config),
            engine: QueryEngine::new(),
            config,
        })
    }

    /// Catalog over files below `root`
    pub fn open_dir(root: impl Into<PathBuf>, config: Config) -> Result<Self> {
        Catalog::new(Arc::new(FsSource::new(root)), config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Options applied by the methods without a `_with` suffix
    pub fn default_options(&self) -> LoadOptions {
        LoadOptions {
            timeout: self.config.fetch_timeout(),
            cancel: None,
        }
    }

    pub async fn load_manifest(&self) -> Result<Arc<Manifest>> {
        self.load_manifest_with(&self.default_options()).await
    }

    pub async fn load_manifest_with(&self, options: &LoadOptions) -> Result<Arc<Manifest>> {
        self.cache
            .manifest(|| async { self.loader.load_manifest(options).await.map(Arc::new) })
            .await
    }

    pub async fn load_all_records(&self) -> Result<RecordSet> {
        self.load_all_records_with(&self.default_options()).await
    }

    pub async fn load_all_records_with(&self, options: &LoadOptions) -> Result<RecordSet> {
        let manifest = self.load_manifest_with(options).await?;
        self.cache
            .records(|| async { self.loader.load_all_records(&manifest, options).await.map(Arc::new) })
            .await
    }

    pub async fn get_or_build_index(&self) -> Result<Arc<SearchIndex>> {
        self.get_or_build_index_with(&self.default_options()).await
    }

    /// Index over the current record set; rebuilt only when the record set
    /// itself was reloaded
    pub async fn get_or_build_index_with(&self, options: &LoadOptions) -> Result<Arc<SearchIndex>> {
        let records = self.load_all_records_with(options).await?;
        self.cache.index_for(&records, |records| self.builder.build(records))
    }

    pub async fn search(
        &self,
        filters: &Filters,
        sort: Option<SortSpec>,
        page: usize,
        page_size: usize,
    ) -> Result<QueryResult> {
        self.search_with(filters, sort, page, page_size, &self.default_options()).await
    }

    pub async fn search_with(
        &self,
        filters: &Filters,
        sort: Option<SortSpec>,
        page: usize,
        page_size: usize,
        options: &LoadOptions,
    ) -> Result<QueryResult> {
        // Reject bad requests before touching the source
        QueryPlanner::plan(filters, sort, page, page_size)?;
        let index = self.get_or_build_index_with(options).await?;
        self.engine.search(&index, filters, sort, page, page_size)
    }

    pub async fn get_by_identifier(&self, id: &RecordId) -> Result<Option<Arc<Record>>> {
        self.get_by_identifier_with(id, &self.default_options()).await
    }

    /// Resident index first, then a full load for small catalogs, otherwise a
    /// shard-by-shard scan whose hit is cached on its own
    pub async fn get_by_identifier_with(
        &self,
        id: &RecordId,
        options: &LoadOptions,
    ) -> Result<Option<Arc<Record>>> {
        if let Some(index) = self.cache.index() {
            return Ok(index.get(id).cloned());
        }
        if let Some(records) = self.cache.cached_records() {
            return Ok(records.iter().find(|r| &r.identifier == id).cloned());
        }

        let manifest = self.load_manifest_with(options).await?;
        if manifest.total_size_bytes() <= self.config.eager_load_max_bytes {
            debug!(id = %id, size_bytes = manifest.total_size_bytes(), "small catalog, loading all shards");
            let index = self.get_or_build_index_with(options).await?;
            return Ok(index.get(id).cloned());
        }

        debug!(id = %id, "scanning shards for single record");
        self.cache
            .record(id, || async {
                let found = self.loader.load_record_by_identifier(&manifest, id, options).await?;
                Ok(found.map(Arc::new))
            })
            .await
    }

    pub async fn stats(&self) -> Result<Arc<CatalogStats>> {
        self.stats_with(&self.default_options()).await
    }

    pub async fn stats_with(&self, options: &LoadOptions) -> Result<Arc<CatalogStats>> {
        let index = self.get_or_build_index_with(options).await?;
        self.cache.stats_for(&index, CatalogStats::from_index)
    }

    pub async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<Suggestion>> {
        self.suggest_with(query, limit, &self.default_options()).await
    }

    /// Typeahead over the published search file, or over the full index when
    /// the catalog has none
    pub async fn suggest_with(
        &self,
        query: &str,
        limit: usize,
        options: &LoadOptions,
    ) -> Result<Vec<Suggestion>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let manifest = self.load_manifest_with(options).await?;
        let suggest_index = self
            .cache
            .search_entries(|| async {
                match self.loader.load_search_entries(&manifest, options).await? {
                    Some(entries) => {
                        let index = SuggestIndex::build(entries, FuzzyConfig::from_config(&self.config))?;
                        Ok(Some(Arc::new(index)))
                    }
                    None => Ok(None),
                }
            })
            .await?;

        match suggest_index {
            Some(index) => Ok(index.suggest(query, limit)),
            None => {
                let index = self.get_or_build_index_with(options).await?;
                Ok(suggest_from_index(&index, query, limit))
            }
        }
    }

    /// Clears every cache, forcing a reload and rebuild on next access
    pub fn invalidate_cache(&self) {
        self.cache.invalidate_all();
        info!("catalog cache invalidated");
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats_snapshot()
    }
}
