use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use futures::future::join_all;
use tracing::{debug, info, warn};
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{Record, RecordId};
use crate::loader::cancel::LoadOptions;
use crate::loader::manifest::{Manifest, ShardEntry};
use crate::loader::record::{normalize, RawRecord, SearchEntry};
use crate::loader::source::ShardSource;

/// Loads the manifest, shards and search file from a [`ShardSource`]
pub struct ShardLoader {
    source: Arc<dyn ShardSource>,
    manifest_path: String,
    path_prefix: String,
}

impl ShardLoader {
    pub fn new(source: Arc<dyn ShardSource>, config: &Config) -> Self {
        ShardLoader {
            source,
            manifest_path: config.manifest_path.clone(),
            path_prefix: config.path_prefix.clone(),
        }
    }

    /// Maps a published file reference onto a source path
    pub fn resolve(&self, file: &str) -> String {
        let stripped = if self.path_prefix.is_empty() {
            file
        } else {
            file.strip_prefix(self.path_prefix.as_str()).unwrap_or(file)
        };
        stripped.trim_start_matches('/').to_string()
    }

    /// Fetches and parses the manifest. Any failure is `ManifestUnavailable`
    /// except an abort, which is `LoadCancelled`.
    pub async fn load_manifest(&self, options: &LoadOptions) -> Result<Manifest> {
        let path = self.manifest_path.as_str();
        options.guard("manifest load", async {
            let data = self.source.fetch(path).await.map_err(|e| {
                Error::new(ErrorKind::ManifestUnavailable, format!("{}: {}", path, e.context))
            })?;
            let manifest = Manifest::from_slice(&data)?;
            debug!(source = self.source.name(), shards = manifest.shards.len(), "manifest loaded");
            Ok(manifest)
        }).await
    }

    /// Loads one shard. Fetch or top-level parse failures are `ShardLoadFailed`;
    /// individual records breaking the normalization contract are skipped.
    pub async fn load_shard(&self, entry: &ShardEntry) -> Result<Vec<Record>> {
        let path = self.resolve(&entry.file);
        let data = self.source.fetch(&path).await.map_err(|e| {
            Error::new(ErrorKind::ShardLoadFailed, format!("shard '{}': {}", entry.key, e.context))
        })?;

        let values: Vec<serde_json::Value> = serde_json::from_slice(&data).map_err(|e| {
            Error::new(ErrorKind::ShardLoadFailed, format!("shard '{}': {}", entry.key, e))
        })?;

        let mut records = Vec::with_capacity(values.len());
        for value in values {
            let parsed = serde_json::from_value::<RawRecord>(value)
                .map_err(Error::from)
                .and_then(|raw| normalize(&raw));
            match parsed {
                Ok(record) => records.push(record),
                Err(e) => warn!(shard = %entry.key, error = %e, "skipping record"),
            }
        }

        debug!(shard = %entry.key, records = records.len(), "shard loaded");
        Ok(records)
    }

    /// Loads every shard concurrently and flattens them in manifest order.
    /// A failed shard is logged and contributes nothing; identifiers already
    /// seen in an earlier shard are dropped.
    pub async fn load_all_records(
        &self,
        manifest: &Manifest,
        options: &LoadOptions,
    ) -> Result<Vec<Arc<Record>>> {
        options.guard("record load", async {
            let start = Instant::now();
            let results = join_all(manifest.shards.iter().map(|entry| self.load_shard(entry))).await;

            let mut seen: HashSet<RecordId> = HashSet::with_capacity(manifest.total_records());
            let mut records = Vec::with_capacity(manifest.total_records());
            let mut failed = 0usize;

            for (entry, result) in manifest.shards.iter().zip(results) {
                match result {
                    Ok(shard) => {
                        for record in shard {
                            if seen.insert(record.identifier.clone()) {
                                records.push(Arc::new(record));
                            } else {
                                warn!(shard = %entry.key, id = %record.identifier, "duplicate identifier dropped");
                            }
                        }
                    }
                    Err(e) => {
                        failed += 1;
                        warn!(shard = %entry.key, error = %e, "shard unavailable, treating as empty");
                    }
                }
            }

            info!(
                records = records.len(),
                shards = manifest.shards.len(),
                failed_shards = failed,
                took_ms = start.elapsed().as_millis() as u64,
                "records loaded"
            );
            Ok(records)
        }).await
    }

    /// Scans shards one at a time, hinted shard first, keeping at most one
    /// shard in memory
    pub async fn load_record_by_identifier(
        &self,
        manifest: &Manifest,
        id: &RecordId,
        options: &LoadOptions,
    ) -> Result<Option<Record>> {
        options.guard("record lookup", async {
            for entry in manifest.scan_order(id.as_str()) {
                match self.load_shard(entry).await {
                    Ok(shard) => {
                        if let Some(record) = shard.into_iter().find(|r| &r.identifier == id) {
                            return Ok(Some(record));
                        }
                    }
                    Err(e) => warn!(shard = %entry.key, error = %e, "shard unavailable during lookup"),
                }
            }
            Ok(None)
        }).await
    }

    /// Reads the precomputed JSONL search file, if the manifest names one.
    /// The file is an optimization: when it cannot be read `None` is returned.
    pub async fn load_search_entries(
        &self,
        manifest: &Manifest,
        options: &LoadOptions,
    ) -> Result<Option<Vec<SearchEntry>>> {
        let Some(file) = manifest.search_index.as_deref() else {
            return Ok(None);
        };
        let path = self.resolve(file);

        options.guard("search index load", async {
            let data = match self.source.fetch(&path).await {
                Ok(data) => data,
                Err(e) => {
                    warn!(file = %path, error = %e, "search index unavailable");
                    return Ok(None);
                }
            };

            let text = String::from_utf8_lossy(&data);
            let mut entries = Vec::new();
            for (line_no, line) in text.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<SearchEntry>(line) {
                    Ok(entry) => entries.push(entry),
                    Err(e) => warn!(file = %path, line = line_no + 1, error = %e, "skipping search entry"),
                }
            }

            debug!(file = %path, entries = entries.len(), "search index loaded");
            Ok(Some(entries))
        }).await
    }
}
