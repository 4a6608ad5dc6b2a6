#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::{json, Value};
use certdex::core::error::Result;
use certdex::{Catalog, Config, MemorySource, ShardSource};

pub const MANIFEST_PATH: &str = "certifications/index.map.json";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn raw(slug: &str, name: &str, domain: &str, rating: f64, cost: f64) -> Value {
    json!({
        "slug": slug,
        "name": name,
        "issuer": "Acme Certification Board",
        "domain": domain,
        "level": "Associate",
        "rating": rating,
        "cost": cost,
    })
}

/// Records a, b, c: a and c share domain "x"
pub fn scenario_records() -> Vec<Value> {
    vec![
        raw("a", "Alpha Cloud Engineer", "x", 4.5, 200.0),
        raw("b", "Beta Data Analyst", "y", 4.9, 100.0),
        raw("c", "Gamma Kubernetes Administrator", "x", 4.7, 300.0),
    ]
}

/// Manifest JSON for `(key, record count)` shards stored as `certifications/<key>.json`
pub fn manifest_json(shards: &[(&str, usize)], size_bytes: u64) -> String {
    let shards: Vec<Value> = shards
        .iter()
        .map(|(key, count)| json!({
            "key": key,
            "file": format!("/data/certifications/{}.json", key),
            "count": count,
            "size_bytes": size_bytes,
        }))
        .collect();
    json!({ "version": "test", "shards": shards }).to_string()
}

/// In-memory catalog data; every shard becomes a manifest entry
pub fn memory_source(shards: &[(&str, Vec<Value>)]) -> MemorySource {
    let entries: Vec<(&str, usize)> = shards.iter().map(|(k, r)| (*k, r.len())).collect();
    let source = MemorySource::new().with_file(MANIFEST_PATH, manifest_json(&entries, 256));
    for (key, records) in shards {
        source.insert(&format!("certifications/{}.json", key), Value::Array(records.clone()).to_string());
    }
    source
}

/// Writes the same layout to disk for `FsSource`
pub fn write_catalog(root: &Path, manifest: &str, shards: &[(&str, &str)]) {
    let dir = root.join("certifications");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index.map.json"), manifest).unwrap();
    for (key, body) in shards {
        std::fs::write(dir.join(format!("{}.json", key)), body).unwrap();
    }
}

pub fn scenario_catalog() -> Catalog {
    let source = memory_source(&[("a", scenario_records())]);
    Catalog::new(Arc::new(source), Config::default()).unwrap()
}

/// Counts fetches per path and optionally delays each one
pub struct CountingSource {
    inner: MemorySource,
    delay: Option<Duration>,
    fetches: Mutex<HashMap<String, usize>>,
}

impl CountingSource {
    pub fn new(inner: MemorySource) -> Self {
        CountingSource { inner, delay: None, fetches: Mutex::new(HashMap::new()) }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fetches(&self, path: &str) -> usize {
        self.fetches.lock().get(path).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.lock().values().sum()
    }
}

#[async_trait]
impl ShardSource for CountingSource {
    async fn fetch(&self, path: &str) -> Result<Bytes> {
        *self.fetches.lock().entry(path.to_string()).or_default() += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.fetch(path).await
    }

    fn name(&self) -> &str {
        "counting"
    }
}

pub fn ids(items: &[Arc<certdex::Record>]) -> Vec<String> {
    items.iter().map(|r| r.identifier.to_string()).collect()
}
