use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use crate::core::error::{Error, ErrorKind, Result};

/// One partition of the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShardEntry {
    /// Shard key, e.g. a first letter ("a", "0-9") or a domain slug
    #[serde(alias = "letters")]
    pub key: String,
    /// File reference as published, e.g. "/data/certifications/a.json"
    pub file: String,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub size_bytes: u64,
}

/// Describes how the dataset is partitioned. Loaded once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
    pub shards: Vec<ShardEntry>,
    /// Optional precomputed JSONL search file
    #[serde(default)]
    pub search_index: Option<String>,
}

impl Manifest {
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).map_err(|e| {
            Error::new(ErrorKind::ManifestUnavailable, format!("Malformed manifest: {}", e))
        })
    }

    pub fn total_records(&self) -> usize {
        self.shards.iter().map(|s| s.count).sum()
    }

    pub fn total_size_bytes(&self) -> u64 {
        self.shards.iter().map(|s| s.size_bytes).sum()
    }

    /// Shards ordered for a single-identifier scan: the shard whose key matches
    /// the identifier's first character comes first, the rest keep manifest order
    pub fn scan_order(&self, identifier: &str) -> Vec<&ShardEntry> {
        let hint = self.shard_hint(identifier);
        let mut ordered: Vec<&ShardEntry> = Vec::with_capacity(self.shards.len());
        ordered.extend(hint);
        ordered.extend(self.shards.iter().filter(|s| !hint.is_some_and(|h| std::ptr::eq(h, *s))));
        ordered
    }

    /// Shard a first-letter partitioning would have placed the identifier in
    pub fn shard_hint(&self, identifier: &str) -> Option<&ShardEntry> {
        let first = identifier.chars().next()?.to_ascii_lowercase();
        let key = if first.is_ascii_digit() {
            "0-9".to_string()
        } else {
            first.to_string()
        };
        self.shards.iter().find(|s| s.key.eq_ignore_ascii_case(&key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIPELINE_MAP: &str = r#"{
        "shards": [
            { "file": "/data/certifications/0-9.json", "letters": "0-9", "count": 2, "size_bytes": 900 },
            { "file": "/data/certifications/a.json", "letters": "a", "count": 10, "size_bytes": 4000 },
            { "file": "/data/certifications/c.json", "letters": "c", "count": 5, "size_bytes": 2100 }
        ],
        "deprecated_files": ["/data/certifications/index.json"]
    }"#;

    #[test]
    fn parses_pipeline_shard_map() {
        let manifest = Manifest::from_slice(PIPELINE_MAP.as_bytes()).unwrap();
        assert_eq!(manifest.shards.len(), 3);
        assert_eq!(manifest.shards[1].key, "a");
        assert_eq!(manifest.total_records(), 17);
        assert_eq!(manifest.total_size_bytes(), 7000);
        assert!(manifest.search_index.is_none());
    }

    #[test]
    fn malformed_payload_is_manifest_unavailable() {
        let err = Manifest::from_slice(b"<html>502</html>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ManifestUnavailable);

        let err = Manifest::from_slice(br#"{ "files": {} }"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ManifestUnavailable);
    }

    #[test]
    fn scan_order_puts_hinted_shard_first() {
        let manifest = Manifest::from_slice(PIPELINE_MAP.as_bytes()).unwrap();
        let keys: Vec<&str> = manifest.scan_order("comptia-security-plus")
            .iter()
            .map(|s| s.key.as_str())
            .collect();
        assert_eq!(keys, vec!["c", "0-9", "a"]);

        assert_eq!(manifest.shard_hint("7-habits").unwrap().key, "0-9");
        assert!(manifest.shard_hint("zeta").is_none());
        assert_eq!(manifest.scan_order("zeta").len(), 3);
    }
}
