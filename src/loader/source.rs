use std::collections::HashMap;
use std::path::PathBuf;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use crate::core::error::{Error, ErrorKind, Result};

/// Where manifest, shard and search-index bytes come from.
///
/// Retry and transport policy belong to implementations; the loader calls
/// `fetch` once per file and never retries.
#[async_trait]
pub trait ShardSource: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<Bytes>;

    fn name(&self) -> &str;
}

/// Reads files below a root directory
pub struct FsSource {
    pub root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsSource { root: root.into() }
    }
}

#[async_trait]
impl ShardSource for FsSource {
    async fn fetch(&self, path: &str) -> Result<Bytes> {
        let full = self.root.join(path.trim_start_matches('/'));
        let data = tokio::fs::read(&full).await.map_err(|e| {
            Error::new(ErrorKind::Io, format!("{}: {}", full.display(), e))
        })?;
        Ok(Bytes::from(data))
    }

    fn name(&self) -> &str {
        "fs"
    }
}

/// In-memory files, for embedded datasets and tests
#[derive(Default)]
pub struct MemorySource {
    files: RwLock<HashMap<String, Bytes>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: &str, data: impl Into<Bytes>) {
        self.files.write().insert(path.trim_start_matches('/').to_string(), data.into());
    }

    pub fn with_file(self, path: &str, data: impl Into<Bytes>) -> Self {
        self.insert(path, data);
        self
    }

    pub fn remove(&self, path: &str) {
        self.files.write().remove(path.trim_start_matches('/'));
    }
}

#[async_trait]
impl ShardSource for MemorySource {
    async fn fetch(&self, path: &str) -> Result<Bytes> {
        self.files
            .read()
            .get(path.trim_start_matches('/'))
            .cloned()
            .ok_or_else(|| Error::new(ErrorKind::Io, format!("{}: not found", path)))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fs_source_reads_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("certifications")).unwrap();
        std::fs::write(dir.path().join("certifications/a.json"), b"[]").unwrap();

        let source = FsSource::new(dir.path());
        let data = source.fetch("/certifications/a.json").await.unwrap();
        assert_eq!(&data[..], b"[]");

        let err = source.fetch("certifications/missing.json").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
    }

    #[tokio::test]
    async fn memory_source_round_trips_and_removes() {
        let source = MemorySource::new().with_file("x.json", "{}");
        assert_eq!(&source.fetch("/x.json").await.unwrap()[..], b"{}");
        source.remove("x.json");
        assert!(source.fetch("x.json").await.is_err());
    }
}
