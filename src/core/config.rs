use std::time::Duration;
use serde::{Serialize, Deserialize};
use crate::core::error::{Error, ErrorKind, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Manifest location relative to the source root
    pub manifest_path: String,
    /// Public URL prefix stripped from manifest file references
    pub path_prefix: String,

    pub cache_ttl_secs: u64,                    // Reference: 5 minutes
    pub cache_max_entries: usize,               // Reference: 100 entries

    pub fuzzy_threshold: f64,                   // 0 = exact only, 1 = anything
    pub min_query_len: usize,

    /// Datasets at or below this size are loaded whole even for single lookups
    pub eager_load_max_bytes: u64,
    /// Default deadline for fetches; `None` waits indefinitely
    pub fetch_timeout_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            manifest_path: "certifications/index.map.json".to_string(),
            path_prefix: "/data/".to_string(),
            cache_ttl_secs: 300,
            cache_max_entries: 100,
            fuzzy_threshold: 0.3,
            min_query_len: 2,
            eager_load_max_bytes: 8 * 1024 * 1024,
            fetch_timeout_ms: None,
        }
    }
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)
            .map_err(|e| Error::new(ErrorKind::InvalidConfig, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            return Err(Error::new(
                ErrorKind::InvalidConfig,
                format!("fuzzy_threshold {} outside [0, 1]", self.fuzzy_threshold),
            ));
        }
        if self.cache_max_entries == 0 {
            return Err(Error::new(ErrorKind::InvalidConfig, "cache_max_entries must be positive"));
        }
        if self.min_query_len == 0 {
            return Err(Error::new(ErrorKind::InvalidConfig, "min_query_len must be positive"));
        }
        if self.manifest_path.trim().is_empty() {
            return Err(Error::new(ErrorKind::InvalidConfig, "manifest_path is empty"));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = Config::from_json_str(r#"{ "cache_ttl_secs": 60, "fetch_timeout_ms": 1500 }"#).unwrap();
        assert_eq!(config.cache_ttl(), Duration::from_secs(60));
        assert_eq!(config.fetch_timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(config.cache_max_entries, 100);
        assert_eq!(config.min_query_len, 2);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let err = Config::from_json_str(r#"{ "fuzzy_threshold": 1.5 }"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidConfig);
    }

    #[test]
    fn rejects_malformed_json() {
        let err = Config::from_json_str("{ nope").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidConfig);
    }

    #[test]
    fn default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }
}
