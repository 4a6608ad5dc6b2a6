use std::collections::{BTreeSet, HashMap};
use std::time::Instant;
use chrono::Utc;
use roaring::RoaringBitmap;
use tracing::{debug, info};
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{RecordId, RecordSet};
use crate::index::search_index::SearchIndex;
use crate::search::fuzzy::{FuzzyConfig, FuzzyIndex};

/// Builds a `SearchIndex` from a loaded record set
#[derive(Debug, Clone, Default)]
pub struct IndexBuilder {
    fuzzy: FuzzyConfig,
}

impl IndexBuilder {
    pub fn new(fuzzy: FuzzyConfig) -> Self {
        IndexBuilder { fuzzy }
    }

    pub fn from_config(config: &Config) -> Self {
        IndexBuilder::new(FuzzyConfig::from_config(config))
    }

    pub fn build(&self, records: RecordSet) -> Result<SearchIndex> {
        let start = Instant::now();
        if records.len() > u32::MAX as usize {
            return Err(Error::new(
                ErrorKind::Internal,
                format!("{} records exceed the addressable position range", records.len()),
            ));
        }

        let mut by_id = HashMap::with_capacity(records.len());
        let mut by_domain: HashMap<_, RoaringBitmap> = HashMap::new();
        let mut by_issuer: HashMap<String, RoaringBitmap> = HashMap::new();
        let mut by_level: HashMap<_, RoaringBitmap> = HashMap::new();
        let mut by_skill: HashMap<String, BTreeSet<RecordId>> = HashMap::new();

        for (position, record) in records.iter().enumerate() {
            let position = position as u32;
            by_id.entry(record.identifier.clone()).or_insert(position);

            if !record.domain_tag.as_str().is_empty() {
                by_domain.entry(record.domain_tag.clone()).or_default().insert(position);
            }
            if !record.issuer_key().is_empty() {
                by_issuer.entry(record.issuer_key().to_string()).or_default().insert(position);
            }
            by_level.entry(record.level_tag).or_default().insert(position);

            for skill in &record.skill_tags {
                let key = skill.trim().to_lowercase();
                if !key.is_empty() {
                    by_skill.entry(key).or_default().insert(record.identifier.clone());
                }
            }
        }

        let fuzzy = FuzzyIndex::build(records.iter().map(|r| r.search_text()), self.fuzzy.clone())?;
        debug!(terms = fuzzy.term_count(), "Built fuzzy term dictionary");

        let index = SearchIndex {
            records,
            by_id,
            by_domain,
            by_issuer,
            by_level,
            by_skill,
            fuzzy,
            built_at: Utc::now(),
        };

        info!(
            records = index.len(),
            domains = index.by_domain.len(),
            issuers = index.by_issuer.len(),
            skills = index.by_skill.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Search index built"
        );
        Ok(index)
    }
}
