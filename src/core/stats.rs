use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::index::search_index::SearchIndex;

/// Aggregate figures over the loaded catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total_records: usize,
    /// Domain slug → record count
    pub by_domain: BTreeMap<String, usize>,
    /// Level name → record count
    pub by_level: BTreeMap<String, usize>,
    pub distinct_issuers: usize,
    pub distinct_skills: usize,

    pub average_rating: f64,    // 0 for an empty catalog
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,

    pub index_built_at: DateTime<Utc>,
}

impl CatalogStats {
    pub fn from_index(index: &SearchIndex) -> Self {
        let records = index.records();

        let mut rating_sum = 0.0;
        let mut min_price: Option<f64> = None;
        let mut max_price: Option<f64> = None;
        for record in records.iter() {
            rating_sum += record.numeric_rating;
            min_price = Some(min_price.map_or(record.price_amount, |p| p.min(record.price_amount)));
            max_price = Some(max_price.map_or(record.price_amount, |p| p.max(record.price_amount)));
        }

        CatalogStats {
            total_records: records.len(),
            by_domain: index
                .domains()
                .map(|(tag, count)| (tag.as_str().to_string(), count as usize))
                .collect(),
            by_level: index
                .levels()
                .map(|(level, count)| (level.as_str().to_string(), count as usize))
                .collect(),
            distinct_issuers: index.issuer_count(),
            distinct_skills: index.skill_count(),
            average_rating: if records.is_empty() { 0.0 } else { rating_sum / records.len() as f64 },
            min_price,
            max_price,
            index_built_at: index.built_at(),
        }
    }
}
