use crate::analysis::analyzer::catalog_analyzer;
use crate::core::error::Result;
use crate::core::types::RecordId;
use crate::index::search_index::SearchIndex;
use crate::loader::record::SearchEntry;
use crate::search::fuzzy::{FuzzyConfig, FuzzyIndex};
use crate::search::results::Suggestion;

/// Typeahead over the precomputed search entries
pub struct SuggestIndex {
    entries: Vec<SearchEntry>,
    fuzzy: FuzzyIndex,
}

impl SuggestIndex {
    pub fn build(entries: Vec<SearchEntry>, config: FuzzyConfig) -> Result<Self> {
        let texts: Vec<String> = entries
            .iter()
            .map(|e| catalog_analyzer().search_text(&[&e.t, &e.name, &e.issuer, &e.domain, &e.level]))
            .collect();
        let fuzzy = FuzzyIndex::build(texts.iter().map(String::as_str), config)?;
        Ok(SuggestIndex { entries, fuzzy })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn suggest(&self, query: &str, limit: usize) -> Vec<Suggestion> {
        let Some(hits) = self.fuzzy.search(query) else {
            return Vec::new();
        };
        hits.into_iter()
            .take(limit)
            .map(|hit| {
                let entry = &self.entries[hit.position as usize];
                let display_name = if entry.name.is_empty() { entry.slug.clone() } else { entry.name.clone() };
                Suggestion {
                    identifier: RecordId::new(entry.slug.clone()),
                    display_name,
                    score: hit.score,
                }
            })
            .collect()
    }
}

/// Same typeahead answered from the full search index
pub fn suggest_from_index(index: &SearchIndex, query: &str, limit: usize) -> Vec<Suggestion> {
    let Some(hits) = index.fuzzy().search(query) else {
        return Vec::new();
    };
    hits.into_iter()
        .take(limit)
        .map(|hit| {
            let record = index.record_at(hit.position);
            Suggestion {
                identifier: record.identifier.clone(),
                display_name: record.display_name.clone(),
                score: hit.score,
            }
        })
        .collect()
}
