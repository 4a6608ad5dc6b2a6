use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use chrono::{DateTime, Utc};
use roaring::RoaringBitmap;
use crate::core::types::{DomainTag, LevelTag, Record, RecordId, RecordSet};
use crate::search::fuzzy::FuzzyIndex;

/// Immutable secondary indexes over one record set. Positions are indices
/// into the record set, so ascending bitmap iteration is record order.
pub struct SearchIndex {
    pub(crate) records: RecordSet,
    pub(crate) by_id: HashMap<RecordId, u32>,
    pub(crate) by_domain: HashMap<DomainTag, RoaringBitmap>,
    pub(crate) by_issuer: HashMap<String, RoaringBitmap>,
    pub(crate) by_level: HashMap<LevelTag, RoaringBitmap>,
    pub(crate) by_skill: HashMap<String, BTreeSet<RecordId>>,
    pub(crate) fuzzy: FuzzyIndex,
    pub(crate) built_at: DateTime<Utc>,
}

impl SearchIndex {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The record set this index was built from
    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    /// True if this index was built from exactly `records` (same allocation)
    pub fn is_built_from(&self, records: &RecordSet) -> bool {
        Arc::ptr_eq(&self.records, records)
    }

    pub fn record_at(&self, position: u32) -> &Arc<Record> {
        &self.records[position as usize]
    }

    pub fn position_of(&self, id: &RecordId) -> Option<u32> {
        self.by_id.get(id).copied()
    }

    pub fn get(&self, id: &RecordId) -> Option<&Arc<Record>> {
        self.position_of(id).map(|pos| self.record_at(pos))
    }

    /// Full position range, for steps that start from the whole set
    pub fn all_positions(&self) -> RoaringBitmap {
        let mut all = RoaringBitmap::new();
        all.insert_range(0..self.records.len() as u32);
        all
    }

    pub fn domain_bucket(&self, domain: &DomainTag) -> Option<&RoaringBitmap> {
        self.by_domain.get(domain)
    }

    /// Lookup by issuer slug
    pub fn issuer_bucket(&self, issuer_key: &str) -> Option<&RoaringBitmap> {
        self.by_issuer.get(issuer_key)
    }

    pub fn level_bucket(&self, level: LevelTag) -> Option<&RoaringBitmap> {
        self.by_level.get(&level)
    }

    /// Records carrying `skill`, compared case-insensitively
    pub fn skill_records(&self, skill: &str) -> Option<&BTreeSet<RecordId>> {
        self.by_skill.get(&skill.to_lowercase())
    }

    /// Skill postings resolved to positions
    pub fn skill_bucket(&self, skill: &str) -> RoaringBitmap {
        self.skill_records(skill)
            .map(|ids| ids.iter().filter_map(|id| self.position_of(id)).collect())
            .unwrap_or_default()
    }

    pub fn domains(&self) -> impl Iterator<Item = (&DomainTag, u64)> {
        self.by_domain.iter().map(|(tag, bucket)| (tag, bucket.len()))
    }

    pub fn levels(&self) -> impl Iterator<Item = (LevelTag, u64)> + '_ {
        self.by_level.iter().map(|(level, bucket)| (*level, bucket.len()))
    }

    pub fn issuer_count(&self) -> usize {
        self.by_issuer.len()
    }

    pub fn skill_count(&self) -> usize {
        self.by_skill.len()
    }

    pub fn fuzzy(&self) -> &FuzzyIndex {
        &self.fuzzy
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}

impl std::fmt::Debug for SearchIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchIndex")
            .field("records", &self.records.len())
            .field("domains", &self.by_domain.len())
            .field("issuers", &self.by_issuer.len())
            .field("skills", &self.by_skill.len())
            .field("terms", &self.fuzzy.term_count())
            .field("built_at", &self.built_at)
            .finish()
    }
}
