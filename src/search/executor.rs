use std::cmp::Ordering;
use std::time::Instant;
use roaring::RoaringBitmap;
use tracing::debug;
use crate::core::error::Result;
use crate::core::types::Record;
use crate::index::search_index::SearchIndex;
use crate::query::planner::{PlanStep, QueryPlan, QueryPlanner};
use crate::query::types::{Filters, SortKey, SortOrder, SortSpec};
use crate::search::results::QueryResult;

/// Candidate set while a plan runs: a bitmap during seeks, an ordered
/// position list once a scan or reorder step has run
enum Candidates {
    All,
    Set(RoaringBitmap),
    Ordered(Vec<u32>),
}

impl Candidates {
    fn narrow(self, bucket: &RoaringBitmap) -> Candidates {
        match self {
            Candidates::All => Candidates::Set(bucket.clone()),
            Candidates::Set(mut set) => {
                set &= bucket;
                Candidates::Set(set)
            }
            Candidates::Ordered(mut positions) => {
                positions.retain(|pos| bucket.contains(*pos));
                Candidates::Ordered(positions)
            }
        }
    }

    fn into_ordered(self, index: &SearchIndex) -> Vec<u32> {
        match self {
            Candidates::All => (0..index.len() as u32).collect(),
            Candidates::Set(set) => set.iter().collect(),
            Candidates::Ordered(positions) => positions,
        }
    }

    fn retain(self, index: &SearchIndex, keep: impl Fn(&Record) -> bool) -> Candidates {
        let mut positions = self.into_ordered(index);
        positions.retain(|pos| keep(index.record_at(*pos).as_ref()));
        Candidates::Ordered(positions)
    }
}

/// Runs validated plans against a `SearchIndex`. Stateless; every call
/// borrows the index read-only.
#[derive(Debug, Default, Clone, Copy)]
pub struct QueryEngine;

impl QueryEngine {
    pub fn new() -> Self {
        QueryEngine
    }

    pub fn search(
        &self,
        index: &SearchIndex,
        filters: &Filters,
        sort: Option<SortSpec>,
        page: usize,
        page_size: usize,
    ) -> Result<QueryResult> {
        let start = Instant::now();
        let plan = QueryPlanner::plan(filters, sort, page, page_size)?;

        let matched = self.execute_plan(index, &plan);
        let total_matched = matched.len();
        let window = QueryResult::page_window(total_matched, plan.page, plan.page_size);
        let items = matched[window].iter().map(|pos| index.record_at(*pos).clone()).collect();

        let took_ms = start.elapsed().as_millis() as u64;
        debug!(steps = plan.steps.len(), total_matched, page, took_ms, "Query executed");

        Ok(QueryResult {
            items,
            total_matched,
            page: plan.page,
            page_size: plan.page_size,
            total_pages: QueryResult::total_pages_for(total_matched, plan.page_size),
            took_ms,
        })
    }

    /// All matching positions in final order, before pagination
    pub fn execute_plan(&self, index: &SearchIndex, plan: &QueryPlan) -> Vec<u32> {
        let empty = RoaringBitmap::new();
        let mut candidates = Candidates::All;

        for step in &plan.steps {
            candidates = match step {
                PlanStep::DomainSeek(tag) => candidates.narrow(index.domain_bucket(tag).unwrap_or(&empty)),
                PlanStep::IssuerSeek(key) => candidates.narrow(index.issuer_bucket(key).unwrap_or(&empty)),
                PlanStep::LevelSeek(level) => candidates.narrow(index.level_bucket(*level).unwrap_or(&empty)),
                PlanStep::SkillSeek(skill) => candidates.narrow(&index.skill_bucket(skill)),
                PlanStep::MinRating(min) => candidates.retain(index, |r| r.numeric_rating >= *min),
                PlanStep::MaxCost(max) => candidates.retain(index, |r| r.price_amount <= *max),
                PlanStep::TextMatch(query) => match index.fuzzy().search(query) {
                    // Too short to filter
                    None => candidates,
                    Some(hits) => {
                        let allowed: RoaringBitmap = candidates.into_ordered(index).into_iter().collect();
                        Candidates::Ordered(
                            hits.into_iter()
                                .map(|hit| hit.position)
                                .filter(|pos| allowed.contains(*pos))
                                .collect(),
                        )
                    }
                },
                PlanStep::Sort(spec) => {
                    let mut positions = candidates.into_ordered(index);
                    positions.sort_by(|a, b| compare(index.record_at(*a), index.record_at(*b), spec));
                    Candidates::Ordered(positions)
                }
            };
        }

        candidates.into_ordered(index)
    }
}

/// Comparator for a sort spec; callers sort stably so ties keep prior order
pub fn compare(a: &Record, b: &Record, spec: &SortSpec) -> Ordering {
    let ordering = match spec.key {
        SortKey::Name => a.name_key().cmp(b.name_key()),
        SortKey::Rating => a.numeric_rating.total_cmp(&b.numeric_rating),
        SortKey::Cost => a.price_amount.total_cmp(&b.price_amount),
        // Unranked sorts after every rank
        SortKey::Rank => (a.rank_position.is_none(), a.rank_position)
            .cmp(&(b.rank_position.is_none(), b.rank_position)),
    };
    match spec.order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}
