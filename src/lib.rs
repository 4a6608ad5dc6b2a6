pub mod core;
pub mod analysis;
pub mod loader;
pub mod index;
pub mod search;
pub mod query;
pub mod cache;

#[cfg(test)]
pub(crate) mod test_util;

pub use crate::core::catalog::Catalog;
pub use crate::core::config::Config;
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::stats::CatalogStats;
pub use crate::core::types::{DomainTag, LevelTag, Record, RecordId, RecordSet};
pub use crate::loader::cancel::{CancelToken, LoadOptions};
pub use crate::loader::source::{FsSource, MemorySource, ShardSource};
pub use crate::query::types::{Filters, SortKey, SortOrder, SortSpec};
pub use crate::search::results::{QueryResult, Suggestion};

/*
┌──────────────────────────────────── CERTDEX LAYOUT ────────────────────────────────────┐
│                                                                                        │
│  Catalog (core::catalog)                                                               │
│    config: Config                                                                      │
│    loader: ShardLoader ── Arc<dyn ShardSource>   FsSource | MemorySource | custom      │
│    cache:  CacheLayer                                                                  │
│              entries: TtlCache<CacheKey, CachedValue>   manifest, records, stats,      │
│                                                         search entries, single records │
│              index:   RwLock<Option<Arc<SearchIndex>>>  swapped whole on rebuild       │
│    builder: IndexBuilder                                                               │
│    engine:  QueryEngine (stateless)                                                    │
│                                                                                        │
│  load path                                                                             │
│    manifest.json ──► Manifest ──► join_all(shards) ──► RawRecord ──normalize──► Record │
│                                                         (bad shard / record skipped)   │
│                                                                                        │
│  SearchIndex                                                                           │
│    records: Arc<Vec<Arc<Record>>>                                                      │
│    by_id, by_domain, by_issuer, by_level   (RoaringBitmap of positions)                │
│    by_skill                                (skill → BTreeSet<RecordId>)                │
│    fuzzy: FuzzyIndex                       (fst::Map terms + Levenshtein DFA)          │
│                                                                                        │
│  query path                                                                            │
│    Filters + SortSpec + page ──► QueryPlanner ──► QueryPlan                            │
│      seeks: domain → issuer → level → skill                                            │
│      scans: min rating → max cost → text match → sort                                  │
│    QueryEngine ──► positions ──► page window ──► QueryResult                           │
│                                                                                        │
└────────────────────────────────────────────────────────────────────────────────────────┘
*/
