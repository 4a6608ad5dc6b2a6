pub mod ttl;
pub mod layer;

pub use layer::{CacheKey, CacheLayer, CachedValue};
pub use ttl::{CacheStats, TtlCache};
