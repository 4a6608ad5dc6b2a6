pub mod search_index;
pub mod builder;

pub use builder::IndexBuilder;
pub use search_index::SearchIndex;
