pub mod fuzzy;
pub mod results;
pub mod executor;
pub mod suggest;

pub use executor::QueryEngine;
pub use results::{QueryResult, Suggestion};
