pub mod types;
pub mod planner;

pub use planner::{PlanStep, QueryPlan, QueryPlanner};
pub use types::{Filters, SortKey, SortOrder, SortSpec};
