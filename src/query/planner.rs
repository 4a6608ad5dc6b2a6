use crate::analysis::slug::slugify;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{DomainTag, LevelTag};
use crate::query::types::{Filters, SortSpec};

/// One step of an execution plan. Seeks narrow through an index bucket,
/// the rest scan what earlier steps left.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanStep {
    DomainSeek(DomainTag),
    /// Issuer slug
    IssuerSeek(String),
    LevelSeek(LevelTag),
    /// Lowercased skill
    SkillSeek(String),
    MinRating(f64),
    MaxCost(f64),
    TextMatch(String),
    Sort(SortSpec),
}

impl PlanStep {
    pub fn is_seek(&self) -> bool {
        matches!(
            self,
            PlanStep::DomainSeek(_) | PlanStep::IssuerSeek(_) | PlanStep::LevelSeek(_) | PlanStep::SkillSeek(_)
        )
    }
}

/// Validated request: ordered steps plus the page window
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub steps: Vec<PlanStep>,
    pub page: usize,
    pub page_size: usize,
}

/// Query planner validates requests and creates execution plans
pub struct QueryPlanner;

impl QueryPlanner {
    /// Step order: domain, issuer, level, skill seeks, then rating, cost,
    /// free text and finally sort
    pub fn plan(
        filters: &Filters,
        sort: Option<SortSpec>,
        page: usize,
        page_size: usize,
    ) -> Result<QueryPlan> {
        if page_size == 0 {
            return Err(Error::new(ErrorKind::InvalidPageSize, "page_size must be positive"));
        }
        if page == 0 {
            return Err(invalid("page is 1-indexed, got 0".to_string()));
        }

        let mut steps = Vec::new();

        if let Some(domain) = &filters.domain {
            let tag = DomainTag::from_label(domain);
            if tag.as_str().is_empty() {
                return Err(invalid(format!("domain '{}' is blank", domain)));
            }
            steps.push(PlanStep::DomainSeek(tag));
        }

        if let Some(issuer) = &filters.issuer {
            let key = slugify(issuer);
            if key.is_empty() {
                return Err(invalid(format!("issuer '{}' is blank", issuer)));
            }
            steps.push(PlanStep::IssuerSeek(key));
        }

        if let Some(level) = &filters.level {
            steps.push(PlanStep::LevelSeek(level.parse()?));
        }

        if let Some(skill) = &filters.skill {
            let key = skill.trim().to_lowercase();
            if key.is_empty() {
                return Err(invalid("skill is blank".to_string()));
            }
            steps.push(PlanStep::SkillSeek(key));
        }

        if let Some(min) = filters.min_rating {
            if !min.is_finite() || !(0.0..=5.0).contains(&min) {
                return Err(invalid(format!("min_rating {} outside [0, 5]", min)));
            }
            steps.push(PlanStep::MinRating(min));
        }

        if let Some(max) = filters.max_cost {
            if !max.is_finite() || max < 0.0 {
                return Err(invalid(format!("max_cost {} must be a non-negative amount", max)));
            }
            steps.push(PlanStep::MaxCost(max));
        }

        if let Some(query) = &filters.query {
            if !query.trim().is_empty() {
                steps.push(PlanStep::TextMatch(query.clone()));
            }
        }

        if let Some(spec) = sort {
            steps.push(PlanStep::Sort(spec));
        }

        Ok(QueryPlan { steps, page, page_size })
    }
}

fn invalid(context: String) -> Error {
    Error::new(ErrorKind::InvalidFilterValue, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::types::SortKey;

    #[test]
    fn steps_follow_filter_order() {
        let filters = Filters::new()
            .query("cloud")
            .max_cost(300.0)
            .min_rating(4.0)
            .skill(" Kubernetes ")
            .level("professional")
            .issuer("Amazon Web Services (AWS)")
            .domain("CS/IT");
        let plan = QueryPlanner::plan(&filters, Some(SortSpec::asc(SortKey::Cost)), 1, 20).unwrap();

        assert_eq!(plan.steps, vec![
            PlanStep::DomainSeek(DomainTag::from_label("cs-it")),
            PlanStep::IssuerSeek("amazon-web-services-aws".to_string()),
            PlanStep::LevelSeek(LevelTag::Professional),
            PlanStep::SkillSeek("kubernetes".to_string()),
            PlanStep::MinRating(4.0),
            PlanStep::MaxCost(300.0),
            PlanStep::TextMatch("cloud".to_string()),
            PlanStep::Sort(SortSpec::asc(SortKey::Cost)),
        ]);
        assert!(plan.steps[..4].iter().all(PlanStep::is_seek));
    }

    #[test]
    fn empty_filters_give_empty_plan() {
        let plan = QueryPlanner::plan(&Filters::default(), None, 3, 10).unwrap();
        assert!(plan.steps.is_empty());
        assert_eq!((plan.page, plan.page_size), (3, 10));
    }

    #[test]
    fn zero_page_size_is_invalid_page_size() {
        let err = QueryPlanner::plan(&Filters::default(), None, 1, 0).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPageSize);
    }

    #[test]
    fn contract_violations_are_invalid_filter_values() {
        let cases = vec![
            Filters::new().min_rating(5.5),
            Filters::new().min_rating(f64::NAN),
            Filters::new().max_cost(-1.0),
            Filters::new().level("wizard"),
            Filters::new().domain(" / "),
            Filters::new().skill("  "),
        ];
        for filters in cases {
            let err = QueryPlanner::plan(&filters, None, 1, 10).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidFilterValue, "{:?}", filters);
        }
        let err = QueryPlanner::plan(&Filters::default(), None, 0, 10).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidFilterValue);
    }

    #[test]
    fn blank_query_adds_no_step() {
        let plan = QueryPlanner::plan(&Filters::new().query("   "), None, 1, 10).unwrap();
        assert!(plan.steps.is_empty());
    }
}
