use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::core::error::{Error, ErrorKind};

/// Sort order for query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,   // Ascending: 0 → 9, A → Z
    Desc,  // Descending: 9 → 0, Z → A
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    /// Case-insensitive display name
    Name,
    Rating,
    Cost,
    /// Rank position, unranked records count as +∞
    Rank,
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "rating" => Ok(SortKey::Rating),
            "cost" | "price" => Ok(SortKey::Cost),
            "rank" => Ok(SortKey::Rank),
            other => Err(Error::new(
                ErrorKind::InvalidFilterValue,
                format!("Unknown sort key '{}'", other),
            )),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            SortKey::Name => "name",
            SortKey::Rating => "rating",
            SortKey::Cost => "cost",
            SortKey::Rank => "rank",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn asc(key: SortKey) -> Self {
        SortSpec { key, order: SortOrder::Asc }
    }

    pub fn desc(key: SortKey) -> Self {
        SortSpec { key, order: SortOrder::Desc }
    }
}

/// Filter request. Absent fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    pub domain: Option<String>,
    pub issuer: Option<String>,
    pub level: Option<String>,
    pub skill: Option<String>,
    pub min_rating: Option<f64>,
    pub max_cost: Option<f64>,
    /// Free-text fuzzy query
    pub query: Option<String>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn skill(mut self, skill: impl Into<String>) -> Self {
        self.skill = Some(skill.into());
        self
    }

    pub fn min_rating(mut self, rating: f64) -> Self {
        self.min_rating = Some(rating);
        self
    }

    pub fn max_cost(mut self, cost: f64) -> Self {
        self.max_cost = Some(cost);
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Filters::default()
    }
}
