use serde::{Serialize, Deserialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use crate::analysis::analyzer::catalog_analyzer;
use crate::analysis::slug::slugify;
use crate::core::error::{Error, ErrorKind};

/// Stable record key, the data pipeline's `slug`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        RecordId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId(id.to_string())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical domain slug ("CS/IT" and "cs-it" are the same tag)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DomainTag(String);

impl DomainTag {
    pub fn from_label(label: &str) -> Self {
        DomainTag(slugify(label))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DomainTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LevelTag {
    Foundational,
    Associate,
    Professional,
    Specialty,
    Expert,
}

impl LevelTag {
    pub const ALL: [LevelTag; 5] = [
        LevelTag::Foundational,
        LevelTag::Associate,
        LevelTag::Professional,
        LevelTag::Specialty,
        LevelTag::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LevelTag::Foundational => "Foundational",
            LevelTag::Associate => "Associate",
            LevelTag::Professional => "Professional",
            LevelTag::Specialty => "Specialty",
            LevelTag::Expert => "Expert",
        }
    }
}

impl FromStr for LevelTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        LevelTag::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::new(
                ErrorKind::InvalidFilterValue,
                format!("Unknown level '{}'", s),
            ))
    }
}

impl fmt::Display for LevelTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owned inputs of a record, before derived fields are computed
#[derive(Debug, Clone)]
pub struct RecordParts {
    pub identifier: RecordId,
    pub display_name: String,
    pub issuer_name: String,
    pub domain_tag: DomainTag,
    pub level_tag: LevelTag,
    pub numeric_rating: f64,
    pub price_amount: f64,
    pub price_currency: String,
    pub skill_tags: BTreeSet<String>,
    pub rank_position: Option<u32>,
}

/// A certification entry. Shared as `Arc<Record>` and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub identifier: RecordId,
    pub display_name: String,
    pub issuer_name: String,
    pub domain_tag: DomainTag,
    pub level_tag: LevelTag,
    pub numeric_rating: f64,
    pub price_amount: f64,
    pub price_currency: String,
    pub skill_tags: BTreeSet<String>,
    pub rank_position: Option<u32>,

    #[serde(skip)]
    search_text: String,
    #[serde(skip)]
    name_key: String,
    #[serde(skip)]
    issuer_key: String,
}

impl Record {
    pub fn new(parts: RecordParts) -> Self {
        let analyzer = catalog_analyzer();

        let mut sources: Vec<&str> = vec![
            &parts.display_name,
            &parts.issuer_name,
            parts.domain_tag.as_str(),
            parts.level_tag.as_str(),
        ];
        sources.extend(parts.skill_tags.iter().map(String::as_str));
        let search_text = analyzer.search_text(&sources);

        Record {
            name_key: parts.display_name.to_lowercase(),
            issuer_key: slugify(&parts.issuer_name),
            search_text,
            identifier: parts.identifier,
            display_name: parts.display_name,
            issuer_name: parts.issuer_name,
            domain_tag: parts.domain_tag,
            level_tag: parts.level_tag,
            numeric_rating: parts.numeric_rating,
            price_amount: parts.price_amount,
            price_currency: parts.price_currency,
            skill_tags: parts.skill_tags,
            rank_position: parts.rank_position,
        }
    }

    /// Normalized text the fuzzy index is built from
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Lowercased display name used for name ordering
    pub fn name_key(&self) -> &str {
        &self.name_key
    }

    /// Slug of the issuer name used by the issuer index
    pub fn issuer_key(&self) -> &str {
        &self.issuer_key
    }
}

/// The full loaded record set, in load order
pub type RecordSet = Arc<Vec<Arc<Record>>>;
