use std::collections::BTreeSet;
use serde::{Serialize, Deserialize};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{DomainTag, LevelTag, Record, RecordId, RecordParts};

/// A shard element as published by the data pipeline.
///
/// Contract enforced by [`normalize`]:
/// - required, non-blank: `slug`, `name`, `issuer`, `domain`, `level`
/// - `level` must name one of the [`LevelTag`] variants (case-insensitive)
/// - `rating` defaults to 0.0 and is clamped into [0, 5]
/// - `cost` defaults to 0.0 and must be finite and non-negative; older shards
///   publish it as `exam_fee_usd`, which is used only when `cost` is absent
/// - `currency` defaults to "USD"; `skills` defaults to empty, also when null
/// - `rank` 0 means unranked; the generator publishes it as `ranking`, which is
///   used only when `rank` is absent
///
/// Unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub issuer: Option<String>,
    pub domain: Option<String>,
    pub level: Option<String>,
    pub rating: Option<f64>,
    pub cost: Option<f64>,
    pub exam_fee_usd: Option<f64>,
    pub currency: Option<String>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    pub rank: Option<u32>,
    pub ranking: Option<u32>,
}

fn required<'a>(value: &'a Option<String>, field: &str, slug: &str) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::new(
            ErrorKind::InvalidRecord,
            format!("record '{}' is missing required field '{}'", slug, field),
        )),
    }
}

/// Maps a raw record onto the canonical [`Record`] shape
pub fn normalize(raw: &RawRecord) -> Result<Record> {
    let slug = required(&raw.slug, "slug", "?")?;
    let name = required(&raw.name, "name", slug)?;
    let issuer = required(&raw.issuer, "issuer", slug)?;
    let domain = required(&raw.domain, "domain", slug)?;
    let level = required(&raw.level, "level", slug)?;

    let invalid = |msg: String| Error::new(ErrorKind::InvalidRecord, format!("record '{}': {}", slug, msg));

    let level_tag: LevelTag = level.parse().map_err(|_| invalid(format!("unknown level '{}'", level)))?;

    let domain_tag = DomainTag::from_label(domain);
    if domain_tag.as_str().is_empty() {
        return Err(invalid(format!("domain '{}' has no canonical form", domain)));
    }

    let numeric_rating = match raw.rating {
        None => 0.0,
        Some(r) if r.is_finite() => r.clamp(0.0, 5.0),
        Some(r) => return Err(invalid(format!("rating {} is not a number", r))),
    };

    let price_amount = match raw.cost.or(raw.exam_fee_usd) {
        None => 0.0,
        Some(c) if c.is_finite() && c >= 0.0 => c,
        Some(c) => return Err(invalid(format!("cost {} is not a non-negative amount", c))),
    };

    let price_currency = raw.currency
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("USD")
        .to_ascii_uppercase();

    let skill_tags: BTreeSet<String> = raw.skills
        .iter()
        .flatten()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    Ok(Record::new(RecordParts {
        identifier: RecordId::new(slug),
        display_name: name.to_string(),
        issuer_name: issuer.to_string(),
        domain_tag,
        level_tag,
        numeric_rating,
        price_amount,
        price_currency,
        skill_tags,
        rank_position: raw.rank.or(raw.ranking).filter(|r| *r > 0),
    }))
}

/// One line of the precomputed JSONL search file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchEntry {
    pub slug: String,
    /// Precomputed search text
    pub t: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub issuer: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub level: String,
}
