use crate::core::types::{DomainTag, LevelTag, Record, RecordId, RecordParts};

#[allow(clippy::too_many_arguments)]
pub fn record(
    id: &str,
    name: &str,
    issuer: &str,
    domain: &str,
    level: LevelTag,
    rating: f64,
    cost: f64,
    skills: &[&str],
    rank: Option<u32>,
) -> Record {
    Record::new(RecordParts {
        identifier: RecordId::new(id),
        display_name: name.to_string(),
        issuer_name: issuer.to_string(),
        domain_tag: DomainTag::from_label(domain),
        level_tag: level,
        numeric_rating: rating,
        price_amount: cost,
        price_currency: "USD".to_string(),
        skill_tags: skills.iter().map(|s| s.to_string()).collect(),
        rank_position: rank,
    })
}
