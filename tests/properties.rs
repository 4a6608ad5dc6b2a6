use std::collections::HashSet;
use std::sync::Arc;
use proptest::prelude::*;
use certdex::core::types::{DomainTag, LevelTag, Record, RecordId, RecordParts, RecordSet};
use certdex::index::builder::IndexBuilder;
use certdex::search::executor::QueryEngine;
use certdex::{Filters, SortKey, SortSpec};

const WORDS: [&str; 8] = ["cloud", "security", "network", "data", "agile", "linux", "azure", "analyst"];
const DOMAINS: [&str; 3] = ["cs-it", "business", "health"];

fn arb_record() -> impl Strategy<Value = (Vec<usize>, usize, usize, u8, u16, Option<u32>)> {
    (
        prop::collection::vec(0..WORDS.len(), 1..4),
        0..DOMAINS.len(),
        0..LevelTag::ALL.len(),
        0u8..=10,
        0u16..=6,
        prop::option::of(1u32..20),
    )
}

fn arb_records() -> impl Strategy<Value = RecordSet> {
    prop::collection::vec(arb_record(), 0..40).prop_map(|raws| {
        let records = raws
            .into_iter()
            .enumerate()
            .map(|(i, (words, domain, level, rating, cost, rank))| {
                let name: Vec<&str> = words.iter().map(|w| WORDS[*w]).collect();
                Arc::new(Record::new(RecordParts {
                    identifier: RecordId::new(format!("r{}", i)),
                    display_name: name.join(" "),
                    issuer_name: "Issuer".to_string(),
                    domain_tag: DomainTag::from_label(DOMAINS[domain]),
                    level_tag: LevelTag::ALL[level],
                    // Coarse values so sort keys tie often
                    numeric_rating: rating as f64 / 2.0,
                    price_amount: cost as f64 * 50.0,
                    price_currency: "USD".to_string(),
                    skill_tags: Default::default(),
                    rank_position: rank,
                }))
            })
            .collect();
        Arc::new(records)
    })
}

fn arb_filters() -> impl Strategy<Value = Filters> {
    (
        prop::option::of(0..DOMAINS.len()),
        prop::option::of(0u8..=10),
        prop::option::of(0u16..=6),
        prop::option::of(0..WORDS.len()),
    )
        .prop_map(|(domain, rating, cost, word)| Filters {
            domain: domain.map(|d| DOMAINS[d].to_string()),
            min_rating: rating.map(|r| r as f64 / 2.0),
            max_cost: cost.map(|c| c as f64 * 50.0),
            query: word.map(|w| WORDS[w].to_string()),
            ..Filters::default()
        })
}

fn arb_sort() -> impl Strategy<Value = Option<SortSpec>> {
    prop::option::of((0..4usize, any::<bool>()).prop_map(|(key, asc)| {
        let key = [SortKey::Name, SortKey::Rating, SortKey::Cost, SortKey::Rank][key];
        if asc { SortSpec::asc(key) } else { SortSpec::desc(key) }
    }))
}

fn matched_ids(records: &RecordSet, filters: &Filters, sort: Option<SortSpec>) -> Vec<String> {
    let index = IndexBuilder::default().build(records.clone()).unwrap();
    let result = QueryEngine::new().search(&index, filters, sort, 1, records.len().max(1)).unwrap();
    result.items.iter().map(|r| r.identifier.to_string()).collect()
}

proptest! {
    #[test]
    fn indexing_is_idempotent(records in arb_records(), filters in arb_filters(), sort in arb_sort()) {
        prop_assert_eq!(matched_ids(&records, &filters, sort), matched_ids(&records, &filters, sort));
    }

    #[test]
    fn adding_a_filter_never_widens(records in arb_records(), filters in arb_filters(), extra in 0..DOMAINS.len(), min in 0u8..=10) {
        let base: HashSet<String> = matched_ids(&records, &filters, None).into_iter().collect();

        if filters.domain.is_none() {
            let narrowed = Filters { domain: Some(DOMAINS[extra].to_string()), ..filters.clone() };
            let narrowed: HashSet<String> = matched_ids(&records, &narrowed, None).into_iter().collect();
            prop_assert!(narrowed.is_subset(&base));
        }

        let rated = Filters { min_rating: Some(min as f64 / 2.0), ..filters.clone() };
        let rated: HashSet<String> = matched_ids(&records, &rated, None).into_iter().collect();
        if filters.min_rating.is_none() {
            prop_assert!(rated.is_subset(&base));
        }
    }

    #[test]
    fn pages_concatenate_to_full_result(
        records in arb_records(),
        filters in arb_filters(),
        sort in arb_sort(),
        page_size in 1usize..7,
    ) {
        let index = IndexBuilder::default().build(records.clone()).unwrap();
        let engine = QueryEngine::new();
        let full = matched_ids(&records, &filters, sort);

        let first = engine.search(&index, &filters, sort, 1, page_size).unwrap();
        prop_assert_eq!(first.total_matched, full.len());
        prop_assert_eq!(first.total_pages, full.len().div_ceil(page_size));

        let mut collected = Vec::new();
        for page in 1..=first.total_pages {
            let result = engine.search(&index, &filters, sort, page, page_size).unwrap();
            prop_assert!(result.items.len() <= page_size);
            collected.extend(result.items.iter().map(|r| r.identifier.to_string()));
        }
        prop_assert_eq!(collected, full);

        let past = engine.search(&index, &filters, sort, first.total_pages + 1, page_size).unwrap();
        prop_assert!(past.items.is_empty());
        prop_assert_eq!(past.total_matched, first.total_matched);
    }

    #[test]
    fn sort_keeps_record_order_on_ties(records in arb_records(), asc in any::<bool>()) {
        let spec = if asc { SortSpec::asc(SortKey::Rating) } else { SortSpec::desc(SortKey::Rating) };
        let index = IndexBuilder::default().build(records.clone()).unwrap();
        let result = QueryEngine::new().search(&index, &Filters::default(), Some(spec), 1, records.len().max(1)).unwrap();

        for pair in result.items.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.numeric_rating == b.numeric_rating {
                let pos = |id: &RecordId| index.position_of(id).unwrap();
                prop_assert!(pos(&a.identifier) < pos(&b.identifier));
            } else if asc {
                prop_assert!(a.numeric_rating < b.numeric_rating);
            } else {
                prop_assert!(a.numeric_rating > b.numeric_rating);
            }
        }
    }
}
