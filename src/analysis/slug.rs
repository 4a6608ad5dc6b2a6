use std::sync::LazyLock;
use regex::Regex;
use crate::analysis::filters::ascii_fold::AsciiFoldingFilter;

static NON_SLUG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-z0-9]+").expect("static slug pattern")
});

/// URL-friendly slug: folded, lowercased, runs of other characters become '-'
pub fn slugify(text: &str) -> String {
    let lowered = AsciiFoldingFilter::fold(text).to_lowercase();
    NON_SLUG.replace_all(&lowered, "-").trim_matches('-').to_string()
}
