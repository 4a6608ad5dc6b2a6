use std::sync::LazyLock;
use crate::analysis::filter::TokenFilter;
use crate::analysis::filters::acronym::AcronymExpansionFilter;
use crate::analysis::filters::ascii_fold::AsciiFoldingFilter;
use crate::analysis::filters::lowercase::LowercaseFilter;
use crate::analysis::token::Token;
use crate::analysis::tokenizer::{StandardTokenizer, Tokenizer};

/// Text analysis pipeline
pub struct Analyzer {
    pub tokenizer: Box<dyn Tokenizer>,
    pub filters: Vec<Box<dyn TokenFilter>>,
}

impl Analyzer {
    pub fn new(tokenizer: Box<dyn Tokenizer>) -> Self {
        Analyzer {
            tokenizer,
            filters: Vec::new(),
        }
    }

    pub fn add_filter(mut self, filter: Box<dyn TokenFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn analyze(&self, text: &str) -> Vec<Token> {
        let mut tokens = self.tokenizer.tokenize(text);

        for filter in &self.filters {
            tokens = filter.filter(tokens);
        }

        tokens
    }

    /// Analyzed terms joined by single spaces
    pub fn normalize(&self, text: &str) -> String {
        join_terms(self.analyze(text))
    }

    /// Builds the search text of a record from its parts in one pass, so
    /// expansions fire once for the whole record
    pub fn search_text(&self, parts: &[&str]) -> String {
        self.normalize(&parts.join(" "))
    }

    /// Index-time analyzer: folding, lowercasing and acronym expansion
    pub fn catalog() -> Self {
        Analyzer::new(Box::new(StandardTokenizer::default()))
            .add_filter(Box::new(AsciiFoldingFilter))
            .add_filter(Box::new(LowercaseFilter))
            .add_filter(Box::new(AcronymExpansionFilter::certifications()))
    }

    /// Query-time analyzer: same normalization as `catalog` without expansion
    pub fn query() -> Self {
        Analyzer::new(Box::new(StandardTokenizer::default()))
            .add_filter(Box::new(AsciiFoldingFilter))
            .add_filter(Box::new(LowercaseFilter))
    }
}

fn join_terms(tokens: Vec<Token>) -> String {
    let mut out = String::new();
    for token in tokens {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&token.text);
    }
    out
}

static CATALOG: LazyLock<Analyzer> = LazyLock::new(Analyzer::catalog);
static QUERY: LazyLock<Analyzer> = LazyLock::new(Analyzer::query);

pub fn catalog_analyzer() -> &'static Analyzer {
    &CATALOG
}

pub fn query_analyzer() -> &'static Analyzer {
    &QUERY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_and_query_normalize_alike() {
        let text = "Certified Ethical Hacker (CEH) – Sécurité";
        assert_eq!(
            catalog_analyzer().normalize(text),
            query_analyzer().normalize(text),
        );
        assert_eq!(query_analyzer().normalize(text), "certified ethical hacker ceh securite");
    }

    #[test]
    fn search_text_expands_acronyms() {
        let text = catalog_analyzer().search_text(&["AWS Solutions Architect", "Amazon"]);
        assert!(text.starts_with("aws solutions architect amazon"));
        assert!(text.ends_with("amazon web services aws"));
    }

    #[test]
    fn empty_input_gives_empty_text() {
        assert_eq!(query_analyzer().normalize("  -- "), "");
    }
}
