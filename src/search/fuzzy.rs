use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;
use fst::{Automaton, IntoStreamer, Map, MapBuilder, Streamer};
use levenshtein_automata::{Distance, LevenshteinAutomatonBuilder, DFA, SINK_STATE};
use roaring::RoaringBitmap;
use crate::analysis::analyzer::query_analyzer;
use crate::core::config::Config;
use crate::core::error::Result;

/// Largest edit budget a single query token may get
pub const MAX_SUPPORTED_EDITS: u8 = 2;

static LEV_BUILDERS: [OnceLock<LevenshteinAutomatonBuilder>; MAX_SUPPORTED_EDITS as usize + 1] =
    [const { OnceLock::new() }; MAX_SUPPORTED_EDITS as usize + 1];

/// Builders are expensive to construct and shared by every index
fn lev_builder(distance: u8) -> &'static LevenshteinAutomatonBuilder {
    let distance = distance.min(MAX_SUPPORTED_EDITS);
    LEV_BUILDERS[distance as usize].get_or_init(|| LevenshteinAutomatonBuilder::new(distance, true))
}

/// Tunables of approximate matching
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyConfig {
    /// Normalized looseness: 0 = exact only, 1 = anything
    pub threshold: f64,
    /// Queries shorter than this (after normalization) do not filter
    pub min_query_len: usize,
    /// Cap on edits per token, at most `MAX_SUPPORTED_EDITS`
    pub max_edits: u8,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        FuzzyConfig {
            threshold: 0.3,
            min_query_len: 2,
            max_edits: MAX_SUPPORTED_EDITS,
        }
    }
}

impl FuzzyConfig {
    pub fn from_config(config: &Config) -> Self {
        FuzzyConfig {
            threshold: config.fuzzy_threshold,
            min_query_len: config.min_query_len,
            ..FuzzyConfig::default()
        }
    }

    /// Edits allowed for a token of `token_len` characters
    pub fn edit_budget(&self, token_len: usize) -> u8 {
        let budget = (self.threshold * token_len as f64).floor();
        (budget as u8).min(self.max_edits).min(MAX_SUPPORTED_EDITS)
    }

    /// Score of a term that extends the token as a prefix; always below
    /// half the threshold so whole-word matches of equal distance win
    fn prefix_score(&self, token_len: usize, term_len: usize) -> f64 {
        self.threshold / 2.0 * (term_len - token_len) as f64 / term_len as f64
    }
}

/// A matched document, lower score is better
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyHit {
    pub position: u32,
    pub score: f64,
}

/// Runs a Levenshtein DFA over the FST term dictionary
struct DfaAutomaton<'a>(&'a DFA);

impl Automaton for DfaAutomaton<'_> {
    type State = u32;

    fn start(&self) -> u32 {
        self.0.initial_state()
    }

    fn is_match(&self, state: &u32) -> bool {
        matches!(self.0.distance(*state), Distance::Exact(_))
    }

    fn can_match(&self, state: &u32) -> bool {
        *state != SINK_STATE
    }

    fn accept(&self, state: &u32, byte: u8) -> u32 {
        self.0.transition(*state, byte)
    }
}

fn final_distance(dfa: &DFA, term: &[u8]) -> Distance {
    let mut state = dfa.initial_state();
    for &byte in term {
        state = dfa.transition(state, byte);
    }
    dfa.distance(state)
}

/// Term dictionary over normalized search text with a posting bitmap per term
pub struct FuzzyIndex {
    /// Term → ordinal into `postings`
    terms: Map<Vec<u8>>,
    postings: Vec<RoaringBitmap>,
    config: FuzzyConfig,
}

impl FuzzyIndex {
    /// Builds from already-normalized texts; document positions follow
    /// iteration order
    pub fn build<'a, I>(texts: I, config: FuzzyConfig) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut term_docs: BTreeMap<&'a str, RoaringBitmap> = BTreeMap::new();
        for (position, text) in texts.into_iter().enumerate() {
            for term in text.split_whitespace() {
                term_docs.entry(term).or_default().insert(position as u32);
            }
        }

        // FST requires sorted input, which BTreeMap iteration provides
        let mut builder = MapBuilder::memory();
        let mut postings = Vec::with_capacity(term_docs.len());
        for (ordinal, (term, docs)) in term_docs.into_iter().enumerate() {
            builder.insert(term.as_bytes(), ordinal as u64)?;
            postings.push(docs);
        }

        Ok(FuzzyIndex {
            terms: builder.into_map(),
            postings,
            config,
        })
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    /// Analyzes `query` and returns matching documents ordered by ascending
    /// score, ties by position. `None` means the query is too short to filter.
    pub fn search(&self, query: &str) -> Option<Vec<FuzzyHit>> {
        let normalized = query_analyzer().normalize(query);
        if normalized.chars().count() < self.config.min_query_len {
            return None;
        }

        let mut tokens: Vec<&str> = Vec::new();
        for token in normalized.split_whitespace() {
            if token.chars().count() >= self.config.min_query_len && !tokens.contains(&token) {
                tokens.push(token);
            }
        }
        if tokens.is_empty() {
            return None;
        }

        // Every token must match; scores accumulate per document
        let mut combined: Option<HashMap<u32, f64>> = None;
        for token in &tokens {
            let scores = self.token_scores(token);
            combined = Some(match combined {
                None => scores,
                Some(acc) => acc
                    .into_iter()
                    .filter_map(|(pos, total)| scores.get(&pos).map(|s| (pos, total + s)))
                    .collect(),
            });
            if combined.as_ref().is_some_and(HashMap::is_empty) {
                break;
            }
        }

        let token_count = tokens.len() as f64;
        let mut hits: Vec<FuzzyHit> = combined
            .unwrap_or_default()
            .into_iter()
            .map(|(position, total)| FuzzyHit { position, score: total / token_count })
            .collect();
        hits.sort_by(|a, b| a.score.total_cmp(&b.score).then(a.position.cmp(&b.position)));
        Some(hits)
    }

    /// Best score per document for one analyzed token
    fn token_scores(&self, token: &str) -> HashMap<u32, f64> {
        let token_len = token.chars().count();
        let budget = self.config.edit_budget(token_len);
        let mut best: HashMap<u32, f64> = HashMap::new();

        let mut record = |ordinal: u64, score: f64| {
            for position in &self.postings[ordinal as usize] {
                best.entry(position)
                    .and_modify(|s| if score < *s { *s = score })
                    .or_insert(score);
            }
        };

        if budget == 0 {
            if let Some(ordinal) = self.terms.get(token) {
                record(ordinal, 0.0);
            }
        } else {
            let dfa = lev_builder(budget).build_dfa(token);
            let mut stream = self.terms.search(DfaAutomaton(&dfa)).into_stream();
            while let Some((term, ordinal)) = stream.next() {
                if let Distance::Exact(d) = final_distance(&dfa, term) {
                    record(ordinal, d as f64 / token_len as f64);
                }
            }
        }

        // Terms extending the token, e.g. "kube" → "kubernetes"
        let prefix = token.as_bytes();
        let mut stream = self.terms.range().gt(prefix).into_stream();
        while let Some((term, ordinal)) = stream.next() {
            if !term.starts_with(prefix) {
                break;
            }
            let term_len = String::from_utf8_lossy(term).chars().count();
            record(ordinal, self.config.prefix_score(token_len, term_len));
        }

        best
    }
}
