use crate::analysis::filter::TokenFilter;
use crate::analysis::token::Token;

/// Appends well-known expansions when a trigger phrase appears, so that
/// "amazon web services" finds records that only say "AWS" and vice versa.
/// Runs after lowercasing.
pub struct AcronymExpansionFilter {
    pub rules: Vec<(Vec<String>, Vec<String>)>,
}

impl AcronymExpansionFilter {
    pub fn new(rules: &[(&str, &str)]) -> Self {
        let split = |s: &str| s.split_whitespace().map(String::from).collect::<Vec<_>>();
        AcronymExpansionFilter {
            rules: rules.iter()
                .map(|(trigger, expansion)| (split(trigger), split(expansion)))
                .collect(),
        }
    }

    pub fn certifications() -> Self {
        AcronymExpansionFilter::new(&[
            ("aws", "amazon web services aws"),
            ("azure", "microsoft azure"),
            ("google cloud", "google cloud platform gcp"),
            ("gcp", "google cloud platform gcp"),
            ("comptia", "comptia computing technology industry association"),
            ("cisco", "cisco networking ccna ccnp"),
            ("pmp", "project management professional pmp"),
        ])
    }

    fn contains_phrase(tokens: &[Token], phrase: &[String]) -> bool {
        !phrase.is_empty() && tokens.windows(phrase.len()).any(|window| {
            window.iter().zip(phrase).all(|(token, word)| token.text == *word)
        })
    }
}

impl TokenFilter for AcronymExpansionFilter {
    fn filter(&self, mut tokens: Vec<Token>) -> Vec<Token> {
        let mut expansions: Vec<&String> = Vec::new();
        let mut fired: Vec<&Vec<String>> = Vec::new();

        for (trigger, expansion) in &self.rules {
            if fired.contains(&expansion) || !Self::contains_phrase(&tokens, trigger) {
                continue;
            }
            fired.push(expansion);
            expansions.extend(expansion.iter());
        }

        let mut position = tokens.last().map(|t| t.position + 1).unwrap_or(0);
        let offset = tokens.last().map(|t| t.offset + t.length).unwrap_or(0);
        for word in expansions {
            tokens.push(Token::new(word.clone(), position, offset));
            position += 1;
        }

        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<Token> {
        words.iter()
            .enumerate()
            .map(|(i, w)| Token::new(w.to_string(), i as u32, i * 10))
            .collect()
    }

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn expands_single_word_trigger() {
        let filter = AcronymExpansionFilter::certifications();
        let out = filter.filter(tokens(&["aws", "developer"]));
        assert_eq!(texts(&out), vec!["aws", "developer", "amazon", "web", "services", "aws"]);
        assert_eq!(out[2].position, 2);
    }

    #[test]
    fn multi_word_trigger_fires_once() {
        let filter = AcronymExpansionFilter::certifications();
        let out = filter.filter(tokens(&["google", "cloud", "gcp"]));
        let gcp_count = out.iter().filter(|t| t.text == "platform").count();
        assert_eq!(gcp_count, 1);
    }

    #[test]
    fn unrelated_tokens_pass_through() {
        let filter = AcronymExpansionFilter::certifications();
        let out = filter.filter(tokens(&["welding", "inspector"]));
        assert_eq!(texts(&out), vec!["welding", "inspector"]);
    }
}
