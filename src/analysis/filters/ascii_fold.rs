use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;
use crate::analysis::filter::TokenFilter;
use crate::analysis::token::Token;

/// Strips diacritics by decomposing (NFD) and dropping combining marks
pub struct AsciiFoldingFilter;

impl AsciiFoldingFilter {
    pub fn fold(text: &str) -> String {
        text.nfd().filter(|c| !is_combining_mark(*c)).collect()
    }
}

impl TokenFilter for AsciiFoldingFilter {
    fn filter(&self, tokens: Vec<Token>) -> Vec<Token> {
        tokens.into_iter()
            .map(|mut token| {
                if !token.text.is_ascii() {
                    token.text = Self::fold(&token.text);
                }
                token
            })
            .collect()
    }
}
