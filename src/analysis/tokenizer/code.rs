//! Regex-based tokenizer for normalized source code.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use super::Tokenizer;
use crate::analysis::normalizer::{NUMBER_PLACEHOLDER, STRING_PLACEHOLDER};
use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::error::Result;

/// Two-character operators, tried after word runs and before single symbols.
pub const OPERATORS: [&str; 5] = ["==", "!=", "<=", ">=", "->"];

/// Single punctuation characters kept as tokens.
pub const PUNCTUATION: [char; 14] = [
    '+', '-', '*', '/', '=', '<', '>', '{', '}', '(', ')', '[', ']', ';',
];

/// Leftmost-first alternation: word runs, then operators, then symbols.
/// Anything else (whitespace, `.`, `,`, `:` ...) is skipped.
pub const DEFAULT_PATTERN: &str = r"\w+|==|!=|<=|>=|->|[+\-*/=<>{}()\[\];]";

lazy_static! {
    static ref DEFAULT_REGEX: Arc<Regex> =
        Arc::new(Regex::new(DEFAULT_PATTERN).expect("Default code pattern should be valid"));
}

/// The one tokenizer used for both training and inference.
///
/// # Examples
///
/// ```
/// use codelang::analysis::tokenizer::{CodeTokenizer, Tokenizer};
///
/// let tokenizer = CodeTokenizer::new();
/// let tokens: Vec<String> = tokenizer.tokenize("a==b").unwrap().map(|t| t.text).collect();
/// assert_eq!(tokens, vec!["a", "==", "b"]);
/// ```
#[derive(Clone, Debug)]
pub struct CodeTokenizer {
    pattern: Arc<Regex>,
}

impl CodeTokenizer {
    pub fn new() -> Self {
        CodeTokenizer {
            pattern: Arc::clone(&DEFAULT_REGEX),
        }
    }

    /// Get the regex pattern used by this tokenizer.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    fn classify(text: &str) -> TokenType {
        if text == STRING_PLACEHOLDER || text == NUMBER_PLACEHOLDER {
            TokenType::Placeholder
        } else if OPERATORS.contains(&text) {
            TokenType::Operator
        } else if text.chars().count() == 1 && text.chars().all(|c| PUNCTUATION.contains(&c)) {
            TokenType::Punctuation
        } else {
            TokenType::Word
        }
    }
}

impl Default for CodeTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for CodeTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let tokens: Vec<Token> = self
            .pattern
            .find_iter(text)
            .enumerate()
            .map(|(position, mat)| {
                Token::with_offsets(mat.as_str(), position, mat.start(), mat.end())
                    .with_token_type(Self::classify(mat.as_str()))
            })
            .collect();

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "code"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<String> {
        CodeTokenizer::new()
            .tokenize(input)
            .unwrap()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_operator_scenario() {
        assert_eq!(texts("a==b"), vec!["a", "==", "b"]);
    }

    #[test]
    fn test_prefers_two_char_operators() {
        assert_eq!(texts("x->y"), vec!["x", "->", "y"]);
        assert_eq!(texts("a<=b>=c!=d"), vec!["a", "<=", "b", ">=", "c", "!=", "d"]);
        assert_eq!(texts("a=-b"), vec!["a", "=", "-", "b"]);
    }

    #[test]
    fn test_skips_unknown_symbols() {
        assert_eq!(texts("def foo(): pass"), vec!["def", "foo", "(", ")", "pass"]);
        assert_eq!(texts("a.b, c!"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(texts("").is_empty());
        assert!(texts("   ").is_empty());
    }

    #[test]
    fn test_no_whitespace_tokens() {
        let tokens = texts("fn  main ( ) {\n\tlet x_1 = 2 ;\n}");
        assert!(tokens.iter().all(|t| !t.trim().is_empty()));
        assert_eq!(
            tokens,
            vec!["fn", "main", "(", ")", "{", "let", "x_1", "=", "2", ";", "}"]
        );
    }

    #[test]
    fn test_offsets_and_types() {
        let tokens: Vec<Token> = CodeTokenizer::new()
            .tokenize("if STRING == x;")
            .unwrap()
            .collect();
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[1].token_type, TokenType::Placeholder);
        assert_eq!(tokens[2].token_type, TokenType::Operator);
        assert_eq!(tokens[2].start_offset, 10);
        assert_eq!(tokens[2].end_offset, 12);
        assert_eq!(tokens[3].token_type, TokenType::Word);
        assert_eq!(tokens[4].token_type, TokenType::Punctuation);
        assert_eq!(tokens[4].position, 4);
    }

    #[test]
    fn test_tokenizer_name() {
        assert_eq!(CodeTokenizer::new().name(), "code");
    }
}
