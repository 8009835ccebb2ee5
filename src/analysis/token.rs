//! Token types for source code analysis.
//!
//! A [`Token`] is the atomic unit produced by the tokenizer: an identifier,
//! keyword or placeholder word, or one of a fixed set of operator and
//! punctuation symbols. Tokens flow from the tokenizer into the gram extractor.
//!
//! # Examples
//!
//! ```
//! use codelang::analysis::token::{Token, TokenType};
//!
//! let token = Token::with_offsets("==", 1, 1, 3).with_token_type(TokenType::Operator);
//! assert_eq!(token.text, "==");
//! assert_eq!(token.start_offset, 1);
//! assert_eq!(token.token_type, TokenType::Operator);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single token of canonical source text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The text content of the token
    pub text: String,

    /// The position of the token in the token sequence (0-based)
    pub position: usize,

    /// The byte offset where this token starts in the canonical text
    pub start_offset: usize,

    /// The byte offset where this token ends in the canonical text
    pub end_offset: usize,

    /// What kind of symbol this token is
    pub token_type: TokenType,
}

/// Classification of token content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    /// Identifier or keyword (a run of word characters)
    Word,
    /// A normalization placeholder (`STRING`, `NUMBER`)
    Placeholder,
    /// A two-character operator such as `==` or `->`
    Operator,
    /// A single punctuation character
    Punctuation,
}

impl Token {
    /// Create a new word token with the given text and position.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset: 0,
            end_offset: 0,
            token_type: TokenType::Word,
        }
    }

    /// Create a new token with text, position, and byte offsets.
    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset,
            end_offset,
            token_type: TokenType::Word,
        }
    }

    /// Get the length of the token text.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the token is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Set the token type.
    pub fn with_token_type(mut self, token_type: TokenType) -> Self {
        self.token_type = token_type;
        self
    }

    /// Clone this token with updated text.
    pub fn with_text<S: Into<String>>(&self, text: S) -> Self {
        let mut token = self.clone();
        token.text = text.into();
        token
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A token stream represents a sequence of tokens from the analysis pipeline.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_creation() {
        let token = Token::new("hello", 0);
        assert_eq!(token.text, "hello");
        assert_eq!(token.position, 0);
        assert_eq!(token.start_offset, 0);
        assert_eq!(token.end_offset, 0);
        assert_eq!(token.token_type, TokenType::Word);
    }

    #[test]
    fn test_token_with_offsets() {
        let token = Token::with_offsets("world", 1, 6, 11);
        assert_eq!(token.text, "world");
        assert_eq!(token.position, 1);
        assert_eq!(token.start_offset, 6);
        assert_eq!(token.end_offset, 11);
        assert_eq!(token.len(), 5);
    }

    #[test]
    fn test_with_text_keeps_offsets() {
        let token = Token::with_offsets("Foo", 2, 4, 7).with_text("foo");
        assert_eq!(token.text, "foo");
        assert_eq!(token.start_offset, 4);
        assert_eq!(token.to_string(), "foo");
    }
}
