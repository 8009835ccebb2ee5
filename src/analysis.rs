//! Text analysis for source code.
//!
//! This module turns raw source text into the grams that serve as
//! classification features: normalization, tokenization, token filtering and
//! gram extraction, tied together by [`analyzer::CodeAnalyzer`].

pub mod analyzer;
pub mod char_filter;
pub mod gram;
pub mod normalizer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use analyzer::{AnalyzerSettings, CodeAnalyzer};
pub use gram::{Gram, GramExtractor};
pub use normalizer::{NormalizedText, SourceNormalizer};
pub use token::{Token, TokenType};
pub use tokenizer::{CodeTokenizer, Tokenizer};
