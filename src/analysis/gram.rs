//! Word n-gram extraction.
//!
//! A [`Gram`] is a run of consecutive tokens used as one classification
//! feature. With the default range every token becomes a unigram and every
//! adjacent token pair a bigram.
//!
//! # Examples
//!
//! ```
//! use codelang::analysis::gram::GramExtractor;
//!
//! let extractor = GramExtractor::default();
//! let grams: Vec<String> = extractor
//!     .extract(&["def", "foo", "("])
//!     .iter()
//!     .map(|g| g.to_string())
//!     .collect();
//! assert_eq!(grams, vec!["def", "foo", "(", "def foo", "foo ("]);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CodelangError, Result};

/// Separator between the tokens of a gram's string form.
pub const GRAM_SEPARATOR: &str = " ";

/// A sequence of consecutive tokens. Equality is by value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Gram {
    tokens: Vec<String>,
}

impl Gram {
    pub fn new(tokens: Vec<String>) -> Self {
        Gram { tokens }
    }

    pub fn unigram<S: Into<String>>(token: S) -> Self {
        Gram {
            tokens: vec![token.into()],
        }
    }

    pub fn bigram<A: Into<String>, B: Into<String>>(first: A, second: B) -> Self {
        Gram {
            tokens: vec![first.into(), second.into()],
        }
    }

    /// Number of tokens in this gram.
    pub fn order(&self) -> usize {
        self.tokens.len()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The string form used as the vocabulary key: tokens joined by a space.
    ///
    /// Tokens never contain whitespace, so distinct grams have distinct keys.
    pub fn key(&self) -> String {
        self.tokens.join(GRAM_SEPARATOR)
    }
}

impl fmt::Display for Gram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Emits every gram of order `min_n..=max_n` from a token sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GramExtractor {
    min_n: usize,
    max_n: usize,
}

impl GramExtractor {
    /// Create an extractor for the inclusive order range `min_n..=max_n`.
    ///
    /// # Errors
    ///
    /// Returns an error if `min_n` is 0 or `max_n < min_n`.
    pub fn new(min_n: usize, max_n: usize) -> Result<Self> {
        if min_n == 0 {
            return Err(CodelangError::analysis("min_n must be at least 1"));
        }
        if max_n < min_n {
            return Err(CodelangError::analysis(format!(
                "max_n ({max_n}) must be >= min_n ({min_n})"
            )));
        }
        Ok(Self { min_n, max_n })
    }

    pub fn min_n(&self) -> usize {
        self.min_n
    }

    pub fn max_n(&self) -> usize {
        self.max_n
    }

    /// Extract grams grouped by order, each group in token order.
    ///
    /// A sequence of `n` tokens yields `max(n - k + 1, 0)` grams of order `k`.
    pub fn extract<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<Gram> {
        let mut grams = Vec::new();
        for order in self.min_n..=self.max_n {
            if tokens.len() < order {
                break;
            }
            grams.extend(tokens.windows(order).map(|window| {
                Gram::new(window.iter().map(|t| t.as_ref().to_string()).collect())
            }));
        }
        grams
    }
}

impl Default for GramExtractor {
    /// Unigrams and bigrams.
    fn default() -> Self {
        GramExtractor { min_n: 1, max_n: 2 }
    }
}
