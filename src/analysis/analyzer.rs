//! The shared source code analysis pipeline.
//!
//! ```text
//! Raw Text → Normalizer → Tokenizer → Token Filters → Gram Extractor → Grams
//! ```
//!
//! Training and inference both go through [`CodeAnalyzer`], built from the
//! same [`AnalyzerSettings`] that are persisted inside the model, so the two
//! phases can never disagree about what a feature is.
//!
//! # Examples
//!
//! ```
//! use codelang::analysis::analyzer::{AnalyzerSettings, CodeAnalyzer};
//!
//! let analyzer = CodeAnalyzer::new(&AnalyzerSettings::default()).unwrap();
//! let grams: Vec<String> = analyzer
//!     .analyze("x = 1 # one")
//!     .unwrap()
//!     .iter()
//!     .map(|g| g.key())
//!     .collect();
//!
//! assert_eq!(grams, vec!["x", "=", "NUMBER", "x =", "= NUMBER"]);
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::gram::{Gram, GramExtractor};
use crate::analysis::normalizer::{NormalizedText, SourceNormalizer};
use crate::analysis::token::Token;
use crate::analysis::token_filter::{Filter, LowercaseFilter};
use crate::analysis::tokenizer::{CodeTokenizer, Tokenizer};
use crate::error::Result;

/// Feature extraction settings. Persisted with every model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSettings {
    /// Smallest gram order
    pub min_n: usize,
    /// Largest gram order
    pub max_n: usize,
    /// Lowercase word tokens before gram extraction
    pub lowercase: bool,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        AnalyzerSettings {
            min_n: 1,
            max_n: 2,
            lowercase: false,
        }
    }
}

/// Normalizer, tokenizer, token filters and gram extractor in one pipeline.
#[derive(Clone)]
pub struct CodeAnalyzer {
    normalizer: SourceNormalizer,
    tokenizer: Arc<dyn Tokenizer>,
    filters: Vec<Arc<dyn Filter>>,
    grams: GramExtractor,
    settings: AnalyzerSettings,
}

impl fmt::Debug for CodeAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeAnalyzer")
            .field("normalizer", &self.normalizer)
            .field("tokenizer", &self.tokenizer.name())
            .field(
                "filters",
                &self.filters.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .field("grams", &self.grams)
            .finish()
    }
}

impl CodeAnalyzer {
    /// Build the pipeline described by `settings`.
    pub fn new(settings: &AnalyzerSettings) -> Result<Self> {
        let grams = GramExtractor::new(settings.min_n, settings.max_n)?;
        let mut filters: Vec<Arc<dyn Filter>> = Vec::new();
        if settings.lowercase {
            filters.push(Arc::new(LowercaseFilter::new()));
        }

        Ok(CodeAnalyzer {
            normalizer: SourceNormalizer::new(),
            tokenizer: Arc::new(CodeTokenizer::new()),
            filters,
            grams,
            settings: *settings,
        })
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    pub fn normalizer(&self) -> &SourceNormalizer {
        &self.normalizer
    }

    /// Normalize raw text.
    pub fn normalize(&self, text: &str) -> NormalizedText {
        self.normalizer.normalize(text)
    }

    /// Tokenize already normalized text and run the token filters.
    pub fn tokenize(&self, text: &NormalizedText) -> Result<Vec<Token>> {
        let mut tokens = self.tokenizer.tokenize(text.as_str())?;
        for filter in &self.filters {
            tokens = filter.filter(tokens)?;
        }
        Ok(tokens.collect())
    }

    /// Run the full pipeline on raw text.
    pub fn analyze(&self, text: &str) -> Result<Vec<Gram>> {
        let normalized = self.normalize(text);
        let tokens: Vec<String> = self
            .tokenize(&normalized)?
            .into_iter()
            .map(|token| token.text)
            .collect();
        Ok(self.grams.extract(&tokens))
    }
}

impl Default for CodeAnalyzer {
    fn default() -> Self {
        CodeAnalyzer {
            normalizer: SourceNormalizer::new(),
            tokenizer: Arc::new(CodeTokenizer::new()),
            filters: Vec::new(),
            grams: GramExtractor::default(),
            settings: AnalyzerSettings::default(),
        }
    }
}
