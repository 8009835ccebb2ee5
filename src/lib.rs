//! # Codelang
//!
//! Identify the programming language of a source file with a bag-of-grams
//! multinomial naive Bayes classifier.
//!
//! ## Features
//!
//! - Comment stripping and literal placeholders before tokenization
//! - Code-aware tokenizer with operator and punctuation tokens
//! - Unigram + bigram count vectors over a deterministic vocabulary
//! - Parallel training with Laplace/Lidstone smoothing
//! - Stratified train/test split and classification report
//! - Versioned JSON model artifacts with atomic writes
//!
//! ```
//! use codelang::document::Document;
//! use codelang::ml::{NaiveBayesTrainer, predict};
//!
//! let corpus = vec![
//!     Document::labeled("def foo(): pass", "py"),
//!     Document::labeled("function foo(){}", "js"),
//! ];
//! let model = NaiveBayesTrainer::default().train(&corpus).unwrap();
//! assert_eq!(predict(&model, "def bar(): pass").unwrap().label, "py");
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod document;
pub mod error;
pub mod ml;

pub mod prelude {
    pub use crate::analysis::{AnalyzerSettings, CodeAnalyzer};
    pub use crate::config::TrainingConfig;
    pub use crate::document::Document;
    pub use crate::error::{CodelangError, Result};
    pub use crate::ml::{LanguageModel, NaiveBayesTrainer, Prediction, load_model, predict, save_model};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
