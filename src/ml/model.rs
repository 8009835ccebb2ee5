//! Trained multinomial naive Bayes language model and inference.
//!
//! # Example
//!
//! ```
//! use codelang::document::Document;
//! use codelang::ml::model::predict;
//! use codelang::ml::trainer::NaiveBayesTrainer;
//!
//! # fn main() -> codelang::error::Result<()> {
//! let corpus = vec![
//!     Document::labeled("def foo(): pass", "py"),
//!     Document::labeled("def bar(): pass", "py"),
//!     Document::labeled("function foo(){}", "js"),
//!     Document::labeled("function bar(){}", "js"),
//! ];
//! let model = NaiveBayesTrainer::default().train(&corpus)?;
//!
//! let prediction = predict(&model, "def baz(): pass")?;
//! assert_eq!(prediction.label, "py");
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ml::vectorizer::{CountVectorizer, FeatureVector};
use crate::ml::vocabulary::Vocabulary;

/// Per-class parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassModel {
    /// Class label
    pub label: String,
    /// Fraction of training documents with this label, in (0, 1]
    pub prior: f64,
    /// Smoothed log P(gram | class), one entry per vocabulary index
    pub feature_log_prob: Vec<f64>,
    /// Number of training documents with this label
    pub document_count: usize,
}

impl ClassModel {
    /// `ln prior + Σ count · log-likelihood` over the nonzero entries.
    pub fn score(&self, vector: &FeatureVector) -> f64 {
        vector.iter().fold(self.prior.ln(), |acc, (index, count)| {
            acc + count as f64 * self.feature_log_prob[index]
        })
    }
}

/// Information recorded at training time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Training timestamp.
    pub trained_at: DateTime<Utc>,
    /// Number of documents the model was trained on.
    pub training_documents: usize,
    /// Version of the crate that produced the model.
    pub crate_version: String,
}

impl ModelMetadata {
    pub fn new(training_documents: usize) -> Self {
        ModelMetadata {
            trained_at: Utc::now(),
            training_documents,
            crate_version: crate::VERSION.to_string(),
        }
    }
}

/// An immutable trained model: vectorizer, smoothing constant and one
/// [`ClassModel`] per label, sorted by label.
#[derive(Clone, Debug)]
pub struct LanguageModel {
    vectorizer: CountVectorizer,
    alpha: f64,
    classes: Vec<ClassModel>,
    metadata: ModelMetadata,
}

/// Result of classifying one document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Winning label
    pub label: String,
    /// Joint log-likelihood of every class, in model class order
    pub scores: Vec<(String, f64)>,
}

impl Prediction {
    /// Posterior probability of every class, normalized with log-sum-exp.
    pub fn probabilities(&self) -> Vec<(String, f64)> {
        let max = self
            .scores
            .iter()
            .map(|(_, s)| *s)
            .fold(f64::NEG_INFINITY, f64::max);
        let norm = max
            + self
                .scores
                .iter()
                .map(|(_, s)| (s - max).exp())
                .sum::<f64>()
                .ln();
        self.scores
            .iter()
            .map(|(label, s)| (label.clone(), (s - norm).exp()))
            .collect()
    }

    /// Score of the winning label.
    pub fn best_score(&self) -> f64 {
        self.scores
            .iter()
            .find(|(label, _)| *label == self.label)
            .map(|(_, s)| *s)
            .unwrap_or(f64::NEG_INFINITY)
    }
}

impl LanguageModel {
    /// Assemble a model. Classes are re-sorted by label so that tie-breaking
    /// does not depend on the caller's order.
    pub(crate) fn from_parts(
        vectorizer: CountVectorizer,
        alpha: f64,
        mut classes: Vec<ClassModel>,
        metadata: ModelMetadata,
    ) -> Self {
        classes.sort_by(|a, b| a.label.cmp(&b.label));
        LanguageModel {
            vectorizer,
            alpha,
            classes,
            metadata,
        }
    }

    pub fn vectorizer(&self) -> &CountVectorizer {
        &self.vectorizer
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        self.vectorizer.vocabulary()
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn classes(&self) -> &[ClassModel] {
        &self.classes
    }

    /// Class labels in model order (lexicographic).
    pub fn labels(&self) -> Vec<&str> {
        self.classes.iter().map(|c| c.label.as_str()).collect()
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Joint log-likelihood of every class for a vector, in class order.
    pub fn scores(&self, vector: &FeatureVector) -> Vec<f64> {
        self.classes.iter().map(|c| c.score(vector)).collect()
    }

    /// Index of the best class. Equal scores resolve to the first class in
    /// label order.
    fn argmax(scores: &[f64]) -> usize {
        let mut best = 0;
        for (i, &score) in scores.iter().enumerate().skip(1) {
            if score > scores[best] {
                best = i;
            }
        }
        best
    }

    /// Label with the highest score for a vector.
    pub fn classify(&self, vector: &FeatureVector) -> &str {
        let scores = self.scores(vector);
        &self.classes[Self::argmax(&scores)].label
    }

    /// Classify a feature vector, keeping every class score.
    pub fn predict_vector(&self, vector: &FeatureVector) -> Prediction {
        let scores = self.scores(vector);
        let best = Self::argmax(&scores);
        Prediction {
            label: self.classes[best].label.clone(),
            scores: self
                .classes
                .iter()
                .zip(scores)
                .map(|(c, s)| (c.label.clone(), s))
                .collect(),
        }
    }

    /// Classify many raw texts in parallel, preserving input order.
    pub fn predict_batch<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Result<Vec<Prediction>> {
        texts
            .par_iter()
            .map(|text| predict(self, text.as_ref()))
            .collect()
    }
}

/// Run the full pipeline on raw text and classify it.
pub fn predict(model: &LanguageModel, text: &str) -> Result<Prediction> {
    let vector = model.vectorizer.transform(text)?;
    Ok(model.predict_vector(&vector))
}
