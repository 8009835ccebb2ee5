//! Multinomial naive Bayes training.
//!
//! For every class `c`:
//!
//! ```text
//! prior(c)        = docs(c) / docs
//! count(c, i)     = Σ vector[i] over documents of class c
//! loglik(c, i)    = ln((count(c, i) + α) / (Σ_i count(c, i) + α·|V|))
//! ```
//!
//! Additive smoothing keeps every log-likelihood finite, including grams a
//! class never produced.

use std::collections::BTreeMap;

use log::{debug, info, warn};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::analysis::analyzer::{AnalyzerSettings, CodeAnalyzer};
use crate::config::TrainingConfig;
use crate::document::Document;
use crate::error::{CodelangError, Result};
use crate::ml::evaluation::ClassificationReport;
use crate::ml::model::{ClassModel, LanguageModel, ModelMetadata};
use crate::ml::split::{TrainTestSplit, stratified_split};
use crate::ml::vectorizer::{CountVectorizer, FeatureVector};

/// Default additive smoothing constant (Laplace smoothing).
pub const DEFAULT_ALPHA: f64 = 1.0;

/// Reject smoothing constants that are not strictly positive and finite.
pub fn validate_alpha(alpha: f64) -> Result<()> {
    if alpha > 0.0 && alpha.is_finite() {
        Ok(())
    } else {
        Err(CodelangError::SmoothingConfig(alpha))
    }
}

/// Documents with a label and some non-blank text; the rest are logged and
/// dropped.
fn usable_documents(documents: &[Document]) -> Vec<&Document> {
    documents
        .iter()
        .filter(|document| match document.label() {
            Some(label) if !label.trim().is_empty() && !document.text().trim().is_empty() => true,
            Some(_) => {
                warn!("Skipping {}: empty document or label", document.describe());
                false
            }
            None => {
                warn!("Skipping {}: no label", document.describe());
                false
            }
        })
        .collect()
}

/// Builds a [`LanguageModel`] from labeled documents.
#[derive(Clone, Debug)]
pub struct NaiveBayesTrainer {
    alpha: f64,
    analyzer: AnalyzerSettings,
    thread_pool_size: Option<usize>,
}

impl Default for NaiveBayesTrainer {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}

impl NaiveBayesTrainer {
    pub fn new(alpha: f64) -> Self {
        NaiveBayesTrainer {
            alpha,
            analyzer: AnalyzerSettings::default(),
            thread_pool_size: None,
        }
    }

    pub fn from_config(config: &TrainingConfig) -> Self {
        NaiveBayesTrainer {
            alpha: config.alpha,
            analyzer: config.analyzer,
            thread_pool_size: config.thread_pool_size,
        }
    }

    pub fn with_analyzer(mut self, settings: AnalyzerSettings) -> Self {
        self.analyzer = settings;
        self
    }

    /// Number of worker threads; defaults to the number of CPUs.
    pub fn with_thread_pool_size(mut self, threads: usize) -> Self {
        self.thread_pool_size = Some(threads);
        self
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Run `op` inside a dedicated worker pool.
    pub fn install<R, F>(&self, op: F) -> Result<R>
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        let threads = self.thread_pool_size.unwrap_or_else(num_cpus::get).max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("codelang-train-{i}"))
            .build()
            .map_err(|e| CodelangError::internal(format!("Failed to create thread pool: {e}")))?;
        debug!("Running with {threads} worker threads");
        Ok(pool.install(op))
    }

    /// Train a model.
    ///
    /// Unlabeled or blank documents are skipped with a warning. Fails if the
    /// smoothing constant is invalid (checked before any document is touched)
    /// or if no usable document remains.
    pub fn train(&self, documents: &[Document]) -> Result<LanguageModel> {
        validate_alpha(self.alpha)?;
        self.fit(&usable_documents(documents))
    }

    fn fit(&self, documents: &[&Document]) -> Result<LanguageModel> {
        validate_alpha(self.alpha)?;
        let analyzer = CodeAnalyzer::new(&self.analyzer)?;
        if documents.is_empty() {
            return Err(CodelangError::invalid_input(
                "no labeled, non-empty documents to train on",
            ));
        }

        let texts: Vec<&str> = documents.iter().map(|doc| doc.text()).collect();
        let labels: Vec<&str> = documents
            .iter()
            .map(|doc| doc.label().unwrap_or_default())
            .collect();

        self.install(|| {
            let (vectorizer, vectors) = CountVectorizer::fit_transform(analyzer, &texts)?;
            self.train_vectors(vectorizer, &vectors, &labels)
        })?
    }

    /// Estimate class parameters from already vectorized documents.
    ///
    /// `labels[k]` is the class of `vectors[k]`. Classes are aggregated in
    /// parallel; within a class counts are summed as integers, so the result
    /// does not depend on document order.
    pub fn train_vectors<L: AsRef<str> + Sync>(
        &self,
        vectorizer: CountVectorizer,
        vectors: &[FeatureVector],
        labels: &[L],
    ) -> Result<LanguageModel> {
        validate_alpha(self.alpha)?;
        if vectors.len() != labels.len() {
            return Err(CodelangError::invalid_input(format!(
                "{} vectors but {} labels",
                vectors.len(),
                labels.len()
            )));
        }
        if vectors.is_empty() {
            return Err(CodelangError::invalid_input("no documents to train on"));
        }

        let vocabulary_size = vectorizer.vocabulary().len();
        if let Some(index) = vectors.iter().filter_map(FeatureVector::max_index).max() {
            if index >= vocabulary_size {
                return Err(CodelangError::internal(format!(
                    "feature index {index} outside vocabulary of {vocabulary_size}"
                )));
            }
        }

        let mut members: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (k, label) in labels.iter().enumerate() {
            members.entry(label.as_ref()).or_default().push(k);
        }

        let alpha = self.alpha;
        let total_documents = vectors.len();
        let classes: Vec<ClassModel> = members
            .par_iter()
            .map(|(label, docs)| {
                let mut counts = vec![0u64; vocabulary_size];
                for &k in docs {
                    for (index, count) in vectors[k].iter() {
                        counts[index] += count as u64;
                    }
                }
                let total: u64 = counts.iter().sum();
                let log_denominator = (total as f64 + alpha * vocabulary_size as f64).ln();
                let feature_log_prob = counts
                    .iter()
                    .map(|&count| (count as f64 + alpha).ln() - log_denominator)
                    .collect();

                ClassModel {
                    label: label.to_string(),
                    prior: docs.len() as f64 / total_documents as f64,
                    feature_log_prob,
                    document_count: docs.len(),
                }
            })
            .collect();

        info!(
            "Trained naive Bayes model: {} documents, {} classes, {} grams, alpha={}",
            total_documents,
            classes.len(),
            vocabulary_size,
            alpha
        );

        Ok(LanguageModel::from_parts(
            vectorizer,
            alpha,
            classes,
            ModelMetadata::new(total_documents),
        ))
    }
}

/// A model trained on one side of a split and evaluated on the other.
#[derive(Debug)]
pub struct TrainingOutcome {
    pub model: LanguageModel,
    pub split: TrainTestSplit,
    pub report: ClassificationReport,
}

/// Split `documents`, train on the training side and evaluate on the
/// held-out side, all with the settings of `config`.
pub fn train_and_evaluate(documents: &[Document], config: &TrainingConfig) -> Result<TrainingOutcome> {
    config.validate()?;
    let trainer = NaiveBayesTrainer::from_config(config);

    let usable = usable_documents(documents);
    let labels: Vec<&str> = usable
        .iter()
        .map(|doc| doc.label().unwrap_or_default())
        .collect();
    let split = stratified_split(&labels, config.test_ratio, config.seed)?;
    let (train, test) = split.select(&usable);
    info!(
        "Split {} documents into {} training and {} test ({})",
        usable.len(),
        train.len(),
        test.len(),
        if split.stratified { "stratified" } else { "random" }
    );

    let train: Vec<&Document> = train.into_iter().copied().collect();
    let model = trainer.fit(&train)?;

    let texts: Vec<&str> = test.iter().map(|doc| doc.text()).collect();
    let gold: Vec<&str> = test.iter().map(|doc| doc.label().unwrap_or_default()).collect();
    let predictions = trainer.install(|| model.predict_batch(&texts))??;
    let predicted: Vec<&str> = predictions.iter().map(|p| p.label.as_str()).collect();
    let report = ClassificationReport::from_predictions(&gold, &predicted)?;
    info!("Held-out accuracy: {:.4}", report.accuracy);

    Ok(TrainingOutcome {
        model,
        split,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::predict;

    fn toy_corpus() -> Vec<Document> {
        vec![
            Document::labeled("def foo(): pass", "py"),
            Document::labeled("def bar(): pass", "py"),
            Document::labeled("function foo(){}", "js"),
            Document::labeled("function bar(){}", "js"),
        ]
    }

    #[test]
    fn test_toy_scenario() {
        let model = NaiveBayesTrainer::default().train(&toy_corpus()).unwrap();
        assert_eq!(model.labels(), vec!["js", "py"]);
        assert_eq!(predict(&model, "def baz(): pass").unwrap().label, "py");
        assert_eq!(predict(&model, "function baz(){}").unwrap().label, "js");
    }

    #[test]
    fn test_priors_and_likelihoods() {
        let corpus = vec![
            Document::labeled("a", "x"),
            Document::labeled("a a", "x"),
            Document::labeled("b", "y"),
        ];
        let model = NaiveBayesTrainer::new(1.0).train(&corpus).unwrap();
        let vocab = model.vocabulary();
        assert_eq!(vocab.grams(), &["a", "a a", "b"]);

        let x = &model.classes()[0];
        assert_eq!(x.label, "x");
        assert!((x.prior - 2.0 / 3.0).abs() < 1e-12);
        // x counts: a=3, "a a"=1, b=0; total 4; denominator 4 + 3.
        assert!((x.feature_log_prob[0] - (4.0f64 / 7.0).ln()).abs() < 1e-12);
        assert!((x.feature_log_prob[1] - (2.0f64 / 7.0).ln()).abs() < 1e-12);
        assert!((x.feature_log_prob[2] - (1.0f64 / 7.0).ln()).abs() < 1e-12);

        let y = &model.classes()[1];
        assert_eq!(y.document_count, 1);
        assert!((y.feature_log_prob[2] - (2.0f64 / 4.0).ln()).abs() < 1e-12);
    }

    #[test]
    fn test_no_negative_infinity() {
        for alpha in [1e-9, 0.01, 1.0, 10.0] {
            let model = NaiveBayesTrainer::new(alpha).train(&toy_corpus()).unwrap();
            for class in model.classes() {
                assert_eq!(class.feature_log_prob.len(), model.vocabulary().len());
                assert!(class.feature_log_prob.iter().all(|p| p.is_finite()));
            }
        }
    }

    #[test]
    fn test_rejects_bad_alpha_before_counting() {
        for alpha in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = NaiveBayesTrainer::new(alpha).train(&[]);
            assert!(matches!(result, Err(CodelangError::SmoothingConfig(_))));
        }
    }

    #[test]
    fn test_skips_unusable_documents() {
        let mut corpus = toy_corpus();
        corpus.push(Document::new("def orphan(): pass"));
        corpus.push(Document::labeled("   ", "py"));
        let model = NaiveBayesTrainer::default().train(&corpus).unwrap();
        assert_eq!(model.metadata().training_documents, 4);
    }

    #[test]
    fn test_no_usable_documents() {
        let result = NaiveBayesTrainer::default().train(&[Document::new("x")]);
        assert!(matches!(result, Err(CodelangError::InvalidInput(_))));
    }

    #[test]
    fn test_order_invariance_within_class() {
        let corpus = vec![
            Document::labeled("def foo(): return 1", "py"),
            Document::labeled("import os\nprint(x)", "py"),
            Document::labeled("class A: pass", "py"),
            Document::labeled("int main() { return 0; }", "c"),
            Document::labeled("#include <x>\nvoid f() {}", "c"),
        ];
        let mut shuffled = corpus.clone();
        shuffled.swap(0, 2);
        shuffled.swap(3, 4);
        shuffled.reverse();

        let a = NaiveBayesTrainer::default().train(&corpus).unwrap();
        let b = NaiveBayesTrainer::default()
            .with_thread_pool_size(1)
            .train(&shuffled)
            .unwrap();
        assert_eq!(a.classes(), b.classes());
        assert_eq!(a.vocabulary(), b.vocabulary());
    }

    #[test]
    fn test_train_and_evaluate() {
        let mut corpus = Vec::new();
        for i in 0..10 {
            corpus.push(Document::labeled(format!("def f{i}(x): return x + {i}"), "py"));
            corpus.push(Document::labeled(format!("function f{i}(x) {{ return x + {i}; }}"), "js"));
        }
        corpus.push(Document::new("orphan"));

        let config = TrainingConfig {
            thread_pool_size: Some(2),
            ..TrainingConfig::default()
        };
        let outcome = train_and_evaluate(&corpus, &config).unwrap();
        assert!(outcome.split.stratified);
        assert_eq!(outcome.split.test.len(), 4);
        assert_eq!(outcome.report.total, 4);
        assert_eq!(outcome.report.accuracy, 1.0);
        assert_eq!(outcome.model.metadata().training_documents, 16);

        let again = train_and_evaluate(&corpus, &config).unwrap();
        assert_eq!(again.split, outcome.split);
    }

    #[test]
    fn test_train_vectors_length_mismatch() {
        let (vectorizer, vectors) =
            CountVectorizer::fit_transform(CodeAnalyzer::default(), &["a", "b"]).unwrap();
        let result = NaiveBayesTrainer::default().train_vectors(vectorizer, &vectors, &["x"]);
        assert!(matches!(result, Err(CodelangError::InvalidInput(_))));
    }
}
