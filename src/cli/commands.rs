//! Command implementations for the codelang binaries.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use log::{debug, info};

use crate::analysis::analyzer::CodeAnalyzer;
use crate::cli::args::{PredictArgs, TrainArgs};
use crate::cli::output::{PredictionOutput, TrainingSummary, output_result};
use crate::config::TrainingConfig;
use crate::corpus::{CorpusFilter, load_corpus, normalize_documents, save_jsonl};
use crate::error::{CodelangError, Result};
use crate::ml::model::predict;
use crate::ml::model_store::{load_model, save_model};
use crate::ml::trainer::train_and_evaluate;

/// Read a file to classify. Missing, unreadable, non-UTF-8 and blank files
/// are all invalid input.
pub fn read_source_file(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::InvalidData => {
            CodelangError::invalid_input(format!("{} is not valid UTF-8 text", path.display()))
        }
        _ => CodelangError::invalid_input(format!("cannot read {}: {e}", path.display())),
    })?;
    if text.trim().is_empty() {
        return Err(CodelangError::invalid_input(format!(
            "{} is empty",
            path.display()
        )));
    }
    Ok(text)
}

/// Classify one file with a saved model and print the label.
pub fn run_predict(args: &PredictArgs) -> anyhow::Result<()> {
    let model = load_model(&args.model)
        .with_context(|| format!("Failed to load model from {}", args.model.display()))?;
    let text = read_source_file(&args.file)?;

    let prediction = predict(&model, &text)?;
    debug!(
        "{}: {} (log-likelihood {:.3})",
        args.file.display(),
        prediction.label,
        prediction.best_score()
    );

    let output = PredictionOutput {
        file: args.file.display().to_string(),
        probabilities: args.scores.then(|| prediction.probabilities()),
        label: prediction.label,
    };
    output_result(&output, &args.global)?;
    Ok(())
}

/// Build the training configuration: defaults, then the configuration file,
/// then command line overrides.
pub fn training_config(args: &TrainArgs) -> Result<TrainingConfig> {
    let mut config = match &args.config {
        Some(path) => TrainingConfig::load_from_file(path)?,
        None => TrainingConfig::default(),
    };
    if let Some(alpha) = args.alpha {
        config.alpha = alpha;
    }
    if let Some(test_ratio) = args.test_ratio {
        config.test_ratio = test_ratio;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(threads) = args.threads {
        config.thread_pool_size = Some(threads);
    }
    if args.no_filter {
        config.corpus_filter = CorpusFilter::none();
    }
    config.validate()?;
    Ok(config)
}

/// Load a corpus, train and evaluate, save the model and print the report.
pub fn run_train(args: &TrainArgs) -> anyhow::Result<TrainingSummary> {
    let config = training_config(args)?;
    debug!("Training configuration: {config:?}");

    let start_time = Instant::now();
    let documents = load_corpus(&args.corpus)
        .with_context(|| format!("Failed to load corpus from {}", args.corpus.display()))?;
    let documents = config.corpus_filter.apply(documents);
    if let Some(dump_path) = &args.dump_corpus {
        let analyzer = CodeAnalyzer::new(&config.analyzer)?;
        save_jsonl(&normalize_documents(&documents, &analyzer), dump_path)
            .with_context(|| format!("Failed to write corpus to {}", dump_path.display()))?;
    }
    info!("Training on {} documents", documents.len());

    let outcome = train_and_evaluate(&documents, &config)?;
    save_model(&outcome.model, &args.output)
        .with_context(|| format!("Failed to save model to {}", args.output.display()))?;

    let summary = TrainingSummary {
        model_path: args.output.display().to_string(),
        documents: outcome.split.train.len() + outcome.split.test.len(),
        training_documents: outcome.split.train.len(),
        test_documents: outcome.split.test.len(),
        stratified: outcome.split.stratified,
        classes: outcome
            .model
            .labels()
            .into_iter()
            .map(str::to_string)
            .collect(),
        vocabulary_size: outcome.model.vocabulary().len(),
        alpha: outcome.model.alpha(),
        duration_ms: start_time.elapsed().as_millis() as u64,
        report: outcome.report,
    };
    output_result(&summary, &args.global)?;
    Ok(summary)
}
