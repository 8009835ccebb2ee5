//! Training configuration.
//!
//! Every field has a default, so a configuration file only needs to name the
//! values it changes:
//!
//! ```json
//! { "alpha": 0.5, "analyzer": { "lowercase": true } }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::AnalyzerSettings;
use crate::analysis::gram::GramExtractor;
use crate::corpus::CorpusFilter;
use crate::error::{CodelangError, Result};
use crate::ml::split::{DEFAULT_SEED, DEFAULT_TEST_RATIO};
use crate::ml::trainer::{DEFAULT_ALPHA, validate_alpha};

/// Settings for one training run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Additive smoothing constant, must be > 0
    pub alpha: f64,
    /// Fraction of documents held out for evaluation, in (0, 1)
    pub test_ratio: f64,
    /// Seed for the train/test shuffle
    pub seed: u64,
    /// Gram range and case handling
    pub analyzer: AnalyzerSettings,
    /// Worker threads; `None` uses one per CPU
    pub thread_pool_size: Option<usize>,
    /// Document quality filter applied after loading
    pub corpus_filter: CorpusFilter,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            alpha: DEFAULT_ALPHA,
            test_ratio: DEFAULT_TEST_RATIO,
            seed: DEFAULT_SEED,
            analyzer: AnalyzerSettings::default(),
            thread_pool_size: None,
            corpus_filter: CorpusFilter::default(),
        }
    }
}

impl TrainingConfig {
    /// Read a JSON configuration file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: TrainingConfig = serde_json::from_str(&content).map_err(|e| {
            CodelangError::invalid_config(format!(
                "Failed to parse configuration from '{}': {e}",
                path.display()
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value before any work starts.
    pub fn validate(&self) -> Result<()> {
        validate_alpha(self.alpha)?;
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err(CodelangError::invalid_config(format!(
                "test_ratio must be in (0, 1), got {}",
                self.test_ratio
            )));
        }
        if self.thread_pool_size == Some(0) {
            return Err(CodelangError::invalid_config(
                "thread_pool_size must be at least 1",
            ));
        }
        GramExtractor::new(self.analyzer.min_n, self.analyzer.max_n)?;
        if let (Some(min), Some(max)) = (self.corpus_filter.min_bytes, self.corpus_filter.max_bytes)
        {
            if min > max {
                return Err(CodelangError::invalid_config(format!(
                    "corpus_filter.min_bytes ({min}) exceeds max_bytes ({max})"
                )));
            }
        }
        Ok(())
    }
}
