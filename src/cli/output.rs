//! Output formatting for CLI commands.

use std::fmt;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::cli::args::{GlobalArgs, OutputFormat};
use crate::error::Result;
use crate::ml::evaluation::ClassificationReport;

/// Result of classifying one file.
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionOutput {
    pub file: String,
    pub label: String,
    /// Posterior probability per language, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<Vec<(String, f64)>>,
}

impl fmt::Display for PredictionOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.label)?;
        if let Some(probabilities) = &self.probabilities {
            let mut sorted = probabilities.clone();
            sorted.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            for (label, probability) in sorted {
                writeln!(f, "  {label:<12} {probability:.4}")?;
            }
        }
        Ok(())
    }
}

/// Result of a training run.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub model_path: String,
    pub documents: usize,
    pub training_documents: usize,
    pub test_documents: usize,
    pub stratified: bool,
    pub classes: Vec<String>,
    pub vocabulary_size: usize,
    pub alpha: f64,
    pub duration_ms: u64,
    pub report: ClassificationReport,
}

impl fmt::Display for TrainingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model saved to: {}", self.model_path)?;
        writeln!(
            f,
            "Documents: {} ({} train, {} test, {} split)",
            self.documents,
            self.training_documents,
            self.test_documents,
            if self.stratified { "stratified" } else { "random" }
        )?;
        writeln!(f, "Classes: {}", self.classes.join(", "))?;
        writeln!(f, "Vocabulary: {} grams", self.vocabulary_size)?;
        writeln!(f, "Alpha: {}", self.alpha)?;
        writeln!(f, "Training time: {} ms", self.duration_ms)?;
        writeln!(f)?;
        write!(f, "{}", self.report)
    }
}

/// Write a result in the requested format.
pub fn write_result<W, T>(out: &mut W, result: &T, args: &GlobalArgs) -> Result<()>
where
    W: Write,
    T: Serialize + fmt::Display,
{
    match args.output_format {
        OutputFormat::Human => write!(out, "{result}")?,
        OutputFormat::Json => {
            if args.pretty {
                serde_json::to_writer_pretty(&mut *out, result)?;
            } else {
                serde_json::to_writer(&mut *out, result)?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Print a result to standard output in the requested format.
pub fn output_result<T: Serialize + fmt::Display>(result: &T, args: &GlobalArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_result(&mut out, result, args)?;
    out.flush()?;
    Ok(())
}
