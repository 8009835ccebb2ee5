//! Versioned on-disk model artifacts.
//!
//! A model is stored as a single JSON document tagged with a format name and
//! a format version. Loading checks the tag before anything else and then
//! validates every shape the inference path relies on, so a stale or
//! hand-edited artifact is rejected with
//! [`CodelangError::VocabularyMismatch`] instead of producing wrong labels.
//!
//! Writes go to a temporary file in the destination directory which is then
//! renamed over the target.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::analysis::analyzer::{AnalyzerSettings, CodeAnalyzer};
use crate::error::{CodelangError, Result};
use crate::ml::model::{ClassModel, LanguageModel, ModelMetadata};
use crate::ml::trainer::validate_alpha;
use crate::ml::vectorizer::CountVectorizer;
use crate::ml::vocabulary::Vocabulary;

/// Format tag written into every artifact.
pub const MODEL_FORMAT: &str = "codelang-naive-bayes";

/// Current artifact layout version.
pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Deserialize)]
struct ModelHeader {
    format: String,
    version: u32,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SerializableModel {
    format: String,
    version: u32,
    analyzer: AnalyzerSettings,
    alpha: f64,
    classes: Vec<String>,
    priors: Vec<f64>,
    class_document_counts: Vec<usize>,
    vocabulary: BTreeMap<String, usize>,
    feature_log_prob: Vec<Vec<f64>>,
    metadata: ModelMetadata,
}

impl SerializableModel {
    fn from_model(model: &LanguageModel) -> Self {
        let classes = model.classes();
        SerializableModel {
            format: MODEL_FORMAT.to_string(),
            version: MODEL_FORMAT_VERSION,
            analyzer: *model.vectorizer().analyzer().settings(),
            alpha: model.alpha(),
            classes: classes.iter().map(|c| c.label.clone()).collect(),
            priors: classes.iter().map(|c| c.prior).collect(),
            class_document_counts: classes.iter().map(|c| c.document_count).collect(),
            vocabulary: model.vocabulary().to_table(),
            feature_log_prob: classes.iter().map(|c| c.feature_log_prob.clone()).collect(),
            metadata: model.metadata().clone(),
        }
    }

    fn into_model(self) -> Result<LanguageModel> {
        validate_alpha(self.alpha)
            .map_err(|_| CodelangError::vocabulary_mismatch(format!("invalid alpha {}", self.alpha)))?;

        let n_classes = self.classes.len();
        if n_classes == 0 {
            return Err(CodelangError::vocabulary_mismatch("model has no classes"));
        }
        if !self.classes.windows(2).all(|w| w[0] < w[1]) {
            return Err(CodelangError::vocabulary_mismatch(
                "class labels are not sorted and unique",
            ));
        }
        if self.priors.len() != n_classes
            || self.class_document_counts.len() != n_classes
            || self.feature_log_prob.len() != n_classes
        {
            return Err(CodelangError::vocabulary_mismatch(format!(
                "{n_classes} classes but {} priors, {} document counts, {} likelihood rows",
                self.priors.len(),
                self.class_document_counts.len(),
                self.feature_log_prob.len()
            )));
        }

        let vocabulary = Vocabulary::from_table(&self.vocabulary)?;
        let analyzer = CodeAnalyzer::new(&self.analyzer)
            .map_err(|e| CodelangError::vocabulary_mismatch(format!("analyzer settings: {e}")))?;

        let mut classes = Vec::with_capacity(n_classes);
        for (((label, prior), document_count), feature_log_prob) in self
            .classes
            .into_iter()
            .zip(self.priors)
            .zip(self.class_document_counts)
            .zip(self.feature_log_prob)
        {
            if !(prior > 0.0 && prior <= 1.0) {
                return Err(CodelangError::vocabulary_mismatch(format!(
                    "class {label:?} has prior {prior}"
                )));
            }
            if feature_log_prob.len() != vocabulary.len() {
                return Err(CodelangError::vocabulary_mismatch(format!(
                    "class {label:?} has {} likelihoods for a vocabulary of {}",
                    feature_log_prob.len(),
                    vocabulary.len()
                )));
            }
            if feature_log_prob.iter().any(|p| !p.is_finite()) {
                return Err(CodelangError::vocabulary_mismatch(format!(
                    "class {label:?} has a non-finite likelihood"
                )));
            }
            classes.push(ClassModel {
                label,
                prior,
                feature_log_prob,
                document_count,
            });
        }

        Ok(LanguageModel::from_parts(
            CountVectorizer::new(analyzer, vocabulary),
            self.alpha,
            classes,
            self.metadata,
        ))
    }
}

fn malformed(e: serde_json::Error) -> CodelangError {
    CodelangError::vocabulary_mismatch(format!("malformed model artifact: {e}"))
}

/// Persist a model to `path`, replacing any existing file atomically.
pub fn save_model<P: AsRef<Path>>(model: &LanguageModel, path: P) -> Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let temp_file = NamedTempFile::new_in(parent)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file());
        serde_json::to_writer(&mut writer, &SerializableModel::from_model(model))?;
        writer.flush()?;
    }
    temp_file.as_file().sync_all()?;
    temp_file.persist(path).map_err(|e| e.error)?;

    info!(
        "Saved model ({} classes, {} grams) to {}",
        model.classes().len(),
        model.vocabulary().len(),
        path.display()
    );
    Ok(())
}

/// Load and validate a model written by [`save_model`].
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<LanguageModel> {
    let path = path.as_ref();
    let mut content = String::new();
    BufReader::new(File::open(path)?).read_to_string(&mut content)?;
    let model = model_from_json(&content)?;
    debug!(
        "Loaded model from {} ({} classes, {} grams)",
        path.display(),
        model.classes().len(),
        model.vocabulary().len()
    );
    Ok(model)
}

/// Serialize a model to its artifact JSON.
pub fn model_to_json(model: &LanguageModel) -> Result<String> {
    Ok(serde_json::to_string(&SerializableModel::from_model(model))?)
}

/// Parse and validate artifact JSON.
pub fn model_from_json(content: &str) -> Result<LanguageModel> {
    let header: ModelHeader = serde_json::from_str(content).map_err(malformed)?;
    if header.format != MODEL_FORMAT {
        return Err(CodelangError::vocabulary_mismatch(format!(
            "expected format {MODEL_FORMAT:?}, found {:?}",
            header.format
        )));
    }
    if header.version != MODEL_FORMAT_VERSION {
        return Err(CodelangError::vocabulary_mismatch(format!(
            "expected format version {MODEL_FORMAT_VERSION}, found {}",
            header.version
        )));
    }

    let model: SerializableModel = serde_json::from_str(content).map_err(malformed)?;
    model.into_model()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::ml::model::predict;
    use crate::ml::trainer::NaiveBayesTrainer;
    use tempfile::TempDir;

    fn trained() -> LanguageModel {
        NaiveBayesTrainer::default()
            .train(&[
                Document::labeled("def foo(): pass  # note", "py"),
                Document::labeled("import os\nprint('hi')", "py"),
                Document::labeled("function foo(){ return 1; }", "js"),
                Document::labeled("const x = \"y\"; // c", "js"),
            ])
            .unwrap()
    }

    fn json_value(model: &LanguageModel) -> serde_json::Value {
        serde_json::from_str(&model_to_json(model).unwrap()).unwrap()
    }

    #[test]
    fn test_round_trip_is_exact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("model.json");
        let model = trained();
        save_model(&model, &path).unwrap();

        let loaded = load_model(&path).unwrap();
        assert_eq!(loaded.classes(), model.classes());
        assert_eq!(loaded.vocabulary(), model.vocabulary());
        assert_eq!(loaded.alpha(), model.alpha());
        assert_eq!(loaded.metadata(), model.metadata());

        for text in ["def bar(): pass", "function(){}", "", "SELECT 1"] {
            assert_eq!(
                predict(&loaded, text).unwrap(),
                predict(&model, text).unwrap()
            );
        }
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, "stale").unwrap();
        save_model(&trained(), &path).unwrap();
        assert!(load_model(&path).is_ok());
    }

    #[test]
    fn test_rejects_other_version() {
        let mut value = json_value(&trained());
        value["version"] = serde_json::json!(MODEL_FORMAT_VERSION + 1);
        let result = model_from_json(&value.to_string());
        assert!(matches!(result, Err(CodelangError::VocabularyMismatch(_))));
    }

    #[test]
    fn test_rejects_other_format() {
        let mut value = json_value(&trained());
        value["format"] = serde_json::json!("something-else");
        assert!(matches!(
            model_from_json(&value.to_string()),
            Err(CodelangError::VocabularyMismatch(_))
        ));
    }

    #[test]
    fn test_rejects_shape_mismatch() {
        let mut value = json_value(&trained());
        value["feature_log_prob"][0]
            .as_array_mut()
            .unwrap()
            .pop();
        assert!(matches!(
            model_from_json(&value.to_string()),
            Err(CodelangError::VocabularyMismatch(_))
        ));

        let mut value = json_value(&trained());
        value["priors"][0] = serde_json::json!(0.0);
        assert!(model_from_json(&value.to_string()).is_err());

        let mut value = json_value(&trained());
        value["extra"] = serde_json::json!(1);
        assert!(model_from_json(&value.to_string()).is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            model_from_json("not json"),
            Err(CodelangError::VocabularyMismatch(_))
        ));
        assert!(matches!(
            load_model("/nonexistent/codelang/model.json"),
            Err(CodelangError::Io(_))
        ));
    }
}
