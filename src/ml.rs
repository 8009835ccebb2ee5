//! Naive Bayes language classification.
//!
//! The pieces, in the order a training run uses them:
//!
//! - [`vocabulary`] and [`vectorizer`]: gram counting over a frozen vocabulary
//! - [`split`]: reproducible (stratified) train/test partitioning
//! - [`trainer`]: multinomial naive Bayes estimation
//! - [`model`]: the trained model and inference
//! - [`evaluation`]: precision/recall/F1 and the confusion matrix
//! - [`model_store`]: versioned JSON persistence

pub mod evaluation;
pub mod model;
pub mod model_store;
pub mod split;
pub mod trainer;
pub mod vectorizer;
pub mod vocabulary;

pub use evaluation::{ClassMetrics, ClassificationReport};
pub use model::{ClassModel, LanguageModel, ModelMetadata, Prediction, predict};
pub use model_store::{load_model, save_model};
pub use split::{TrainTestSplit, random_split, stratified_split};
pub use trainer::NaiveBayesTrainer;
pub use vectorizer::{CountVectorizer, FeatureVector};
pub use vocabulary::Vocabulary;
