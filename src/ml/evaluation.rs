//! Classification quality metrics.
//!
//! A [`ClassificationReport`] compares gold labels with predicted labels and
//! holds the confusion matrix together with per-class precision, recall and
//! F1. Ratios with a zero denominator are reported as 0.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CodelangError, Result};

/// Precision, recall and F1 for one class (or one average).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of gold occurrences
    pub support: usize,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn harmonic_mean(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Evaluation of a set of predictions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Sorted union of gold and predicted labels
    pub labels: Vec<String>,
    /// `confusion[g][p]`: documents with gold label `labels[g]` predicted as `labels[p]`
    pub confusion: Vec<Vec<usize>>,
    /// Per-class metrics in label order
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
    /// Number of evaluated documents
    pub total: usize,
}

impl ClassificationReport {
    /// Build a report from paired gold/predicted labels.
    pub fn from_predictions<G, P>(gold: &[G], predicted: &[P]) -> Result<Self>
    where
        G: AsRef<str>,
        P: AsRef<str>,
    {
        if gold.len() != predicted.len() {
            return Err(CodelangError::invalid_input(format!(
                "{} gold labels but {} predictions",
                gold.len(),
                predicted.len()
            )));
        }

        let labels: Vec<String> = gold
            .iter()
            .map(AsRef::as_ref)
            .chain(predicted.iter().map(AsRef::as_ref))
            .collect::<BTreeSet<&str>>()
            .into_iter()
            .map(str::to_string)
            .collect();
        let position = |label: &str| {
            labels
                .binary_search_by(|l| l.as_str().cmp(label))
                .unwrap_or_default()
        };

        let mut confusion = vec![vec![0usize; labels.len()]; labels.len()];
        for (g, p) in gold.iter().zip(predicted) {
            confusion[position(g.as_ref())][position(p.as_ref())] += 1;
        }

        let total = gold.len();
        let correct: usize = (0..labels.len()).map(|i| confusion[i][i]).sum();

        let classes: Vec<ClassMetrics> = labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let true_positive = confusion[i][i];
                let support: usize = confusion[i].iter().sum();
                let predicted_count: usize = confusion.iter().map(|row| row[i]).sum();
                let precision = ratio(true_positive, predicted_count);
                let recall = ratio(true_positive, support);
                ClassMetrics {
                    label: label.clone(),
                    precision,
                    recall,
                    f1: harmonic_mean(precision, recall),
                    support,
                }
            })
            .collect();

        let macro_avg = Self::average("macro avg", &classes, |_| 1.0);
        let weighted_avg = Self::average("weighted avg", &classes, |c| c.support as f64);

        Ok(ClassificationReport {
            labels,
            confusion,
            classes,
            accuracy: ratio(correct, total),
            macro_avg,
            weighted_avg,
            total,
        })
    }

    fn average<F>(name: &str, classes: &[ClassMetrics], weight: F) -> ClassMetrics
    where
        F: Fn(&ClassMetrics) -> f64,
    {
        let total_weight: f64 = classes.iter().map(&weight).sum();
        let mean = |metric: fn(&ClassMetrics) -> f64| {
            if total_weight == 0.0 {
                0.0
            } else {
                classes.iter().map(|c| weight(c) * metric(c)).sum::<f64>() / total_weight
            }
        };
        ClassMetrics {
            label: name.to_string(),
            precision: mean(|c| c.precision),
            recall: mean(|c| c.recall),
            f1: mean(|c| c.f1),
            support: classes.iter().map(|c| c.support).sum(),
        }
    }

    /// Metrics for one label.
    pub fn class(&self, label: &str) -> Option<&ClassMetrics> {
        self.classes.iter().find(|c| c.label == label)
    }

    /// Confusion count for a (gold, predicted) pair.
    pub fn confusion_count(&self, gold: &str, predicted: &str) -> usize {
        let g = self.labels.iter().position(|l| l == gold);
        let p = self.labels.iter().position(|l| l == predicted);
        match (g, p) {
            (Some(g), Some(p)) => self.confusion[g][p],
            _ => 0,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .labels
            .iter()
            .map(String::len)
            .chain(["weighted avg".len()])
            .max()
            .unwrap_or(0);

        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for class in &self.classes {
            write_metrics(f, class, width)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.total
        )?;
        write_metrics(f, &self.macro_avg, width)?;
        write_metrics(f, &self.weighted_avg, width)?;

        writeln!(f)?;
        writeln!(f, "Confusion matrix (rows: actual, columns: predicted)")?;
        let cell = self
            .confusion
            .iter()
            .flatten()
            .map(|n| n.to_string().len())
            .chain(self.labels.iter().map(String::len))
            .max()
            .unwrap_or(1);
        write!(f, "{:>width$}", "")?;
        for label in &self.labels {
            write!(f, " {label:>cell$}")?;
        }
        writeln!(f)?;
        for (label, row) in self.labels.iter().zip(&self.confusion) {
            write!(f, "{label:>width$}")?;
            for count in row {
                write!(f, " {count:>cell$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn write_metrics(f: &mut fmt::Formatter<'_>, metrics: &ClassMetrics, width: usize) -> fmt::Result {
    writeln!(
        f,
        "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
        metrics.label, metrics.precision, metrics.recall, metrics.f1, metrics.support
    )
}
