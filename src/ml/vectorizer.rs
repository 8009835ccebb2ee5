//! Sparse gram count vectorizer.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::CodeAnalyzer;
use crate::analysis::gram::Gram;
use crate::error::Result;
use crate::ml::vocabulary::Vocabulary;

/// Sparse mapping from vocabulary index to a positive count.
///
/// Entries are kept sorted by index and zero counts are never stored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector {
    entries: Vec<(usize, u32)>,
}

impl FeatureVector {
    /// Build from an index -> count map, dropping zero counts.
    pub fn from_counts(counts: BTreeMap<usize, u32>) -> Self {
        FeatureVector {
            entries: counts.into_iter().filter(|&(_, c)| c > 0).collect(),
        }
    }

    /// Count at an index (0 when absent).
    pub fn get(&self, index: usize) -> u32 {
        self.entries
            .binary_search_by_key(&index, |&(i, _)| i)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0)
    }

    /// Nonzero `(index, count)` pairs in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.entries.iter().copied()
    }

    /// Number of nonzero entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|&(_, c)| c as u64).sum()
    }

    /// Largest stored index, if any.
    pub fn max_index(&self) -> Option<usize> {
        self.entries.last().map(|&(i, _)| i)
    }
}

/// Turns documents into [`FeatureVector`]s over a frozen [`Vocabulary`].
///
/// Grams missing from the vocabulary are dropped; the vocabulary never grows
/// after fitting.
#[derive(Clone, Debug)]
pub struct CountVectorizer {
    analyzer: CodeAnalyzer,
    vocabulary: Vocabulary,
}

impl CountVectorizer {
    /// Wrap an existing vocabulary.
    pub fn new(analyzer: CodeAnalyzer, vocabulary: Vocabulary) -> Self {
        CountVectorizer {
            analyzer,
            vocabulary,
        }
    }

    /// Learn the vocabulary of `texts` and return the vectorizer together with
    /// the vector of every text, in input order.
    ///
    /// All documents are analyzed in parallel; the vocabulary is then frozen
    /// in a single reduction, and only afterwards are vectors produced.
    pub fn fit_transform<S: AsRef<str> + Sync>(
        analyzer: CodeAnalyzer,
        texts: &[S],
    ) -> Result<(Self, Vec<FeatureVector>)> {
        let analyzed: Vec<Vec<Gram>> = texts
            .par_iter()
            .map(|text| analyzer.analyze(text.as_ref()))
            .collect::<Result<_>>()?;

        let vocabulary = Vocabulary::build(&analyzed);
        let vectorizer = CountVectorizer::new(analyzer, vocabulary);
        let vectors = analyzed
            .par_iter()
            .map(|grams| vectorizer.transform_grams(grams))
            .collect();

        Ok((vectorizer, vectors))
    }

    pub fn analyzer(&self) -> &CodeAnalyzer {
        &self.analyzer
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Count the in-vocabulary grams of an already analyzed document.
    pub fn transform_grams(&self, grams: &[Gram]) -> FeatureVector {
        let mut counts: BTreeMap<usize, u32> = BTreeMap::new();
        for gram in grams {
            if let Some(index) = self.vocabulary.get(&gram.key()) {
                *counts.entry(index).or_insert(0) += 1;
            }
        }
        FeatureVector::from_counts(counts)
    }

    /// Analyze and vectorize raw text.
    pub fn transform(&self, text: &str) -> Result<FeatureVector> {
        let grams = self.analyzer.analyze(text)?;
        Ok(self.transform_grams(&grams))
    }

    /// Vectorize many texts in parallel, preserving input order.
    pub fn transform_batch<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Result<Vec<FeatureVector>> {
        texts
            .par_iter()
            .map(|text| self.transform(text.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted() -> (CountVectorizer, Vec<FeatureVector>) {
        CountVectorizer::fit_transform(
            CodeAnalyzer::default(),
            &["def foo(): pass", "function foo(){}"],
        )
        .unwrap()
    }

    #[test]
    fn test_fit_transform() {
        let (vectorizer, vectors) = fitted();
        let vocab = vectorizer.vocabulary();
        assert!(vocab.contains("def foo"));
        assert!(vocab.contains("function"));
        assert_eq!(vectors.len(), 2);

        let first = &vectors[0];
        assert_eq!(first.get(vocab.get("def").unwrap()), 1);
        assert_eq!(first.get(vocab.get("function").unwrap()), 0);
        assert!(first.max_index().unwrap() < vocab.len());
    }

    #[test]
    fn test_counts_repeated_grams() {
        let (vectorizer, _) = fitted();
        let vector = vectorizer.transform("foo foo foo").unwrap();
        let foo = vectorizer.vocabulary().get("foo").unwrap();
        assert_eq!(vector.get(foo), 3);
        // "foo foo" was never seen during fitting.
        assert_eq!(vector.nnz(), 1);
        assert_eq!(vector.total(), 3);
    }

    #[test]
    fn test_out_of_vocabulary_dropped() {
        let (vectorizer, _) = fitted();
        let before = vectorizer.vocabulary().len();
        let vector = vectorizer.transform("SELECT x FROM y").unwrap();
        assert!(vector.is_empty());
        assert_eq!(vectorizer.vocabulary().len(), before);
    }

    #[test]
    fn test_order_invariance() {
        let (vectorizer, _) = fitted();
        let mut grams = vectorizer.analyzer().analyze("def foo(): pass foo").unwrap();
        let forward = vectorizer.transform_grams(&grams);
        grams.reverse();
        let backward = vectorizer.transform_grams(&grams);
        grams.sort();
        let sorted = vectorizer.transform_grams(&grams);
        assert_eq!(forward, backward);
        assert_eq!(forward, sorted);
    }

    #[test]
    fn test_transform_batch() {
        let (vectorizer, vectors) = fitted();
        let batch = vectorizer
            .transform_batch(&["def foo(): pass", "function foo(){}"])
            .unwrap();
        assert_eq!(batch, vectors);
    }

    #[test]
    fn test_from_counts_drops_zeros() {
        let mut counts = BTreeMap::new();
        counts.insert(3, 0);
        counts.insert(1, 2);
        let vector = FeatureVector::from_counts(counts);
        assert_eq!(vector.iter().collect::<Vec<_>>(), vec![(1, 2)]);
    }
}
