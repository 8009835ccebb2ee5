//! Deterministic gram vocabulary.

use std::collections::BTreeMap;

use ahash::{AHashMap, AHashSet};
use rayon::prelude::*;

use crate::analysis::gram::Gram;
use crate::error::{CodelangError, Result};

/// Bidirectional gram ↔ index mapping, frozen once built.
///
/// Indices are contiguous from 0 and follow the lexicographic order of the
/// gram string form, so the same corpus always yields the same vocabulary no
/// matter how documents were distributed across worker threads.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Vocabulary {
    /// index -> gram key, sorted ascending
    grams: Vec<String>,
    /// gram key -> index
    index: AHashMap<String, usize>,
}

impl Vocabulary {
    /// Build the vocabulary of a whole corpus.
    ///
    /// Each worker collects the distinct grams of its share of documents; the
    /// per-worker sets are merged into one global set before any index is
    /// assigned.
    pub fn build(documents: &[Vec<Gram>]) -> Self {
        let distinct: AHashSet<String> = documents
            .par_iter()
            .fold(AHashSet::new, |mut set, grams| {
                set.extend(grams.iter().map(Gram::key));
                set
            })
            .reduce(AHashSet::new, |mut left, right| {
                left.extend(right);
                left
            });

        Self::from_keys(distinct)
    }

    /// Build a vocabulary from gram keys in any order, dropping duplicates.
    pub fn from_keys<I: IntoIterator<Item = String>>(keys: I) -> Self {
        let mut grams: Vec<String> = keys.into_iter().collect();
        grams.sort_unstable();
        grams.dedup();
        Self::from_sorted_unchecked(grams)
    }

    /// Rebuild a persisted gram → index table.
    ///
    /// The table must assign `0..n` to the grams in sorted order; anything
    /// else means the artifact was not produced by this vocabulary builder.
    pub fn from_table(table: &BTreeMap<String, usize>) -> Result<Self> {
        let mut grams = Vec::with_capacity(table.len());
        for (expected, (gram, &index)) in table.iter().enumerate() {
            if index != expected {
                return Err(CodelangError::vocabulary_mismatch(format!(
                    "gram {gram:?} has index {index}, expected {expected}"
                )));
            }
            grams.push(gram.clone());
        }
        Ok(Self::from_sorted_unchecked(grams))
    }

    fn from_sorted_unchecked(grams: Vec<String>) -> Self {
        let index = grams
            .iter()
            .enumerate()
            .map(|(i, gram)| (gram.clone(), i))
            .collect();
        Vocabulary { grams, index }
    }

    /// The persisted form: gram → index.
    pub fn to_table(&self) -> BTreeMap<String, usize> {
        self.grams
            .iter()
            .enumerate()
            .map(|(i, gram)| (gram.clone(), i))
            .collect()
    }

    /// Index of a gram key, if it is in the vocabulary.
    pub fn get(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Gram key at an index.
    pub fn gram(&self, index: usize) -> Option<&str> {
        self.grams.get(index).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.grams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grams.is_empty()
    }

    /// All gram keys in index order.
    pub fn grams(&self) -> &[String] {
        &self.grams
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.grams.iter().enumerate().map(|(i, g)| (i, g.as_str()))
    }
}
