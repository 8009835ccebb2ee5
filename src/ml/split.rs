//! Reproducible train/test partitioning.
//!
//! [`stratified_split`] holds out `round(n · ratio)` documents in total and
//! shares that quota among labels in proportion to their size. When some
//! label has fewer than two members, or the training side would be too small
//! to keep one member of every label, the split falls back to a plain seeded
//! shuffle and reports that through [`TrainTestSplit::stratified`].

use std::collections::BTreeMap;

use log::warn;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::{CodelangError, Result};

/// Default fraction of documents held out for testing.
pub const DEFAULT_TEST_RATIO: f64 = 0.2;

/// Default shuffling seed.
pub const DEFAULT_SEED: u64 = 42;

/// Indices of the training and test partitions, each sorted ascending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
    /// Whether per-label proportions were preserved
    pub stratified: bool,
}

impl TrainTestSplit {
    /// Borrow the items of each partition, in index order.
    pub fn select<'a, T>(&self, items: &'a [T]) -> (Vec<&'a T>, Vec<&'a T>) {
        (
            self.train.iter().map(|&i| &items[i]).collect(),
            self.test.iter().map(|&i| &items[i]).collect(),
        )
    }
}

fn validate(len: usize, test_ratio: f64) -> Result<()> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(CodelangError::invalid_config(format!(
            "test ratio must be in (0, 1), got {test_ratio}"
        )));
    }
    if len < 2 {
        return Err(CodelangError::invalid_input(format!(
            "need at least 2 documents to split, got {len}"
        )));
    }
    Ok(())
}

/// Size of the test share of `len` items, leaving both sides non-empty.
fn test_size(len: usize, test_ratio: f64) -> usize {
    ((len as f64 * test_ratio).round() as usize).clamp(1, len - 1)
}

fn finish(mut train: Vec<usize>, mut test: Vec<usize>, stratified: bool) -> TrainTestSplit {
    train.sort_unstable();
    test.sort_unstable();
    TrainTestSplit {
        train,
        test,
        stratified,
    }
}

/// Shuffle all indices with `seed` and hold out `round(n · test_ratio)`.
pub fn random_split(len: usize, test_ratio: f64, seed: u64) -> Result<TrainTestSplit> {
    validate(len, test_ratio)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..len).collect();
    indices.shuffle(&mut rng);

    let train = indices.split_off(test_size(len, test_ratio));
    Ok(finish(train, indices, false))
}

/// Share `n_test` among groups of the given sizes by largest remainder.
///
/// Each group first gets `floor(size · n_test / total)`; the leftover slots go
/// to the groups with the largest remainders, earlier groups first on ties.
/// A group never receives all of its members.
fn allocate(sizes: &[usize], n_test: usize) -> Vec<usize> {
    let total: usize = sizes.iter().sum();
    let mut quotas: Vec<usize> = sizes.iter().map(|&size| size * n_test / total).collect();

    let mut order: Vec<usize> = (0..sizes.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(sizes[i] * n_test % total));

    let mut leftover = n_test - quotas.iter().sum::<usize>();
    for &i in order.iter().cycle().take(order.len() * n_test) {
        if leftover == 0 {
            break;
        }
        if quotas[i] + 1 < sizes[i] {
            quotas[i] += 1;
            leftover -= 1;
        }
    }
    quotas
}

/// Split `labels` so the test set holds `round(n · test_ratio)` documents,
/// shared among labels in proportion to their counts. Every label keeps at
/// least one member on the training side.
///
/// Labels are visited in sorted order and shuffled from a single generator
/// seeded with `seed`, so the same labels, ratio and seed always give the
/// same partition.
pub fn stratified_split<L: AsRef<str>>(
    labels: &[L],
    test_ratio: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    validate(labels.len(), test_ratio)?;

    let mut members: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, label) in labels.iter().enumerate() {
        members.entry(label.as_ref()).or_default().push(i);
    }

    if let Some((label, indices)) = members.iter().find(|(_, indices)| indices.len() < 2) {
        warn!(
            "Label {label:?} has {} document(s); falling back to a non-stratified split",
            indices.len()
        );
        return random_split(labels.len(), test_ratio, seed);
    }

    let n_test = test_size(labels.len(), test_ratio);
    if labels.len() - n_test < members.len() {
        warn!(
            "{} training documents cannot cover {} labels; falling back to a non-stratified split",
            labels.len() - n_test,
            members.len()
        );
        return random_split(labels.len(), test_ratio, seed);
    }

    let sizes: Vec<usize> = members.values().map(Vec::len).collect();
    let quotas = allocate(&sizes, n_test);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::with_capacity(n_test);
    for (indices, n_label) in members.values_mut().zip(quotas) {
        indices.shuffle(&mut rng);
        test.extend_from_slice(&indices[..n_label]);
        train.extend_from_slice(&indices[n_label..]);
    }

    Ok(finish(train, test, true))
}
