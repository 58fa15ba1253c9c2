//! Cross-validation splitters

use crate::error::{LoanPredictorError, Result};
use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single train/validation split
#[derive(Debug, Clone)]
pub struct FoldSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold: usize,
}

/// K-fold splitter, plain or stratified
#[derive(Debug, Clone)]
pub struct CrossValidator {
    n_splits: usize,
    shuffle: bool,
    seed: Option<u64>,
}

impl CrossValidator {
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: true,
            seed: None,
        }
    }

    /// Set the shuffle seed for reproducible folds
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Disable shuffling (folds follow row order)
    pub fn without_shuffle(mut self) -> Self {
        self.shuffle = false;
        self
    }

    fn validate(&self, n_samples: usize) -> Result<()> {
        if self.n_splits < 2 {
            return Err(LoanPredictorError::ValidationError(
                "n_splits must be at least 2".to_string(),
            ));
        }
        if n_samples < self.n_splits {
            return Err(LoanPredictorError::ValidationError(format!(
                "n_samples ({}) must be >= n_splits ({})",
                n_samples, self.n_splits
            )));
        }
        Ok(())
    }

    fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    /// Plain k-fold splits
    pub fn split(&self, n_samples: usize) -> Result<Vec<FoldSplit>> {
        self.validate(n_samples)?;

        let mut indices: Vec<usize> = (0..n_samples).collect();
        if self.shuffle {
            indices.shuffle(&mut self.rng());
        }

        // Spread the remainder over the first folds
        let base = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;

        let mut splits = Vec::with_capacity(self.n_splits);
        let mut current = 0;

        for fold in 0..self.n_splits {
            let fold_size = if fold < remainder { base + 1 } else { base };
            let test_indices: Vec<usize> = indices[current..current + fold_size].to_vec();
            let train_indices: Vec<usize> = indices[..current]
                .iter()
                .chain(indices[current + fold_size..].iter())
                .copied()
                .collect();

            splits.push(FoldSplit {
                train_indices,
                test_indices,
                fold,
            });
            current += fold_size;
        }

        Ok(splits)
    }

    /// Stratified k-fold splits: each fold keeps the class distribution
    pub fn stratified_split(&self, y: &Array1<f64>) -> Result<Vec<FoldSplit>> {
        self.validate(y.len())?;

        // BTreeMap keeps class iteration order stable across runs
        let mut class_indices: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (idx, &val) in y.iter().enumerate() {
            class_indices.entry(val.round() as i64).or_default().push(idx);
        }

        let mut rng = self.rng();
        if self.shuffle {
            for indices in class_indices.values_mut() {
                indices.shuffle(&mut rng);
            }
        }

        let mut folds: Vec<Vec<usize>> = vec![Vec::new(); self.n_splits];
        for indices in class_indices.values() {
            for (i, &idx) in indices.iter().enumerate() {
                folds[i % self.n_splits].push(idx);
            }
        }

        let mut splits = Vec::with_capacity(self.n_splits);
        for fold in 0..self.n_splits {
            if folds[fold].is_empty() {
                return Err(LoanPredictorError::ValidationError(format!(
                    "fold {} is empty; too many splits for the data",
                    fold
                )));
            }
            let test_indices = folds[fold].clone();
            let train_indices: Vec<usize> = folds
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != fold)
                .flat_map(|(_, f)| f.iter().copied())
                .collect();

            splits.push(FoldSplit {
                train_indices,
                test_indices,
                fold,
            });
        }

        Ok(splits)
    }
}

/// Per-fold scores with their mean and spread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvScores {
    pub scores: Vec<f64>,
    pub mean: f64,
    pub std: f64,
}

impl CvScores {
    pub fn from_scores(scores: Vec<f64>) -> Self {
        let n = scores.len().max(1) as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;

        Self {
            scores,
            mean,
            std: variance.sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_k_fold_covers_all_indices() {
        let cv = CrossValidator::new(5).without_shuffle();
        let splits = cv.split(100).unwrap();

        assert_eq!(splits.len(), 5);
        for split in &splits {
            assert_eq!(split.test_indices.len(), 20);
            assert_eq!(split.train_indices.len(), 80);
        }

        let mut all_test: Vec<usize> = splits
            .iter()
            .flat_map(|s| s.test_indices.clone())
            .collect();
        all_test.sort();
        assert_eq!(all_test, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_k_fold_uneven() {
        let cv = CrossValidator::new(3).without_shuffle();
        let splits = cv.split(10).unwrap();

        let sizes: Vec<usize> = splits.iter().map(|s| s.test_indices.len()).collect();
        assert_eq!(sizes, vec![4, 3, 3]);
    }

    #[test]
    fn test_stratified_balance() {
        let y = Array1::from_vec(
            (0..20).map(|i| if i < 10 { 0.0 } else { 1.0 }).collect(),
        );
        let cv = CrossValidator::new(5).with_seed(42);
        let splits = cv.stratified_split(&y).unwrap();

        for split in &splits {
            let positives = split
                .test_indices
                .iter()
                .filter(|&&i| y[i] > 0.5)
                .count();
            assert_eq!(positives, 2);
            assert_eq!(split.test_indices.len(), 4);
        }
    }

    #[test]
    fn test_seeded_folds_are_reproducible() {
        let cv = CrossValidator::new(4).with_seed(7);
        let a = cv.split(40).unwrap();
        let b = cv.split(40).unwrap();

        for (sa, sb) in a.iter().zip(b.iter()) {
            assert_eq!(sa.test_indices, sb.test_indices);
        }
    }

    #[test]
    fn test_too_few_samples() {
        let cv = CrossValidator::new(5);
        assert!(cv.split(3).is_err());
    }

    #[test]
    fn test_cv_scores_aggregation() {
        let scores = CvScores::from_scores(vec![0.8, 0.9, 1.0]);
        assert!((scores.mean - 0.9).abs() < 1e-10);
        assert!(scores.std > 0.0);
    }
}
