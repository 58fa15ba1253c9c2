//! Random forest classifier

use super::decision_tree::DecisionTree;
use crate::error::{LoanPredictorError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Feature subset size per tree
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// Square root of the feature count
    Sqrt,
    /// Fixed number
    Fixed(usize),
    /// Every feature
    All,
}

impl MaxFeatures {
    fn resolve(self, n_features: usize) -> usize {
        match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().ceil() as usize,
            MaxFeatures::Fixed(n) => n.min(n_features),
            MaxFeatures::All => n_features,
        }
        .max(1)
    }
}

/// Bagged decision tree classifier.
///
/// Each tree trains on a seeded bootstrap sample over a seeded feature
/// subset; the positive-class probability is the fraction of trees voting
/// for approval. Seeds derive from `seed + tree index`, so results do not
/// depend on the parallel build order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    columns_per_tree: Vec<Vec<usize>>,
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub seed: u64,
}

impl RandomForest {
    /// Create a new classifier forest
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            columns_per_tree: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            seed: 42,
        }
    }

    /// Set maximum tree depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set the per-tree feature subset strategy
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fit the forest
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(LoanPredictorError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if self.n_estimators == 0 {
            return Err(LoanPredictorError::ValidationError(
                "forest needs at least one tree".to_string(),
            ));
        }

        let subset_size = self.max_features.resolve(n_features);

        let fitted: Vec<(DecisionTree, Vec<usize>)> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(tree_idx as u64));

                let rows: Vec<usize> = (0..n_samples)
                    .map(|_| (rng.next_u64() as usize) % n_samples)
                    .collect();

                let mut columns: Vec<usize> = (0..n_features).collect();
                columns.shuffle(&mut rng);
                columns.truncate(subset_size);
                columns.sort_unstable();

                let x_boot = x.select(Axis(0), &rows).select(Axis(1), &columns);
                let y_boot: Array1<f64> =
                    Array1::from_vec(rows.iter().map(|&i| y[i]).collect());

                let mut tree = DecisionTree::new_classifier()
                    .with_min_samples_split(self.min_samples_split)
                    .with_min_samples_leaf(self.min_samples_leaf);
                if let Some(depth) = self.max_depth {
                    tree = tree.with_max_depth(depth);
                }

                tree.fit(&x_boot, &y_boot)?;
                Ok((tree, columns))
            })
            .collect::<Result<Vec<_>>>()?;

        let (trees, columns_per_tree) = fitted.into_iter().unzip();
        self.trees = trees;
        self.columns_per_tree = columns_per_tree;
        Ok(self)
    }

    /// Positive-class probability: fraction of trees voting for class 1
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(LoanPredictorError::ModelNotFitted);
        }

        let votes: Vec<Array1<f64>> = self
            .trees
            .par_iter()
            .zip(self.columns_per_tree.par_iter())
            .map(|(tree, columns)| {
                let x_sub = x.select(Axis(1), columns);
                tree.predict(&x_sub)
            })
            .collect::<Result<Vec<_>>>()?;

        let n_samples = x.nrows();
        let mut proba = Array1::zeros(n_samples);
        for tree_votes in &votes {
            for i in 0..n_samples {
                if tree_votes[i] > 0.5 {
                    proba[i] += 1.0;
                }
            }
        }
        proba /= self.trees.len() as f64;

        Ok(proba)
    }

    /// Class labels via the 0.5 threshold
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p > 0.5 { 1.0 } else { 0.0 }))
    }

    /// Number of fitted trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable_data() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [0.0, 0.1],
            [0.1, 0.0],
            [0.2, 0.2],
            [0.1, 0.1],
            [1.0, 1.1],
            [1.1, 1.0],
            [0.9, 0.9],
            [1.0, 1.0],
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    #[test]
    fn test_classifier_accuracy() {
        let (x, y) = separable_data();
        let mut forest = RandomForest::new(25).with_seed(42);
        forest.fit(&x, &y).unwrap();

        let predictions = forest.predict(&x).unwrap();
        let correct = predictions
            .iter()
            .zip(y.iter())
            .filter(|(p, a)| (*p - *a).abs() < 0.5)
            .count();
        assert!(correct >= 7, "only {} correct", correct);
    }

    #[test]
    fn test_proba_in_range() {
        let (x, y) = separable_data();
        let mut forest = RandomForest::new(10).with_seed(42);
        forest.fit(&x, &y).unwrap();

        for p in forest.predict_proba(&x).unwrap() {
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_seeded_determinism() {
        let (x, y) = separable_data();

        let mut a = RandomForest::new(15).with_seed(7);
        let mut b = RandomForest::new(15).with_seed(7);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        let pa = a.predict_proba(&x).unwrap();
        let pb = b.predict_proba(&x).unwrap();
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_unfitted() {
        let forest = RandomForest::new(5);
        assert!(matches!(
            forest.predict_proba(&array![[1.0, 2.0]]).unwrap_err(),
            LoanPredictorError::ModelNotFitted
        ));
    }
}
