//! Exhaustive grid search with cross-validation

use super::cross_validation::{CrossValidator, CvScores};
use crate::ensemble::{EnsembleParams, SoftVotingClassifier};
use crate::error::{LoanPredictorError, Result};
use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Hyperparameter grid for the ensemble
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamGrid {
    /// Candidate tree counts for the random forest
    pub forest_trees: Vec<usize>,
    /// Candidate round counts for gradient boosting
    pub boosting_rounds: Vec<usize>,
    /// Candidate max depths for gradient boosting
    pub boosting_depth: Vec<usize>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            forest_trees: vec![100, 200],
            boosting_rounds: vec![100, 200],
            boosting_depth: vec![4, 6],
        }
    }
}

impl ParamGrid {
    /// Enumerate every parameter combination, in grid order
    pub fn candidates(&self, seed: u64) -> Vec<EnsembleParams> {
        let mut candidates = Vec::new();
        for &forest_trees in &self.forest_trees {
            for &boosting_rounds in &self.boosting_rounds {
                for &boosting_depth in &self.boosting_depth {
                    candidates.push(EnsembleParams {
                        forest_trees,
                        boosting_rounds,
                        boosting_depth,
                        seed,
                    });
                }
            }
        }
        candidates
    }
}

/// Winning parameters and their cross-validation scores
#[derive(Debug, Clone)]
pub struct GridSearchResult {
    pub params: EnsembleParams,
    pub cv: CvScores,
}

/// Exhaustive search over a [`ParamGrid`], scored by k-fold accuracy.
///
/// Candidates evaluate in parallel; every candidate sees the same seeded
/// stratified folds, and ties resolve to the earliest candidate in grid
/// order, so the outcome is independent of scheduling.
#[derive(Debug, Clone)]
pub struct GridSearch {
    grid: ParamGrid,
    cv_folds: usize,
    seed: u64,
}

impl GridSearch {
    pub fn new(grid: ParamGrid, cv_folds: usize, seed: u64) -> Self {
        Self {
            grid,
            cv_folds,
            seed,
        }
    }

    /// Run the search on training data with binary labels
    pub fn run(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<GridSearchResult> {
        let candidates = self.grid.candidates(self.seed);
        if candidates.is_empty() {
            return Err(LoanPredictorError::ValidationError(
                "parameter grid is empty".to_string(),
            ));
        }

        let splits = CrossValidator::new(self.cv_folds)
            .with_seed(self.seed)
            .stratified_split(y)?;

        info!(
            candidates = candidates.len(),
            folds = splits.len(),
            "starting grid search"
        );

        let scored: Vec<CvScores> = candidates
            .par_iter()
            .map(|params| {
                let fold_scores: Result<Vec<f64>> = splits
                    .iter()
                    .map(|split| {
                        let x_train = x.select(Axis(0), &split.train_indices);
                        let y_train: Array1<f64> = Array1::from_vec(
                            split.train_indices.iter().map(|&i| y[i]).collect(),
                        );
                        let x_val = x.select(Axis(0), &split.test_indices);
                        let y_val: Array1<f64> = Array1::from_vec(
                            split.test_indices.iter().map(|&i| y[i]).collect(),
                        );

                        let mut model = SoftVotingClassifier::new(params.clone());
                        model.fit(&x_train, &y_train)?;
                        model.accuracy(&x_val, &y_val)
                    })
                    .collect();

                Ok(CvScores::from_scores(fold_scores?))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut best = 0;
        for (i, scores) in scored.iter().enumerate() {
            if scores.mean > scored[best].mean {
                best = i;
            }
        }

        info!(
            forest_trees = candidates[best].forest_trees,
            boosting_rounds = candidates[best].boosting_rounds,
            boosting_depth = candidates[best].boosting_depth,
            cv_accuracy = scored[best].mean,
            "grid search finished"
        );

        Ok(GridSearchResult {
            params: candidates[best].clone(),
            cv: scored[best].clone(),
        })
    }
}
