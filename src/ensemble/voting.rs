//! Soft-voting classifier
//!
//! Averages the positive-class probabilities of three members: logistic
//! regression on standardized features, a random forest, and gradient
//! boosted trees. The scaler is fit on whatever data `fit` receives, so
//! cross-validation folds never leak into member standardization.

use crate::error::{LoanPredictorError, Result};
use crate::preprocessing::StandardScaler;
use crate::training::{
    GradientBoostingClassifier, GradientBoostingConfig, LogisticRegression, RandomForest,
};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Hyperparameters of the three-member ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleParams {
    /// Trees in the random forest
    pub forest_trees: usize,
    /// Boosting rounds
    pub boosting_rounds: usize,
    /// Maximum boosted tree depth
    pub boosting_depth: usize,
    /// Shared random seed
    pub seed: u64,
}

impl Default for EnsembleParams {
    fn default() -> Self {
        Self {
            forest_trees: 100,
            boosting_rounds: 100,
            boosting_depth: 6,
            seed: 42,
        }
    }
}

/// A fitted ensemble member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VotingMember {
    Logistic {
        scaler: StandardScaler,
        model: LogisticRegression,
    },
    Forest(RandomForest),
    Boosted(GradientBoostingClassifier),
}

impl VotingMember {
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            VotingMember::Logistic { scaler, model } => {
                model.predict_proba(&scaler.transform(x)?)
            }
            VotingMember::Forest(forest) => forest.predict_proba(x),
            VotingMember::Boosted(boosted) => boosted.predict_proba(x),
        }
    }
}

/// Soft-voting ensemble over the three members
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftVotingClassifier {
    params: EnsembleParams,
    members: Vec<VotingMember>,
}

impl SoftVotingClassifier {
    /// Create an unfitted ensemble
    pub fn new(params: EnsembleParams) -> Self {
        Self {
            params,
            members: Vec::new(),
        }
    }

    /// Hyperparameters this ensemble was configured with
    pub fn params(&self) -> &EnsembleParams {
        &self.params
    }

    /// Fit all three members on binary labels (0/1)
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        if x.nrows() != y.len() {
            return Err(LoanPredictorError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }

        let mut scaler = StandardScaler::new();
        let x_scaled = scaler.fit_transform(x)?;
        let mut logistic = LogisticRegression::new();
        logistic.fit(&x_scaled, y)?;

        let mut forest =
            RandomForest::new(self.params.forest_trees).with_seed(self.params.seed);
        forest.fit(x, y)?;

        let boosting_config = GradientBoostingConfig {
            n_estimators: self.params.boosting_rounds,
            max_depth: self.params.boosting_depth,
            seed: self.params.seed,
            ..Default::default()
        };
        let mut boosted = GradientBoostingClassifier::new(boosting_config);
        boosted.fit(x, y)?;

        self.members = vec![
            VotingMember::Logistic {
                scaler,
                model: logistic,
            },
            VotingMember::Forest(forest),
            VotingMember::Boosted(boosted),
        ];
        Ok(self)
    }

    /// Positive-class probability: unweighted average across members
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.members.is_empty() {
            return Err(LoanPredictorError::ModelNotFitted);
        }

        let mut total: Array1<f64> = Array1::zeros(x.nrows());
        for member in &self.members {
            total = total + member.predict_proba(x)?;
        }
        Ok(total / self.members.len() as f64)
    }

    /// Class labels via the 0.5 threshold
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p > 0.5 { 1.0 } else { 0.0 }))
    }

    /// Classification accuracy against known labels
    pub fn accuracy(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        if y.is_empty() {
            return Err(LoanPredictorError::ValidationError(
                "cannot score on empty data".to_string(),
            ));
        }

        let predictions = self.predict(x)?;
        let correct = predictions
            .iter()
            .zip(y.iter())
            .filter(|(p, a)| (*p - *a).abs() < 0.5)
            .count();
        Ok(correct as f64 / y.len() as f64)
    }
}
