//! Offline training pipeline
//!
//! Load the dataset, drop incomplete rows, encode categoricals and the
//! target, split train/test, grid-search the ensemble, refit the winner,
//! and persist the artifact bundle.

use super::grid_search::{GridSearch, ParamGrid};
use super::cross_validation::CvScores;
use crate::artifact::{ArtifactBundle, ArtifactStore};
use crate::data::{drop_incomplete_rows, load_csv, CATEGORICAL_COLUMNS, ID_COLUMN, TARGET_COLUMN};
use crate::ensemble::{EnsembleParams, SoftVotingClassifier};
use crate::error::{LoanPredictorError, Result};
use crate::preprocessing::LabelEncoder;
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use tracing::info;

/// Trainer configuration. Paths are explicit; nothing resolves against
/// the process working directory implicitly.
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// CSV dataset to train on
    pub dataset_path: PathBuf,
    /// Directory receiving the artifact bundle
    pub artifact_dir: PathBuf,
    /// Held-out fraction for the final accuracy estimate
    pub test_fraction: f64,
    /// Seed for the split, folds, and all model randomness
    pub seed: u64,
    /// Cross-validation folds for the grid search
    pub cv_folds: usize,
    /// Hyperparameter grid
    pub grid: ParamGrid,
}

impl TrainerConfig {
    pub fn new(dataset_path: impl Into<PathBuf>, artifact_dir: impl Into<PathBuf>) -> Self {
        Self {
            dataset_path: dataset_path.into(),
            artifact_dir: artifact_dir.into(),
            test_fraction: 0.2,
            seed: 42,
            cv_folds: 5,
            grid: ParamGrid::default(),
        }
    }
}

/// Summary of a training run
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub n_rows: usize,
    pub n_features: usize,
    pub best_params: EnsembleParams,
    pub cv: CvScores,
    pub test_accuracy: f64,
}

/// The offline trainer
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    /// Run the full pipeline and persist the artifact bundle
    pub fn run(&self) -> Result<TrainingReport> {
        let raw = load_csv(&self.config.dataset_path)?;
        let mut df = drop_incomplete_rows(&raw)?;
        let dropped = raw.height() - df.height();

        if df.height() == 0 {
            return Err(LoanPredictorError::TrainingError(
                "dataset is empty after dropping incomplete rows".to_string(),
            ));
        }
        info!(
            rows = df.height(),
            dropped_rows = dropped,
            "loaded training data"
        );

        // Every expected categorical column must be present; a missing one
        // would otherwise produce a predictor that fails on every request.
        let mut encoders = Vec::with_capacity(CATEGORICAL_COLUMNS.len());
        for column in CATEGORICAL_COLUMNS {
            let mut encoder = LabelEncoder::new(column);
            encoder.fit(&df)?;
            df = encoder.transform_column(&df)?;
            encoders.push(encoder);
        }

        let mut target_encoder = LabelEncoder::new(TARGET_COLUMN);
        target_encoder.fit(&df)?;
        if target_encoder.classes().len() != 2 {
            return Err(LoanPredictorError::TrainingError(format!(
                "target column '{}' must have exactly two classes, found {:?}",
                TARGET_COLUMN,
                target_encoder.classes()
            )));
        }
        let df = target_encoder.transform_column(&df)?;

        let feature_columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .filter(|name| name.as_str() != ID_COLUMN && name.as_str() != TARGET_COLUMN)
            .collect();

        let x = columns_to_matrix(&df, &feature_columns)?;
        let y = column_to_vector(&df, TARGET_COLUMN)?;

        let (train_indices, test_indices) =
            shuffle_split(x.nrows(), self.config.test_fraction, self.config.seed)?;

        let x_train = x.select(Axis(0), &train_indices);
        let y_train: Array1<f64> =
            Array1::from_vec(train_indices.iter().map(|&i| y[i]).collect());
        let x_test = x.select(Axis(0), &test_indices);
        let y_test: Array1<f64> =
            Array1::from_vec(test_indices.iter().map(|&i| y[i]).collect());

        let search = GridSearch::new(self.config.grid.clone(), self.config.cv_folds, self.config.seed);
        let outcome = search.run(&x_train, &y_train)?;

        let mut model = SoftVotingClassifier::new(outcome.params.clone());
        model.fit(&x_train, &y_train)?;
        let test_accuracy = model.accuracy(&x_test, &y_test)?;

        info!(
            test_accuracy,
            cv_accuracy = outcome.cv.mean,
            "training finished"
        );

        let bundle = ArtifactBundle {
            feature_columns: feature_columns.clone(),
            encoders,
            target_encoder,
            model,
        };
        let store = ArtifactStore::new(&self.config.artifact_dir);
        store.save(&bundle)?;
        info!(dir = %store.dir().display(), "artifacts saved");

        Ok(TrainingReport {
            n_rows: x.nrows(),
            n_features: feature_columns.len(),
            best_params: outcome.params,
            cv: outcome.cv,
            test_accuracy,
        })
    }
}

/// Extract named columns into a row-major feature matrix
fn columns_to_matrix(df: &DataFrame, columns: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = columns.len();

    let col_data: Vec<Vec<f64>> = columns
        .iter()
        .map(|name| {
            let series = df
                .column(name)
                .map_err(|_| LoanPredictorError::FeatureNotFound(name.clone()))?
                .cast(&DataType::Float64)
                .map_err(|e| LoanPredictorError::DataError(e.to_string()))?;
            let values: Vec<f64> = series
                .f64()
                .map_err(|e| LoanPredictorError::DataError(e.to_string()))?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            Ok(values)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
        col_data[c][r]
    }))
}

fn column_to_vector(df: &DataFrame, column: &str) -> Result<Array1<f64>> {
    let series = df
        .column(column)
        .map_err(|_| LoanPredictorError::FeatureNotFound(column.to_string()))?
        .cast(&DataType::Float64)
        .map_err(|e| LoanPredictorError::DataError(e.to_string()))?;
    Ok(series
        .f64()
        .map_err(|e| LoanPredictorError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect())
}

/// Seeded shuffle split into (train, test) index sets
fn shuffle_split(n: usize, test_fraction: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(0.0..1.0).contains(&test_fraction) {
        return Err(LoanPredictorError::ValidationError(format!(
            "test_fraction must be in [0, 1), got {}",
            test_fraction
        )));
    }

    let n_test = ((n as f64) * test_fraction).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(LoanPredictorError::TrainingError(format!(
            "{} rows are not enough for a {:.0}% test split",
            n,
            test_fraction * 100.0
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test = indices[..n_test].to_vec();
    let train = indices[n_test..].to_vec();
    Ok((train, test))
}
