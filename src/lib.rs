//! Loan approval prediction
//!
//! Two decoupled phases share a persisted artifact bundle:
//!
//! - [`training::Trainer`] fits label encoders and a soft-voting ensemble
//!   (logistic regression, random forest, gradient boosting) with
//!   grid-search tuning, and writes the bundle to disk.
//! - [`predictor::Predictor`] loads the bundle once and scores individual
//!   applications.
//!
//! The [`server`] module wraps the predictor in an HTTP API and a
//! form-based dashboard; the [`cli`] module exposes train/predict/serve
//! commands.

pub mod artifact;
pub mod cli;
pub mod data;
pub mod ensemble;
pub mod error;
pub mod predictor;
pub mod preprocessing;
pub mod server;
pub mod training;

pub use artifact::{ArtifactBundle, ArtifactStore};
pub use data::LoanRecord;
pub use error::{LoanPredictorError, Result};
pub use predictor::{Prediction, Predictor};
pub use training::{Trainer, TrainerConfig, TrainingReport};
