//! Artifact bundle persistence
//!
//! The trainer writes three binary files into a configured directory and
//! the predictor reads them back: the fitted ensemble (with the feature
//! column order it was trained on), the per-column label encoders, and
//! the target encoder. Each file holds a version-tagged payload encoded
//! with postcard; an unknown version tag or undecodable payload fails at
//! load time instead of silently skewing trainer and predictor.

use crate::ensemble::SoftVotingClassifier;
use crate::error::{LoanPredictorError, Result};
use crate::preprocessing::LabelEncoder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Ensemble model artifact file
pub const MODEL_FILE: &str = "loan_model.bin";
/// Per-column label encoder artifact file
pub const ENCODERS_FILE: &str = "label_encoders.bin";
/// Target encoder artifact file
pub const TARGET_ENCODER_FILE: &str = "target_encoder.bin";

/// Version-tagged model payload. New format versions add variants; older
/// readers reject unknown discriminants at decode time.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum ModelPayload {
    V1 {
        feature_columns: Vec<String>,
        model: SoftVotingClassifier,
    },
}

/// Version-tagged feature encoder payload
#[derive(Debug, Clone, Serialize, Deserialize)]
enum EncodersPayload {
    V1 { encoders: Vec<LabelEncoder> },
}

/// Version-tagged target encoder payload
#[derive(Debug, Clone, Serialize, Deserialize)]
enum TargetPayload {
    V1 { encoder: LabelEncoder },
}

/// Everything the predictor needs, as one unit of deployment
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    /// Feature columns in the exact order used at training
    pub feature_columns: Vec<String>,
    /// One encoder per categorical feature column
    pub encoders: Vec<LabelEncoder>,
    /// Encoder for the approval label
    pub target_encoder: LabelEncoder,
    /// The fitted voting ensemble
    pub model: SoftVotingClassifier,
}

/// Filesystem location of the artifact bundle
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Point the store at a directory (created on save if absent)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the three artifact files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist a bundle, overwriting any previous artifacts
    pub fn save(&self, bundle: &ArtifactBundle) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        self.write_payload(
            MODEL_FILE,
            &ModelPayload::V1 {
                feature_columns: bundle.feature_columns.clone(),
                model: bundle.model.clone(),
            },
        )?;
        self.write_payload(
            ENCODERS_FILE,
            &EncodersPayload::V1 {
                encoders: bundle.encoders.clone(),
            },
        )?;
        self.write_payload(
            TARGET_ENCODER_FILE,
            &TargetPayload::V1 {
                encoder: bundle.target_encoder.clone(),
            },
        )?;

        Ok(())
    }

    /// Load and validate the bundle
    pub fn load(&self) -> Result<ArtifactBundle> {
        let ModelPayload::V1 {
            feature_columns,
            model,
        } = self.read_payload(MODEL_FILE)?;
        let EncodersPayload::V1 { encoders } = self.read_payload(ENCODERS_FILE)?;
        let TargetPayload::V1 {
            encoder: target_encoder,
        } = self.read_payload(TARGET_ENCODER_FILE)?;

        // Every encoder must belong to a trained feature column
        for encoder in &encoders {
            if !feature_columns.iter().any(|c| c.as_str() == encoder.column()) {
                return Err(LoanPredictorError::ArtifactError(format!(
                    "encoder for '{}' does not match any trained feature column",
                    encoder.column()
                )));
            }
        }

        Ok(ArtifactBundle {
            feature_columns,
            encoders,
            target_encoder,
            model,
        })
    }

    fn write_payload<T: Serialize>(&self, file: &str, payload: &T) -> Result<()> {
        let bytes = postcard::to_allocvec(payload).map_err(|e| {
            LoanPredictorError::ArtifactError(format!("failed to encode {}: {}", file, e))
        })?;
        std::fs::write(self.dir.join(file), bytes)?;
        Ok(())
    }

    fn read_payload<T: for<'de> Deserialize<'de>>(&self, file: &str) -> Result<T> {
        let path = self.dir.join(file);
        let bytes = std::fs::read(&path).map_err(|e| {
            LoanPredictorError::ArtifactError(format!("{}: {}", path.display(), e))
        })?;
        postcard::from_bytes(&bytes).map_err(|e| {
            LoanPredictorError::ArtifactError(format!(
                "{}: corrupt or unsupported artifact version: {}",
                path.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ensemble::EnsembleParams;
    use ndarray::{Array1, Array2};
    use polars::prelude::*;

    fn fitted_bundle() -> ArtifactBundle {
        let df = DataFrame::new(vec![
            Series::new("Property_Area".into(), &["Urban", "Rural", "Urban", "Rural"]).into(),
            Series::new("Loan_Status".into(), &["Y", "N", "Y", "N"]).into(),
        ])
        .unwrap();

        let mut encoder = LabelEncoder::new("Property_Area");
        encoder.fit(&df).unwrap();
        let mut target_encoder = LabelEncoder::new("Loan_Status");
        target_encoder.fit(&df).unwrap();

        let x = Array2::from_shape_vec(
            (20, 2),
            (0..40).map(|i| (i % 11) as f64).collect(),
        )
        .unwrap();
        let y: Array1<f64> = x
            .rows()
            .into_iter()
            .map(|row| if row[0] > 4.0 { 1.0 } else { 0.0 })
            .collect();

        let mut model = SoftVotingClassifier::new(EnsembleParams {
            forest_trees: 5,
            boosting_rounds: 5,
            boosting_depth: 2,
            seed: 42,
        });
        model.fit(&x, &y).unwrap();

        ArtifactBundle {
            feature_columns: vec!["Income".to_string(), "Property_Area".to_string()],
            encoders: vec![encoder],
            target_encoder,
            model,
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let bundle = fitted_bundle();
        store.save(&bundle).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.feature_columns, bundle.feature_columns);
        assert_eq!(loaded.encoders[0].classes(), bundle.encoders[0].classes());
        assert_eq!(loaded.target_encoder.classes(), &["N", "Y"]);

        // Predictions survive the round trip bit-for-bit
        let x = Array2::from_shape_vec((3, 2), vec![1.0, 0.0, 6.0, 1.0, 9.0, 0.0]).unwrap();
        assert_eq!(
            loaded.model.predict_proba(&x).unwrap(),
            bundle.model.predict_proba(&x).unwrap()
        );
    }

    #[test]
    fn test_missing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("nothing_here"));

        let err = store.load().unwrap_err();
        assert!(matches!(err, LoanPredictorError::ArtifactError(_)));
    }

    #[test]
    fn test_corrupt_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.save(&fitted_bundle()).unwrap();

        std::fs::write(dir.path().join(MODEL_FILE), b"not a payload").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, LoanPredictorError::ArtifactError(_)));
    }

    #[test]
    fn test_encoder_column_skew_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let mut bundle = fitted_bundle();
        bundle.feature_columns = vec!["Income".to_string()];
        store.save(&bundle).unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, LoanPredictorError::ArtifactError(_)));
    }
}
