//! Loan approval predictor
//!
//! Construct once from an artifact bundle (or directly from a store),
//! then call [`Predictor::predict`] per request. The predictor is
//! immutable after construction and safe to share behind an `Arc`.

use crate::artifact::{ArtifactBundle, ArtifactStore};
use crate::data::{FieldValue, LoanRecord};
use crate::error::{LoanPredictorError, Result};
use crate::ensemble::SoftVotingClassifier;
use crate::preprocessing::LabelEncoder;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Decision and confidence for one application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Decoded approval label ("Y"/"N")
    pub loan_status: String,
    /// Positive-class probability in [0, 1]
    pub approval_probability: f64,
}

/// One-time-loaded inference engine
#[derive(Debug, Clone)]
pub struct Predictor {
    feature_columns: Vec<String>,
    encoders: HashMap<String, LabelEncoder>,
    target_encoder: LabelEncoder,
    model: SoftVotingClassifier,
}

impl Predictor {
    /// Build from an in-memory bundle (tests inject fixtures this way)
    pub fn new(bundle: ArtifactBundle) -> Self {
        let encoders = bundle
            .encoders
            .into_iter()
            .map(|e| (e.column().to_string(), e))
            .collect();

        Self {
            feature_columns: bundle.feature_columns,
            encoders,
            target_encoder: bundle.target_encoder,
            model: bundle.model,
        }
    }

    /// Load the bundle from an artifact store
    pub fn open(store: &ArtifactStore) -> Result<Self> {
        Ok(Self::new(store.load()?))
    }

    /// Feature columns in training order
    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    /// Predict approval for a single application.
    ///
    /// A categorical value outside the training vocabulary returns
    /// [`LoanPredictorError::UnknownCategory`]; it is the caller's job to
    /// surface that as a client error.
    pub fn predict(&self, record: &LoanRecord) -> Result<Prediction> {
        let features = self.encode_record(record)?;
        let x = Array2::from_shape_vec((1, features.len()), features).map_err(|e| {
            LoanPredictorError::ShapeError {
                expected: format!("{} features", self.feature_columns.len()),
                actual: e.to_string(),
            }
        })?;

        let probability = self.model.predict_proba(&x)?[0];

        let code = if probability > 0.5 { 1 } else { 0 };
        let loan_status = self.target_encoder.decode(code)?.to_string();

        Ok(Prediction {
            loan_status,
            approval_probability: probability,
        })
    }

    /// Encode a record into the fixed training column order
    fn encode_record(&self, record: &LoanRecord) -> Result<Vec<f64>> {
        let mut features = Vec::with_capacity(self.feature_columns.len());

        for column in &self.feature_columns {
            let value = record.field(column).ok_or_else(|| {
                LoanPredictorError::ValidationError(format!(
                    "record has no field for trained column '{}'",
                    column
                ))
            })?;

            let encoded = match (self.encoders.get(column), value) {
                (Some(encoder), FieldValue::Text(text)) => f64::from(encoder.encode(text)?),
                (Some(_), FieldValue::Number(_)) => {
                    return Err(LoanPredictorError::ValidationError(format!(
                        "column '{}' is categorical but the record holds a number",
                        column
                    )))
                }
                (None, FieldValue::Number(number)) => number,
                (None, FieldValue::Text(_)) => {
                    return Err(LoanPredictorError::ValidationError(format!(
                        "column '{}' is numeric but the record holds text",
                        column
                    )))
                }
            };
            features.push(encoded);
        }

        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ensemble::EnsembleParams;
    use ndarray::Array1;
    use polars::prelude::*;

    /// Fixture predictor trained so that Credit_History dominates approval
    fn fixture_predictor() -> Predictor {
        let areas = ["Urban", "Rural", "Semiurban"];
        let n = 60;

        let credit: Vec<f64> = (0..n).map(|i| (i % 2) as f64).collect();
        let income: Vec<f64> = (0..n).map(|i| 2000.0 + (i % 7) as f64 * 800.0).collect();
        let area: Vec<&str> = (0..n).map(|i| areas[i % 3]).collect();
        let status: Vec<&str> = credit
            .iter()
            .map(|&c| if c > 0.5 { "Y" } else { "N" })
            .collect();

        let df = DataFrame::new(vec![
            Series::new("Property_Area".into(), area.clone()).into(),
            Series::new("Loan_Status".into(), status).into(),
        ])
        .unwrap();

        let mut area_encoder = LabelEncoder::new("Property_Area");
        area_encoder.fit(&df).unwrap();
        let mut target_encoder = LabelEncoder::new("Loan_Status");
        target_encoder.fit(&df).unwrap();

        let mut rows = Vec::with_capacity(n * 3);
        for i in 0..n {
            rows.push(credit[i]);
            rows.push(income[i]);
            rows.push(f64::from(area_encoder.encode(area[i]).unwrap()));
        }
        let x = Array2::from_shape_vec((n, 3), rows).unwrap();
        let y: Array1<f64> = credit.iter().copied().collect();

        let mut model = SoftVotingClassifier::new(EnsembleParams {
            forest_trees: 10,
            boosting_rounds: 10,
            boosting_depth: 3,
            seed: 42,
        });
        model.fit(&x, &y).unwrap();

        Predictor::new(ArtifactBundle {
            feature_columns: vec![
                "Credit_History".to_string(),
                "ApplicantIncome".to_string(),
                "Property_Area".to_string(),
            ],
            encoders: vec![area_encoder],
            target_encoder,
            model,
        })
    }

    fn record(credit_history: f64, income: f64, area: &str) -> LoanRecord {
        LoanRecord {
            gender: "Male".to_string(),
            married: "Yes".to_string(),
            dependents: "0".to_string(),
            education: "Graduate".to_string(),
            self_employed: "No".to_string(),
            applicant_income: income,
            coapplicant_income: 0.0,
            loan_amount: 120.0,
            loan_amount_term: 360.0,
            credit_history,
            property_area: area.to_string(),
        }
    }

    #[test]
    fn test_good_credit_approved() {
        let predictor = fixture_predictor();
        let result = predictor.predict(&record(1.0, 8000.0, "Urban")).unwrap();

        assert_eq!(result.loan_status, "Y");
        assert!(result.approval_probability > 0.5);
    }

    #[test]
    fn test_bad_credit_rejected() {
        let predictor = fixture_predictor();
        let result = predictor.predict(&record(0.0, 1500.0, "Rural")).unwrap();

        assert_eq!(result.loan_status, "N");
        assert!(result.approval_probability <= 0.5);
    }

    #[test]
    fn test_decision_matches_threshold() {
        let predictor = fixture_predictor();
        for credit in [0.0, 1.0] {
            for income in [1000.0, 5000.0, 9000.0] {
                let result = predictor.predict(&record(credit, income, "Semiurban")).unwrap();
                assert!((0.0..=1.0).contains(&result.approval_probability));
                let expected = if result.approval_probability > 0.5 { "Y" } else { "N" };
                assert_eq!(result.loan_status, expected);
            }
        }
    }

    #[test]
    fn test_predict_is_idempotent() {
        let predictor = fixture_predictor();
        let input = record(1.0, 4000.0, "Urban");

        let first = predictor.predict(&input).unwrap();
        let second = predictor.predict(&input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unseen_category_fails() {
        let predictor = fixture_predictor();
        let err = predictor
            .predict(&record(1.0, 4000.0, "Suburban"))
            .unwrap_err();

        assert!(matches!(
            err,
            LoanPredictorError::UnknownCategory { ref column, ref value }
                if column == "Property_Area" && value == "Suburban"
        ));
    }

    #[test]
    fn test_target_round_trip() {
        let predictor = fixture_predictor();
        for label in ["N", "Y"] {
            let code = predictor.target_encoder.encode(label).unwrap();
            assert_eq!(predictor.target_encoder.decode(code).unwrap(), label);
        }
    }
}
