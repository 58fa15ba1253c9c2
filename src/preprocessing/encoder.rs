//! Label encoding for categorical columns

use crate::error::{LoanPredictorError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bijection from category strings to consecutive integer codes.
///
/// The vocabulary is fixed at fit time from the observed values, sorted so
/// codes are independent of row order. There is no fallback bucket:
/// encoding a value outside the vocabulary is an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEncoder {
    column: String,
    classes: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, u32>,
}

impl LabelEncoder {
    /// Create an unfitted encoder for a column
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            classes: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Column this encoder belongs to
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Category vocabulary in code order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Fit the vocabulary from a DataFrame column
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let values = Self::column_values(df, &self.column)?;

        let mut classes: Vec<String> = values;
        classes.sort();
        classes.dedup();

        if classes.is_empty() {
            return Err(LoanPredictorError::DataError(format!(
                "column '{}' has no values to encode",
                self.column
            )));
        }

        self.classes = classes;
        self.rebuild_index();
        Ok(self)
    }

    /// Encode a single category value
    pub fn encode(&self, value: &str) -> Result<u32> {
        if self.classes.is_empty() {
            return Err(LoanPredictorError::ModelNotFitted);
        }
        self.lookup(value)
            .ok_or_else(|| LoanPredictorError::UnknownCategory {
                column: self.column.clone(),
                value: value.to_string(),
            })
    }

    /// Decode an integer code back to its category
    pub fn decode(&self, code: u32) -> Result<&str> {
        self.classes
            .get(code as usize)
            .map(|s| s.as_str())
            .ok_or_else(|| LoanPredictorError::ValidationError(format!(
                "code {} out of range for column '{}' ({} classes)",
                code,
                self.column,
                self.classes.len()
            )))
    }

    /// Replace the column in place with its integer codes (as Float64)
    pub fn transform_column(&self, df: &DataFrame) -> Result<DataFrame> {
        let values = Self::column_values(df, &self.column)?;

        let codes: Vec<f64> = values
            .iter()
            .map(|v| self.encode(v).map(f64::from))
            .collect::<Result<Vec<f64>>>()?;

        let encoded = Series::new(self.column.as_str().into(), codes);
        let mut result = df.clone();
        result
            .with_column(encoded)
            .map_err(|e| LoanPredictorError::DataError(e.to_string()))?;
        Ok(result)
    }

    /// Extract a column's values as strings, casting non-string dtypes
    fn column_values(df: &DataFrame, column: &str) -> Result<Vec<String>> {
        let series = df
            .column(column)
            .map_err(|_| LoanPredictorError::FeatureNotFound(column.to_string()))?
            .cast(&DataType::String)
            .map_err(|e| LoanPredictorError::DataError(e.to_string()))?;

        let ca = series
            .str()
            .map_err(|e| LoanPredictorError::DataError(e.to_string()))?;

        Ok(ca
            .into_iter()
            .filter_map(|v| v.map(|s| s.to_string()))
            .collect())
    }

    fn lookup(&self, value: &str) -> Option<u32> {
        if self.index.is_empty() {
            // Deserialized encoders arrive without the index; fall back to a scan
            return self
                .classes
                .iter()
                .position(|c| c == value)
                .map(|i| i as u32);
        }
        self.index.get(value).copied()
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i as u32))
            .collect();
    }
}
