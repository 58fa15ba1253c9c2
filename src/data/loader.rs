//! Dataset loading

use crate::error::{LoanPredictorError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Load a CSV file into a DataFrame
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .map_err(|e| LoanPredictorError::DataError(format!("{}: {}", path.display(), e)))?;

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|e| LoanPredictorError::DataError(format!("{}: {}", path.display(), e)))
}

/// Drop every row containing a missing value (no imputation)
pub fn drop_incomplete_rows(df: &DataFrame) -> Result<DataFrame> {
    df.drop_nulls::<String>(None)
        .map_err(|e| LoanPredictorError::DataError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv(rows: &[&str]) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "a,b,c").unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        file
    }

    #[test]
    fn test_load_csv() {
        let file = create_test_csv(&["1,2,x", "4,5,y"]);
        let df = load_csv(file.path()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);
    }

    #[test]
    fn test_load_csv_missing_file() {
        let err = load_csv(Path::new("/nonexistent/loan_data.csv")).unwrap_err();
        assert!(matches!(err, LoanPredictorError::DataError(_)));
    }

    #[test]
    fn test_drop_incomplete_rows() {
        let file = create_test_csv(&["1,2,x", ",5,y", "7,8,z"]);
        let df = load_csv(file.path()).unwrap();
        let cleaned = drop_incomplete_rows(&df).unwrap();
        assert_eq!(cleaned.height(), 2);
    }
}
