//! Loan application schema

use serde::{Deserialize, Serialize};

/// Row identifier column, excluded from the feature set
pub const ID_COLUMN: &str = "Loan_ID";

/// Target column holding the approval label ("Y"/"N")
pub const TARGET_COLUMN: &str = "Loan_Status";

/// Columns that carry category strings and get a label encoder
pub const CATEGORICAL_COLUMNS: [&str; 6] = [
    "Gender",
    "Married",
    "Dependents",
    "Education",
    "Self_Employed",
    "Property_Area",
];

/// A single loan application, field names matching the dataset headers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Married")]
    pub married: String,
    #[serde(rename = "Dependents")]
    pub dependents: String,
    #[serde(rename = "Education")]
    pub education: String,
    #[serde(rename = "Self_Employed")]
    pub self_employed: String,
    #[serde(rename = "ApplicantIncome")]
    pub applicant_income: f64,
    #[serde(rename = "CoapplicantIncome")]
    pub coapplicant_income: f64,
    #[serde(rename = "LoanAmount")]
    pub loan_amount: f64,
    #[serde(rename = "Loan_Amount_Term")]
    pub loan_amount_term: f64,
    #[serde(rename = "Credit_History")]
    pub credit_history: f64,
    #[serde(rename = "Property_Area")]
    pub property_area: String,
}

/// A field value looked up by column name
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
}

impl LoanRecord {
    /// Look up a field by its dataset column name
    pub fn field(&self, column: &str) -> Option<FieldValue<'_>> {
        let value = match column {
            "Gender" => FieldValue::Text(&self.gender),
            "Married" => FieldValue::Text(&self.married),
            "Dependents" => FieldValue::Text(&self.dependents),
            "Education" => FieldValue::Text(&self.education),
            "Self_Employed" => FieldValue::Text(&self.self_employed),
            "ApplicantIncome" => FieldValue::Number(self.applicant_income),
            "CoapplicantIncome" => FieldValue::Number(self.coapplicant_income),
            "LoanAmount" => FieldValue::Number(self.loan_amount),
            "Loan_Amount_Term" => FieldValue::Number(self.loan_amount_term),
            "Credit_History" => FieldValue::Number(self.credit_history),
            "Property_Area" => FieldValue::Text(&self.property_area),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> LoanRecord {
        LoanRecord {
            gender: "Male".to_string(),
            married: "Yes".to_string(),
            dependents: "0".to_string(),
            education: "Graduate".to_string(),
            self_employed: "No".to_string(),
            applicant_income: 5000.0,
            coapplicant_income: 1500.0,
            loan_amount: 120.0,
            loan_amount_term: 360.0,
            credit_history: 1.0,
            property_area: "Urban".to_string(),
        }
    }

    #[test]
    fn test_field_lookup() {
        let record = sample_record();
        assert_eq!(record.field("Gender"), Some(FieldValue::Text("Male")));
        assert_eq!(
            record.field("ApplicantIncome"),
            Some(FieldValue::Number(5000.0))
        );
        assert_eq!(record.field("Loan_Status"), None);
    }

    #[test]
    fn test_serde_uses_dataset_headers() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"Self_Employed\""));
        assert!(json.contains("\"Credit_History\""));

        let parsed: LoanRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
