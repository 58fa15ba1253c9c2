//! Dataset schema and loading
//!
//! The loan application schema is fixed: eleven applicant fields plus a
//! row identifier and the approval target. Categorical and numeric fields
//! are distinguished by membership in [`schema::CATEGORICAL_COLUMNS`].

mod loader;
mod schema;

pub use loader::{drop_incomplete_rows, load_csv};
pub use schema::{FieldValue, LoanRecord, CATEGORICAL_COLUMNS, ID_COLUMN, TARGET_COLUMN};
