//! Data preprocessing
//!
//! Categorical encoding (label encoder, one per column plus one for the
//! target) and feature standardization for the logistic ensemble member.

mod encoder;
mod scaler;

pub use encoder::LabelEncoder;
pub use scaler::StandardScaler;
