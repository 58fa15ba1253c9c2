//! Error types for the server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::LoanPredictorError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unknown category '{value}' for field '{column}'")]
    UnknownCategory { column: String, value: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<LoanPredictorError> for ServerError {
    fn from(err: LoanPredictorError) -> Self {
        match err {
            LoanPredictorError::UnknownCategory { column, value } => {
                ServerError::UnknownCategory { column, value }
            }
            LoanPredictorError::ValidationError(msg) => ServerError::BadRequest(msg),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServerError::UnknownCategory { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            ServerError::Internal(msg) => {
                tracing::error!(detail = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": true,
            "message": message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_category_maps_to_422() {
        let err: ServerError = LoanPredictorError::UnknownCategory {
            column: "Property_Area".to_string(),
            value: "Moon".to_string(),
        }
        .into();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_artifact_error_hides_detail() {
        let err: ServerError =
            LoanPredictorError::ArtifactError("/secret/path: gone".to_string()).into();
        assert!(matches!(err, ServerError::Internal(_)));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
