//! Request handlers

use axum::{extract::State, response::Html, Json};
use serde_json::json;
use std::sync::Arc;

use super::error::Result;
use super::state::AppState;
use crate::data::LoanRecord;
use crate::predictor::Prediction;

/// Score one loan application
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(record): Json<LoanRecord>,
) -> Result<Json<Prediction>> {
    let prediction = state.predictor.predict(&record)?;
    Ok(Json(prediction))
}

/// Liveness check
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "model_loaded": true,
        "features": state.predictor.feature_columns().len(),
    }))
}

/// The dashboard form
pub async fn dashboard() -> Html<&'static str> {
    Html(include_str!("dashboard.html"))
}
