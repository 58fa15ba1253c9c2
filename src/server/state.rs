//! Application state shared across handlers

use crate::predictor::Predictor;

/// Shared server state. The predictor is loaded once at startup and
/// read-only afterwards, so handlers need no locking.
pub struct AppState {
    pub predictor: Predictor,
}

impl AppState {
    pub fn new(predictor: Predictor) -> Self {
        Self { predictor }
    }
}
