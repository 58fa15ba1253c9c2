//! Prediction server
//!
//! Loads the artifact bundle once at startup, then serves the prediction
//! API and the dashboard form. Missing or corrupt artifacts abort startup;
//! they are a deployment problem, not something to retry at request time.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use state::AppState;

use crate::artifact::ArtifactStore;
use crate::predictor::Predictor;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub artifact_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            artifact_dir: std::env::var("MODELS_DIR").unwrap_or_else(|_| "./models".to_string()),
        }
    }
}

/// Start the server with the given configuration
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let store = ArtifactStore::new(&config.artifact_dir);
    let predictor = Predictor::open(&store)?;
    info!(
        artifact_dir = %store.dir().display(),
        features = predictor.feature_columns().len(),
        "loaded artifact bundle"
    );

    let state = Arc::new(AppState::new(predictor));
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(host = %config.host, port = config.port, "starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
