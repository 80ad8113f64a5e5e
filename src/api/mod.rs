pub mod health;
pub mod positions;
pub mod summary;

use crate::classifier::{DefaultClassifier, StrategyClassifier};
use crate::config::Config;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub classifier: Arc<dyn StrategyClassifier>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            classifier: Arc::new(DefaultClassifier::new()),
        }
    }

    pub fn with_classifier(config: Config, classifier: Arc<dyn StrategyClassifier>) -> Self {
        Self { config, classifier }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/positions", post(positions::build_positions))
        .route("/v1/summary", post(summary::summarize))
        .layer(cors)
        .with_state(state)
}
