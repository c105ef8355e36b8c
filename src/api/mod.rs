pub mod health;
pub mod returns;

use crate::config::Config;
use crate::engine::TwrEngine;
use crate::ledger::SqliteLedger;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SqliteLedger>,
    pub engine: Arc<TwrEngine>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<SqliteLedger>, engine: Arc<TwrEngine>, config: Config) -> Self {
        Self {
            store,
            engine,
            config,
        }
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
        .route(
            "/v1/accounts/:account/returns/compute",
            post(returns::compute_returns),
        )
        .route("/v1/accounts/:account/returns", get(returns::list_returns))
        .layer(cors)
        .with_state(state)
}
