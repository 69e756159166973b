use axum::routing::get;
use axum::Router;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::routes::{health, oracle};
use crate::state::AppState;

/// Build the router: `/health` and `/oracle/run`.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health::health))
        .route("/oracle/run", get(oracle::run_oracle))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
