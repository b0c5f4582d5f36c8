// routes.rs
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn create_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::list_polls))
        .route("/index.html", get(handlers::list_polls))
        .route("/poll", get(handlers::ballot))
        .route("/vote", get(handlers::vote))
        .route("/results", get(handlers::results))
        .route("/chart", get(handlers::chart))
        .route("/export", get(handlers::export))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
