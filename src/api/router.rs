use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;
use super::handlers;

pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(handlers::system::health_check))
        .route("/metrics", get(handlers::system::metrics))
        // Charts
        .route("/api/charts", get(handlers::charts::list))
        .route("/api/charts/:id", get(handlers::charts::detail))
        // Results
        .route("/api/results", get(handlers::results::list))
        .route("/api/results/:id", get(handlers::results::detail))
        .route(
            "/api/results/:id/entries/:username",
            get(handlers::results::entry),
        );

    // Operator routes check the admin token inside the handler
    let admin = Router::new().route(
        "/api/admin/charts/:id/settle",
        post(handlers::settlement::settle),
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(admin)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
