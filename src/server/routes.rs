use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use super::handlers;
use super::ServerState;

pub fn create_router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_dir = state.static_dir.clone();

    let api = Router::new()
        .route("/health", get(health_check))
        .route("/api/recipes", get(handlers::list_recipes))
        .route("/api/shopping-list", post(handlers::shopping_list))
        .route("/api/shopping-list/markdown", post(handlers::shopping_list_markdown))
        .route("/api/plan", post(handlers::plan_progress))
        .with_state(state);

    // front-end assets, if any, are served for everything the API does not claim
    let app = match static_dir {
        Some(dir) => api.fallback_service(ServeDir::new(dir)),
        None => api,
    };
    app.layer(cors)
}

async fn health_check() -> &'static str {
    "OK"
}
