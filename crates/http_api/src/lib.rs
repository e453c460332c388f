mod dashboard;
mod handlers;
mod state;

use axum::{Router, routing::get};
use tower_http::services::{ServeDir, ServeFile};

pub use state::HttpState;

pub fn router(state: HttpState) -> Router {
    let api = Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/summary", get(handlers::summary))
        .route("/api/daily", get(handlers::daily))
        .route("/api/models", get(handlers::models))
        .route("/api/quotas", get(handlers::quotas))
        .route("/api/tips", get(handlers::tips))
        .route("/api/all", get(handlers::all))
        .with_state(state);

    let dashboard_dir = dashboard::resolve_dashboard_dir();
    let static_service =
        ServeDir::new(&dashboard_dir).fallback(ServeFile::new(dashboard_dir.join("index.html")));
    api.fallback_service(static_service)
}
