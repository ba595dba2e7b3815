pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod ordering;
pub mod reader;
pub mod source;
pub mod state;
pub mod stats;
pub mod title;

use axum::Router;
use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let chapters = state.library.catalog().await.len();
    Json(serde_json::json!({
        "status": if chapters > 0 { "ok" } else { "empty" },
        "version": env!("CARGO_PKG_VERSION"),
        "source": state.library.source().describe(),
        "chapters": chapters,
    }))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
