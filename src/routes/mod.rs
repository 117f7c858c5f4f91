use axum::{
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};

use crate::state::AppState;

pub mod directory;
pub mod profile;

use directory::get_directory;
use profile::{create_profile, get_profile, update_profile, verify_profile};

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/profile",
            get(get_profile).post(create_profile).put(update_profile),
        )
        .route("/api/directory", get(get_directory))
        .route("/api/profiles/:id/verify", post(verify_profile))
        .with_state(state)
}
