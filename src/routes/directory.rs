use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::Caller;
use crate::error::error_response;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DirectoryQuery {
    pub q: Option<String>,
}

pub async fn get_directory(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    // Verified members, filtered by the optional query
    let listing = state
        .profiles
        .directory(caller.as_ref(), query.q.as_deref().unwrap_or_default())
        .await
        .map_err(error_response)?;

    Ok(Json(json!({
        "status": "success",
        "message": "Directory loaded.",
        "data": listing
    })))
}
