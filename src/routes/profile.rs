use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{Caller, Identity};
use crate::error::{error_response, ProfileError};
use crate::models::profile::{CreateProfileRequest, UpdateProfileRequest};
use crate::service::{CREATE_LOGIN_REQUIRED, UPDATE_LOGIN_REQUIRED};
use crate::state::AppState;

/// Unwraps a JSON body for an authenticated caller. Anonymous callers get
/// 401 before the body is looked at; rejected bodies become validation errors.
fn read_body<T>(
    caller: Option<&Identity>,
    login_required: &'static str,
    body: Result<Json<T>, JsonRejection>,
) -> Result<T, (StatusCode, Json<Value>)> {
    if caller.is_none() {
        return Err(error_response(ProfileError::Unauthenticated(login_required)));
    }

    body.map(|Json(payload)| payload)
        .map_err(|rejection| error_response(ProfileError::validation("body", rejection.body_text())))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let profile = state
        .profiles
        .get_own(caller.as_ref())
        .await
        .map_err(error_response)?;

    Ok(Json(json!({
        "status": "success",
        "message": "Profile loaded.",
        "data": profile
    })))
}

pub async fn create_profile(
    State(state): State<AppState>,
    Caller(caller): Caller,
    body: Result<Json<CreateProfileRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    // Check login before the payload
    let payload = read_body(caller.as_ref(), CREATE_LOGIN_REQUIRED, body)?;

    // Validate, reject duplicates and insert
    let profile = state
        .profiles
        .create(caller.as_ref(), payload)
        .await
        .map_err(error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Profile created.",
            "data": profile
        })),
    ))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Caller(caller): Caller,
    body: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    // Check login before the payload
    let payload = read_body(caller.as_ref(), UPDATE_LOGIN_REQUIRED, body)?;

    // Update fields and replace links when a list was sent
    let profile = state
        .profiles
        .update(caller.as_ref(), payload)
        .await
        .map_err(error_response)?;

    Ok(Json(json!({
        "status": "success",
        "message": "Profile updated.",
        "data": profile
    })))
}

pub async fn verify_profile(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(profile_id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    // Parse profile_id as UUID
    let profile_id = Uuid::parse_str(&profile_id)
        .map_err(|_| error_response(ProfileError::validation("id", "Invalid profile ID format.")))?;

    // Only verified members may approve
    let profile = state
        .profiles
        .verify(caller.as_ref(), profile_id)
        .await
        .map_err(error_response)?;

    Ok(Json(json!({
        "status": "success",
        "message": "Profile verified.",
        "data": profile
    })))
}
