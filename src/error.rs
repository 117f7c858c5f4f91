use axum::{http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("{0}")]
    Unauthenticated(&'static str),

    #[error("A profile already exists for this user.")]
    AlreadyExists,

    #[error("Validation error on field '{field}': {message}")]
    Validation { field: &'static str, message: String },

    #[error("Profile not found.")]
    NotFound,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{context}")]
    Persistence {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ProfileError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Wraps a store failure. Duplicate keys surface as `AlreadyExists`.
    pub fn persistence(context: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| match source {
            StoreError::Duplicate => Self::AlreadyExists,
            source => Self::Persistence { context, source },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "unauthenticated",
            Self::AlreadyExists => "already_exists",
            Self::Validation { .. } => "validation",
            Self::NotFound => "not_found",
            Self::Forbidden(_) => "forbidden",
            Self::Persistence { .. } => "persistence",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::AlreadyExists => StatusCode::CONFLICT,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Converts an operation failure into the JSON error body returned by every route.
pub fn error_response(err: ProfileError) -> (StatusCode, Json<Value>) {
    if let ProfileError::Persistence { context, source } = &err {
        tracing::error!(error = %source, "{context}");
    }

    (
        err.status(),
        Json(json!({
            "status": "error",
            "kind": err.kind(),
            "message": err.to_string()
        })),
    )
}
