//! Typed application errors carrying an HTTP status

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Business and infrastructure errors surfaced by the service layer.
///
/// Messages are written for direct display to the caller. A typed error
/// is never wrapped a second time; only unanticipated failures end up
/// in `Database`/`Internal`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or missing input (400).
    #[error("{0}")]
    Validation(String),

    /// Entity absent, or not owned by the caller (404).
    #[error("{0}")]
    NotFound(String),

    /// Admin-only action attempted without admin access (403).
    #[error("{0}")]
    Forbidden(String),

    /// Business-rule violation: illegal transition, duplicate return,
    /// late cancellation (400).
    #[error("{0}")]
    State(String),

    /// Unexpected database failure, wrapped with the operation context (500).
    #[error("failed to {context}: {source}")]
    Database {
        context: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// `map_err` helper: `query.map_err(ApiError::db("load order"))`.
    pub fn db(context: impl Into<String>) -> impl FnOnce(sqlx::Error) -> ApiError {
        let context = context.into();
        move |source| ApiError::Database { context, source }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::State(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Database { .. } | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("{self}");
        }
        let body = Json(serde_json::json!({ "success": false, "message": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::State("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::Internal("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_db_wrapper_keeps_context() {
        let err = ApiError::db("load order")(sqlx::Error::RowNotFound);
        assert!(err.to_string().starts_with("failed to load order:"));
    }
}
