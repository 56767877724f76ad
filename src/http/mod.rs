//! HTTP surface: routing, shared state, caller identity headers
//!
//! Authentication proper is an external collaborator. Callers identify
//! themselves with an `x-user-id` header; admin routes are gated by an
//! `x-admin-key` checked against configuration.

use axum::http::HeaderMap;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::delivery::DeliveryService;
use crate::services::orders::OrderService;
use crate::services::returns::ReturnService;

pub mod delivery;
pub mod orders;
pub mod returns;

#[derive(Clone)]
pub struct AppState {
    pub returns: ReturnService,
    pub delivery: DeliveryService,
    pub orders: OrderService,
    pub admin_api_key: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/orders", post(orders::create_order))
        .route("/api/v1/orders/:order_id", get(orders::get_order))
        .route("/api/v1/returns", post(returns::create_return))
        .route("/api/v1/returns/user/:user_id", get(returns::list_user_returns))
        .route("/api/v1/returns/eligibility/:order_id", get(returns::check_eligibility))
        .route("/api/v1/returns/admin/all", get(returns::admin_list_returns))
        .route("/api/v1/returns/admin/analytics", get(returns::admin_analytics))
        .route(
            "/api/v1/returns/:return_id",
            get(returns::get_return).put(returns::update_return).delete(returns::cancel_return),
        )
        .route("/api/v1/delivery/check", post(delivery::check_pincode))
        .route("/api/v1/delivery/calculate", post(delivery::calculate))
        .route("/api/v1/delivery/zones/:pincode/serviceable", put(delivery::set_serviceable))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy", "service": "returns-core" }))
}

pub(crate) fn is_admin(state: &AppState, headers: &HeaderMap) -> bool {
    headers
        .get("x-admin-key")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|key| key == state.admin_api_key)
}

pub(crate) fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    if is_admin(state, headers) {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Admin access required".into()))
    }
}

pub(crate) fn user_id_header(headers: &HeaderMap) -> Result<Uuid, ApiError> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Validation("Missing x-user-id header".into()))?
        .parse()
        .map_err(|_| ApiError::Validation("x-user-id must be a valid UUID".into()))
}

pub(crate) fn admin_id_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-admin-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// Owner scoping for user-keyed resources. A mismatch reads as absence,
/// the same way `get_return` hides records the caller does not own.
pub(crate) fn require_owner(caller: Uuid, owner: Uuid) -> Result<(), ApiError> {
    if caller == owner {
        Ok(())
    } else {
        Err(ApiError::NotFound("Returns not found".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_require_owner_accepts_the_owner() {
        let id = Uuid::new_v4();
        require_owner(id, id).unwrap();
    }

    #[test]
    fn test_require_owner_hides_other_users() {
        let err = require_owner(Uuid::new_v4(), Uuid::new_v4()).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_user_id_header_parses_and_rejects() {
        let mut headers = HeaderMap::new();
        let id = Uuid::new_v4();
        headers.insert("x-user-id", id.to_string().parse().unwrap());
        assert_eq!(user_id_header(&headers).unwrap(), id);

        let mut bad = HeaderMap::new();
        bad.insert("x-user-id", "not-a-uuid".parse().unwrap());
        assert_eq!(user_id_header(&bad).unwrap_err().status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(user_id_header(&HeaderMap::new()).unwrap_err().status_code(), StatusCode::BAD_REQUEST);
    }
}
