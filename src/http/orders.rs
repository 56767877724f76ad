//! Order intake handlers (admin surface)

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::domain::returns::OrderLineItem;
use crate::domain::status::OrderStatus;
use crate::error::ApiError;
use crate::http::{is_admin, require_admin, user_id_header, AppState};
use crate::models::Order;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderBody {
    pub user_id: Uuid,
    #[validate(length(min = 1, message = "At least one line item is required"))]
    pub items: Vec<OrderLineItem>,
    pub status: Option<String>,
    pub delivered_at: Option<DateTime<Utc>>,
}

pub async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateOrderBody>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    require_admin(&state, &headers)?;
    body.validate().map_err(|e| ApiError::Validation(e.to_string()))?;
    let status = match body.status.as_deref() {
        Some(s) => OrderStatus::parse(s)
            .ok_or_else(|| ApiError::Validation(format!("Unknown order status '{s}'")))?,
        None => OrderStatus::Pending,
    };
    let order = state.orders.create_order(body.user_id, body.items, status, body.delivered_at).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn get_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let user_filter = if is_admin(&state, &headers) { None } else { Some(user_id_header(&headers)?) };
    let order = state.orders.get_order(&order_id, user_filter).await?;
    Ok(Json(order))
}
