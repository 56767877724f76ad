//! Return workflow handlers

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::domain::returns::ReturnItem;
use crate::domain::status::ReturnStatus;
use crate::error::ApiError;
use crate::http::{admin_id_header, is_admin, require_admin, require_owner, user_id_header, AppState};
use crate::models::ReturnRequest;
use crate::pagination::{PageParams, Paginated};
use crate::services::returns::{AdminReturnFilter, EligibilityReport, ReturnAnalytics};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReturnBody {
    pub order_id: String,
    #[validate(length(min = 1, message = "At least one return item is required"))]
    pub return_items: Vec<ReturnItem>,
    #[validate(length(min = 1, message = "A return reason is required"))]
    pub return_reason: String,
}

pub async fn create_return(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateReturnBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let user_id = user_id_header(&headers)?;
    body.validate().map_err(|e| ApiError::Validation(e.to_string()))?;
    let (record, refund) = state
        .returns
        .create_return_request(&body.order_id, user_id, body.return_items, body.return_reason)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "return": record, "refund_amount": refund })),
    ))
}

pub async fn get_return(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(return_id): Path<String>,
) -> Result<Json<ReturnRequest>, ApiError> {
    let user_filter = if is_admin(&state, &headers) { None } else { Some(user_id_header(&headers)?) };
    let record = state.returns.get_return_by_id(&return_id, user_filter).await?;
    Ok(Json(record))
}

pub async fn check_eligibility(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> Result<Json<EligibilityReport>, ApiError> {
    let user_filter = if is_admin(&state, &headers) { None } else { Some(user_id_header(&headers)?) };
    let report = state.returns.check_eligibility(&order_id, user_filter).await?;
    Ok(Json(report))
}

pub async fn list_user_returns(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<ReturnRequest>>, ApiError> {
    if !is_admin(&state, &headers) {
        require_owner(user_id_header(&headers)?, user_id)?;
    }
    let (page, limit) = params.clamp();
    let result = state.returns.get_user_returns(user_id, page, limit).await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct UpdateReturnBody {
    pub status: String,
    pub admin_notes: Option<String>,
}

/// Unknown status strings are a display-ready 400, not a serde rejection.
fn parse_status(value: &str) -> Result<ReturnStatus, ApiError> {
    ReturnStatus::parse(value)
        .ok_or_else(|| ApiError::Validation(format!("Unknown return status '{value}'")))
}

pub async fn update_return(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(return_id): Path<String>,
    Json(body): Json<UpdateReturnBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&state, &headers)?;
    let status = parse_status(&body.status)?;
    let updated = state
        .returns
        .update_return_status(&return_id, status, body.admin_notes, admin_id_header(&headers))
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "return": updated })))
}

pub async fn cancel_return(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(return_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = user_id_header(&headers)?;
    state.returns.cancel_return_request(&return_id, user_id).await?;
    Ok(Json(serde_json::json!({ "success": true, "message": "Return request cancelled" })))
}

#[derive(Debug, Deserialize)]
pub struct AdminListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub search: Option<String>,
}

pub async fn admin_list_returns(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<AdminListParams>,
) -> Result<Json<Paginated<ReturnRequest>>, ApiError> {
    require_admin(&state, &headers)?;
    let (page, limit) = PageParams { page: params.page, limit: params.limit }.clamp();
    let status = params.status.as_deref().map(parse_status).transpose()?;
    let filter = AdminReturnFilter {
        status,
        start_date: params.start_date,
        end_date: params.end_date,
        search: params.search,
    };
    let result = state.returns.get_all_returns_admin(page, limit, filter).await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub async fn admin_analytics(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<AnalyticsParams>,
) -> Result<Json<ReturnAnalytics>, ApiError> {
    require_admin(&state, &headers)?;
    let analytics = state.returns.get_return_analytics(params.start_date, params.end_date).await?;
    Ok(Json(analytics))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_accepts_wire_names() {
        assert_eq!(parse_status("picked_up").unwrap(), ReturnStatus::PickedUp);
    }

    #[test]
    fn test_unknown_status_is_a_display_ready_400() {
        let err = parse_status("shipped").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("'shipped'"));
    }
}
