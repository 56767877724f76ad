//! Delivery pricing handlers
//!
//! The 6-digit pincode check lives here, not in the lookup service: a
//! caller that reaches the service directly with malformed input gets a
//! plain not-serviceable answer instead of a validation error.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use validator::Validate;

use crate::error::ApiError;
use crate::http::{require_admin, AppState};
use crate::models::DeliveryZone;
use crate::services::delivery::{DeliveryQuote, PincodeCheck};

static PINCODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6}$").expect("valid pincode regex"));

#[derive(Debug, Deserialize, Validate)]
pub struct CheckPincodeBody {
    #[validate(regex(path = "PINCODE_RE", message = "Pincode must be a 6-digit number"))]
    pub pincode: String,
}

pub async fn check_pincode(
    State(state): State<AppState>,
    Json(body): Json<CheckPincodeBody>,
) -> Result<Json<PincodeCheck>, ApiError> {
    body.validate().map_err(|e| ApiError::Validation(e.to_string()))?;
    let result = state.delivery.check_pincode(&body.pincode).await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CalculateBody {
    #[validate(regex(path = "PINCODE_RE", message = "Pincode must be a 6-digit number"))]
    pub pincode: String,
    #[validate(range(min = 0.0, message = "Weight must be non-negative"))]
    pub weight: f64,
    #[validate(range(min = 0, message = "Order value must be non-negative"))]
    pub order_value: i64,
}

pub async fn calculate(
    State(state): State<AppState>,
    Json(body): Json<CalculateBody>,
) -> Result<Json<DeliveryQuote>, ApiError> {
    body.validate().map_err(|e| ApiError::Validation(e.to_string()))?;
    let quote = state.delivery.quote(&body.pincode, body.weight, body.order_value).await?;
    Ok(Json(quote))
}

#[derive(Debug, Deserialize)]
pub struct SetServiceableBody {
    pub serviceable: bool,
}

pub async fn set_serviceable(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(pincode): Path<String>,
    Json(body): Json<SetServiceableBody>,
) -> Result<Json<DeliveryZone>, ApiError> {
    require_admin(&state, &headers)?;
    let zone = state.delivery.set_serviceable(&pincode, body.serviceable).await?;
    Ok(Json(zone))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pincode_regex() {
        assert!(PINCODE_RE.is_match("110001"));
        assert!(!PINCODE_RE.is_match("11001"));
        assert!(!PINCODE_RE.is_match("1100011"));
        assert!(!PINCODE_RE.is_match("11000a"));
        assert!(!PINCODE_RE.is_match(" 110001"));
    }

    #[test]
    fn test_body_validation() {
        let ok = CheckPincodeBody { pincode: "400001".into() };
        assert!(ok.validate().is_ok());
        let bad = CheckPincodeBody { pincode: "40001".into() };
        assert!(bad.validate().is_err());
    }
}
