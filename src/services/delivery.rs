//! Delivery zone lookup and charge quoting

use serde::Serialize;
use sqlx::PgPool;

use crate::domain::delivery::{calculate_charges, ChargeBreakdown};
use crate::error::ApiError;
use crate::models::DeliveryZone;

/// Outcome of a pincode lookup. A miss is a normal value, not an error.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum PincodeCheck {
    Serviceable(ZoneInfo),
    NotServiceable(NotServiceable),
}

#[derive(Clone, Debug, Serialize)]
pub struct ZoneInfo {
    pub serviceable: bool,
    pub pincode: String,
    pub city: String,
    pub district: String,
    pub state: String,
    pub zone: String,
    pub delivery_charge: i64,
    pub transit_days: i16,
    pub cod_available: bool,
    pub max_weight: f64,
    pub courier_partner: String,
}

impl From<DeliveryZone> for ZoneInfo {
    fn from(z: DeliveryZone) -> Self {
        Self {
            serviceable: true,
            pincode: z.pincode,
            city: z.city,
            district: z.district,
            state: z.state,
            zone: z.zone,
            delivery_charge: z.delivery_charge,
            transit_days: z.transit_days,
            cod_available: z.cod_available,
            max_weight: z.max_weight,
            courier_partner: z.courier_partner,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct NotServiceable {
    pub serviceable: bool,
    pub message: String,
}

impl NotServiceable {
    fn new(message: String) -> Self {
        Self { serviceable: false, message }
    }
}

/// A pincode quote: zone attributes merged with the charge breakdown.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DeliveryQuote {
    Serviceable(ServiceableQuote),
    NotServiceable(NotServiceable),
}

#[derive(Debug, Serialize)]
pub struct ServiceableQuote {
    #[serde(flatten)]
    pub zone: ZoneInfo,
    pub charges: ChargeBreakdown,
}

#[derive(Clone)]
pub struct DeliveryService {
    pool: PgPool,
}

impl DeliveryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Looks a pincode up in the zone table. Trims whitespace but does not
    /// validate digit count; the HTTP layer applies the 6-digit check, and
    /// a caller that skips it gets a plain not-serviceable answer for
    /// malformed input.
    pub async fn check_pincode(&self, pincode: &str) -> Result<PincodeCheck, ApiError> {
        let pincode = pincode.trim();
        let zone = sqlx::query_as::<_, DeliveryZone>("SELECT * FROM delivery_zones WHERE pincode = $1")
            .bind(pincode)
            .fetch_optional(&self.pool)
            .await
            .map_err(ApiError::db("look up delivery zone"))?;
        Ok(match zone {
            Some(z) if z.is_serviceable => PincodeCheck::Serviceable(ZoneInfo::from(z)),
            Some(_) => PincodeCheck::NotServiceable(NotServiceable::new(format!(
                "Delivery to pincode {pincode} is temporarily suspended"
            ))),
            None => PincodeCheck::NotServiceable(NotServiceable::new(format!(
                "Delivery is not available for pincode {pincode}"
            ))),
        })
    }

    /// Merges the zone lookup with the charge calculation.
    pub async fn quote(&self, pincode: &str, weight: f64, order_value: i64) -> Result<DeliveryQuote, ApiError> {
        Ok(match self.check_pincode(pincode).await? {
            PincodeCheck::Serviceable(zone) => {
                let charges = calculate_charges(zone.delivery_charge, zone.max_weight, weight, order_value);
                DeliveryQuote::Serviceable(ServiceableQuote { zone, charges })
            }
            PincodeCheck::NotServiceable(ns) => DeliveryQuote::NotServiceable(ns),
        })
    }

    /// Admin toggle; zones are otherwise immutable after seeding.
    pub async fn set_serviceable(&self, pincode: &str, serviceable: bool) -> Result<DeliveryZone, ApiError> {
        sqlx::query_as::<_, DeliveryZone>(
            "UPDATE delivery_zones SET is_serviceable = $2 WHERE pincode = $1 RETURNING *",
        )
        .bind(pincode.trim())
        .bind(serviceable)
        .fetch_optional(&self.pool)
        .await
        .map_err(ApiError::db("update delivery zone"))?
        .ok_or_else(|| ApiError::NotFound(format!("No delivery zone for pincode {}", pincode.trim())))
    }
}
