//! Persistence row shapes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use crate::domain::returns::{OrderLineItem, ReturnItem};

/// An order as persisted by the order service. This core reads the status,
/// timestamps and item snapshot, and only ever writes the refund flip.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub status: String,
    pub items: Json<Vec<OrderLineItem>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub placed_at: DateTime<Utc>,
}

impl Order {
    /// Actual delivery timestamp, falling back to placement.
    pub fn delivery_timestamp(&self) -> DateTime<Utc> {
        self.delivered_at.unwrap_or(self.placed_at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReturnRequest {
    pub id: Uuid,
    /// Daily-sequential business ID, `RET-YYYYMMDD-00001`. Unique.
    pub return_id: String,
    /// Business-ID join to the order, deliberately not a FK to `orders.id`:
    /// the business ID stays stable across any re-keying of the order store.
    pub order_number: String,
    pub user_id: Uuid,
    pub return_items: Json<Vec<ReturnItem>>,
    pub return_reason: String,
    /// Snapshotted at creation; immutable afterwards.
    pub refund_amount: i64,
    pub status: String,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub refund_processed_at: Option<DateTime<Utc>>,
    pub admin_notes: Option<String>,
    pub admin_updated_by: Option<String>,
    pub admin_updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DeliveryZone {
    pub pincode: String,
    pub city: String,
    pub district: String,
    pub state: String,
    pub zone: String,
    pub delivery_charge: i64,
    pub transit_days: i16,
    pub cod_available: bool,
    pub is_serviceable: bool,
    /// Kilograms shipped without a weight surcharge.
    pub max_weight: f64,
    pub courier_partner: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_delivery_timestamp_falls_back_to_placement() {
        let placed = Utc::now() - Duration::days(5);
        let mut order = Order {
            id: Uuid::new_v4(),
            order_number: "ORD-20240301-00001".into(),
            user_id: Uuid::new_v4(),
            status: "delivered".into(),
            items: Json(vec![]),
            delivered_at: None,
            placed_at: placed,
        };
        assert_eq!(order.delivery_timestamp(), placed);
        let delivered = placed + Duration::days(2);
        order.delivered_at = Some(delivered);
        assert_eq!(order.delivery_timestamp(), delivered);
    }
}
