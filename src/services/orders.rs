//! Order intake and lookup
//!
//! Orders normally arrive from the order service; this intake mirrors its
//! insert so a deployment without that service still has records for the
//! returns workflow to run against. It shares the daily-sequence generator
//! with returns.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::returns::OrderLineItem;
use crate::domain::status::OrderStatus;
use crate::error::ApiError;
use crate::models::Order;
use crate::services::sequence::{next_daily_id, SequenceScope};

#[derive(Clone)]
pub struct OrderService {
    pool: PgPool,
}

impl OrderService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_order(
        &self,
        user_id: Uuid,
        items: Vec<OrderLineItem>,
        status: OrderStatus,
        delivered_at: Option<DateTime<Utc>>,
    ) -> Result<Order, ApiError> {
        let order_number = next_daily_id(&self.pool, SequenceScope::Orders).await?;
        sqlx::query_as::<_, Order>(
            "INSERT INTO orders (id, order_number, user_id, status, items, delivered_at, placed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NOW()) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&order_number)
        .bind(user_id)
        .bind(status.as_str())
        .bind(Json(&items))
        .bind(delivered_at)
        .fetch_one(&self.pool)
        .await
        .map_err(ApiError::db("create order"))
    }

    pub async fn get_order(&self, order_number: &str, user_filter: Option<Uuid>) -> Result<Order, ApiError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_number = $1")
            .bind(order_number)
            .fetch_optional(&self.pool)
            .await
            .map_err(ApiError::db("load order"))?
            .ok_or_else(|| ApiError::NotFound("Order not found".into()))?;
        if user_filter.is_some_and(|uid| order.user_id != uid) {
            return Err(ApiError::NotFound("Order not found".into()));
        }
        Ok(order)
    }
}
