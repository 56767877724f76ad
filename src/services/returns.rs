//! Return workflow orchestration
//!
//! Every operation fails fast on its business checks before touching the
//! database for writes. The two tolerated non-transactional pairs are the
//! duplicate-return check before insert and the order refund flip after the
//! return's own status write; both are documented races inherited from the
//! storage model (no multi-document transactions).

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::eligibility;
use crate::domain::returns::{refund_amount, validate_return_items, ReturnItem};
use crate::domain::status::{validate_transition, OrderStatus, ReturnStatus};
use crate::error::ApiError;
use crate::events::EventPublisher;
use crate::models::{Order, ReturnRequest};
use crate::pagination::{Paginated, Pagination};
use crate::services::sequence::{next_daily_id, SequenceScope};

#[derive(Debug, Serialize)]
pub struct EligibilityReport {
    pub is_eligible: bool,
    pub time_remaining_ms: i64,
    pub return_window_days: i64,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct AdminReturnFilter {
    pub status: Option<ReturnStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub search: Option<String>,
}

impl AdminReturnFilter {
    fn is_plain_status_filter(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none() && self.search.is_none()
    }
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct StatusBucket {
    pub status: String,
    pub count: i64,
    pub refund_total: i64,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub requested: i64,
    pub approved: i64,
    pub processed: i64,
}

#[derive(Debug, Serialize)]
pub struct ReturnAnalytics {
    pub by_status: Vec<StatusBucket>,
    pub summary: AnalyticsSummary,
}

#[derive(Clone)]
pub struct ReturnService {
    pool: PgPool,
    events: EventPublisher,
    window_days: i64,
}

impl ReturnService {
    pub fn new(pool: PgPool, events: EventPublisher, window_days: i64) -> Self {
        Self { pool, events, window_days }
    }

    /// Files a return against a delivered order. Preconditions run in order,
    /// each with its own error: ownership (404), delivered, window, no prior
    /// return, item indexes and quantities. Returns the record plus the
    /// refund amount snapshotted from the order's line items.
    pub async fn create_return_request(
        &self,
        order_number: &str,
        user_id: Uuid,
        items: Vec<ReturnItem>,
        reason: String,
    ) -> Result<(ReturnRequest, i64), ApiError> {
        let order = self.load_order(order_number, Some(user_id)).await?;
        if order_status(&order)? != OrderStatus::Delivered {
            return Err(ApiError::State("Only delivered orders can be returned".into()));
        }
        if !eligibility::is_within_return_window(order.delivery_timestamp(), self.window_days) {
            return Err(ApiError::State(format!(
                "Return window of {} days has expired",
                self.window_days
            )));
        }
        if self.count_returns_for_order(order_number).await? > 0 {
            return Err(ApiError::State("A return request already exists for this order".into()));
        }
        validate_return_items(&items, &order.items.0)?;
        let refund = refund_amount(&items, &order.items.0);

        let return_id = next_daily_id(&self.pool, SequenceScope::Returns).await?;
        let record = sqlx::query_as::<_, ReturnRequest>(
            "INSERT INTO return_requests \
             (id, return_id, order_number, user_id, return_items, return_reason, refund_amount, status, requested_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW()) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&return_id)
        .bind(order_number)
        .bind(user_id)
        .bind(Json(&items))
        .bind(&reason)
        .bind(refund)
        .bind(ReturnStatus::Requested.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(ApiError::db("create return request"))?;

        self.events
            .publish(
                "returns.requested",
                &serde_json::json!({
                    "return_id": return_id,
                    "order_number": order_number,
                    "refund_amount": refund,
                }),
            )
            .await;
        Ok((record, refund))
    }

    /// Reports eligibility without creating anything. "Not delivered" and
    /// "window expired" are distinguishable reasons, not one boolean.
    pub async fn check_eligibility(
        &self,
        order_number: &str,
        user_id: Option<Uuid>,
    ) -> Result<EligibilityReport, ApiError> {
        let order = self.load_order(order_number, user_id).await?;
        if order_status(&order)? != OrderStatus::Delivered {
            return Ok(self.ineligible("Order is not delivered yet"));
        }
        let delivered_at = order.delivery_timestamp();
        if !eligibility::is_within_return_window(delivered_at, self.window_days) {
            return Ok(self.ineligible(&format!("Return window of {} days has expired", self.window_days)));
        }
        if self.count_returns_for_order(order_number).await? > 0 {
            return Ok(self.ineligible("A return request already exists for this order"));
        }
        Ok(EligibilityReport {
            is_eligible: true,
            time_remaining_ms: eligibility::time_remaining_ms(delivered_at, self.window_days, Utc::now()),
            return_window_days: self.window_days,
            reason: "Order is eligible for return".into(),
        })
    }

    pub async fn get_return_by_id(
        &self,
        return_id: &str,
        user_filter: Option<Uuid>,
    ) -> Result<ReturnRequest, ApiError> {
        let record = sqlx::query_as::<_, ReturnRequest>("SELECT * FROM return_requests WHERE return_id = $1")
            .bind(return_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(ApiError::db("load return request"))?
            .ok_or_else(|| ApiError::NotFound("Return request not found".into()))?;
        if user_filter.is_some_and(|uid| record.user_id != uid) {
            return Err(ApiError::NotFound("Return request not found".into()));
        }
        Ok(record)
    }

    pub async fn get_user_returns(
        &self,
        user_id: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<Paginated<ReturnRequest>, ApiError> {
        let rows = sqlx::query_as::<_, ReturnRequest>(
            "SELECT * FROM return_requests WHERE user_id = $1 \
             ORDER BY requested_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .bind(offset(page, limit))
        .fetch_all(&self.pool)
        .await
        .map_err(ApiError::db("list user returns"))?;
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM return_requests WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(ApiError::db("count user returns"))?;
        Ok(Paginated { data: rows, pagination: Pagination::new(page, limit, total) })
    }

    /// Plain listing with an optional status filter.
    pub async fn get_all_returns(
        &self,
        page: u32,
        limit: u32,
        status: Option<ReturnStatus>,
    ) -> Result<Paginated<ReturnRequest>, ApiError> {
        let status = status.map(ReturnStatus::as_str);
        let rows = sqlx::query_as::<_, ReturnRequest>(
            "SELECT * FROM return_requests WHERE ($1::text IS NULL OR status = $1) \
             ORDER BY requested_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(status)
        .bind(i64::from(limit))
        .bind(offset(page, limit))
        .fetch_all(&self.pool)
        .await
        .map_err(ApiError::db("list returns"))?;
        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM return_requests WHERE ($1::text IS NULL OR status = $1)")
                .bind(status)
                .fetch_one(&self.pool)
                .await
                .map_err(ApiError::db("count returns"))?;
        Ok(Paginated { data: rows, pagination: Pagination::new(page, limit, total) })
    }

    /// Admin listing: status filter plus an inclusive creation-date range and
    /// free-text search over return and order business IDs. Falls back to the
    /// plain listing when no admin-only filter is set.
    pub async fn get_all_returns_admin(
        &self,
        page: u32,
        limit: u32,
        filter: AdminReturnFilter,
    ) -> Result<Paginated<ReturnRequest>, ApiError> {
        if filter.is_plain_status_filter() {
            return self.get_all_returns(page, limit, filter.status).await;
        }
        let status = filter.status.map(ReturnStatus::as_str);
        let start = filter.start_date.map(day_start);
        let end_excl = filter.end_date.map(next_day_start);
        let search = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty());

        let rows = sqlx::query_as::<_, ReturnRequest>(
            "SELECT * FROM return_requests \
             WHERE ($1::text IS NULL OR status = $1) \
               AND ($2::timestamptz IS NULL OR requested_at >= $2) \
               AND ($3::timestamptz IS NULL OR requested_at < $3) \
               AND ($4::text IS NULL OR return_id ILIKE '%' || $4 || '%' OR order_number ILIKE '%' || $4 || '%') \
             ORDER BY requested_at DESC LIMIT $5 OFFSET $6",
        )
        .bind(status)
        .bind(start)
        .bind(end_excl)
        .bind(search)
        .bind(i64::from(limit))
        .bind(offset(page, limit))
        .fetch_all(&self.pool)
        .await
        .map_err(ApiError::db("list returns for admin"))?;
        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM return_requests \
             WHERE ($1::text IS NULL OR status = $1) \
               AND ($2::timestamptz IS NULL OR requested_at >= $2) \
               AND ($3::timestamptz IS NULL OR requested_at < $3) \
               AND ($4::text IS NULL OR return_id ILIKE '%' || $4 || '%' OR order_number ILIKE '%' || $4 || '%')",
        )
        .bind(status)
        .bind(start)
        .bind(end_excl)
        .bind(search)
        .fetch_one(&self.pool)
        .await
        .map_err(ApiError::db("count returns for admin"))?;
        Ok(Paginated { data: rows, pagination: Pagination::new(page, limit, total) })
    }

    /// Applies an admin status transition. The status machine is the sole
    /// gatekeeper; its error propagates verbatim. Entering `received` stamps
    /// `processed_at`; entering `processed` stamps both timestamps and flips
    /// the order to `refunded` when it is still `delivered`.
    pub async fn update_return_status(
        &self,
        return_id: &str,
        new_status: ReturnStatus,
        admin_notes: Option<String>,
        admin_id: Option<String>,
    ) -> Result<ReturnRequest, ApiError> {
        let record = self.get_return_by_id(return_id, None).await?;
        let current = return_status(&record)?;
        validate_transition(current, new_status)?;

        let now = Utc::now();
        let processed_at = match new_status {
            ReturnStatus::Received | ReturnStatus::Processed => Some(now),
            _ => record.processed_at,
        };
        let refund_processed_at = match new_status {
            ReturnStatus::Processed => Some(now),
            _ => record.refund_processed_at,
        };

        // Optimistic guard: the write only lands if the status is still the
        // one the transition was validated against, so two concurrent admin
        // updates cannot compose an edge the machine forbids.
        let updated = sqlx::query_as::<_, ReturnRequest>(
            "UPDATE return_requests SET status = $2, processed_at = $3, refund_processed_at = $4, \
             admin_notes = COALESCE($5, admin_notes), admin_updated_by = COALESCE($6, admin_updated_by), \
             admin_updated_at = $7 WHERE return_id = $1 AND status = $8 RETURNING *",
        )
        .bind(return_id)
        .bind(new_status.as_str())
        .bind(processed_at)
        .bind(refund_processed_at)
        .bind(admin_notes.as_deref())
        .bind(admin_id.as_deref())
        .bind(now)
        .bind(current.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(ApiError::db("update return status"))?
        .ok_or_else(|| concurrent_update_error(return_id, current))?;

        if new_status == ReturnStatus::Processed {
            self.mark_order_refunded(&updated.order_number).await;
        }
        self.events
            .publish(
                "returns.status_changed",
                &serde_json::json!({
                    "return_id": return_id,
                    "from": current.as_str(),
                    "to": new_status.as_str(),
                }),
            )
            .await;
        Ok(updated)
    }

    /// Cancellation is a hard delete, allowed only to the owner and only
    /// while no admin has acted on the request yet.
    pub async fn cancel_return_request(&self, return_id: &str, user_id: Uuid) -> Result<(), ApiError> {
        let record = self.get_return_by_id(return_id, Some(user_id)).await?;
        if return_status(&record)? != ReturnStatus::Requested {
            return Err(ApiError::State(
                "A return request can only be cancelled while it is still in 'requested' status".into(),
            ));
        }
        sqlx::query("DELETE FROM return_requests WHERE return_id = $1 AND user_id = $2")
            .bind(return_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(ApiError::db("cancel return request"))?;
        Ok(())
    }

    /// Per-status counts and refund totals over an inclusive `requested_at`
    /// range, plus the fixed requested/approved/processed summary.
    pub async fn get_return_analytics(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<ReturnAnalytics, ApiError> {
        let start = start_date.map(day_start);
        let end_excl = end_date.map(next_day_start);
        let by_status = sqlx::query_as::<_, StatusBucket>(
            "SELECT status, COUNT(*) AS count, COALESCE(SUM(refund_amount), 0)::BIGINT AS refund_total \
             FROM return_requests \
             WHERE ($1::timestamptz IS NULL OR requested_at >= $1) \
               AND ($2::timestamptz IS NULL OR requested_at < $2) \
             GROUP BY status ORDER BY status",
        )
        .bind(start)
        .bind(end_excl)
        .fetch_all(&self.pool)
        .await
        .map_err(ApiError::db("aggregate return analytics"))?;

        let count_of = |status: ReturnStatus| {
            by_status
                .iter()
                .find(|b| b.status == status.as_str())
                .map_or(0, |b| b.count)
        };
        let summary = AnalyticsSummary {
            requested: count_of(ReturnStatus::Requested),
            approved: count_of(ReturnStatus::Approved),
            processed: count_of(ReturnStatus::Processed),
        };
        Ok(ReturnAnalytics { by_status, summary })
    }

    async fn load_order(&self, order_number: &str, user_id: Option<Uuid>) -> Result<Order, ApiError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_number = $1")
            .bind(order_number)
            .fetch_optional(&self.pool)
            .await
            .map_err(ApiError::db("load order"))?
            .ok_or_else(|| ApiError::NotFound("Order not found".into()))?;
        // Ownership misses look identical to absence; no existence probing.
        if user_id.is_some_and(|uid| order.user_id != uid) {
            return Err(ApiError::NotFound("Order not found".into()));
        }
        Ok(order)
    }

    async fn count_returns_for_order(&self, order_number: &str) -> Result<i64, ApiError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM return_requests WHERE order_number = $1")
            .bind(order_number)
            .fetch_one(&self.pool)
            .await
            .map_err(ApiError::db("check existing returns"))?;
        Ok(count)
    }

    /// Flip to `refunded` only while the order is still `delivered`. A
    /// mismatch or failure is logged and skipped: return processing is not
    /// blocked by an inconsistency in the order record.
    async fn mark_order_refunded(&self, order_number: &str) {
        let result = sqlx::query("UPDATE orders SET status = 'refunded' WHERE order_number = $1 AND status = 'delivered'")
            .bind(order_number)
            .execute(&self.pool)
            .await;
        match result {
            Ok(done) if done.rows_affected() == 0 => {
                tracing::warn!(order_number, "order no longer 'delivered', refund flip skipped");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(order_number, error = %e, "could not flip order to refunded");
            }
        }
    }

    fn ineligible(&self, reason: &str) -> EligibilityReport {
        EligibilityReport {
            is_eligible: false,
            time_remaining_ms: 0,
            return_window_days: self.window_days,
            reason: reason.into(),
        }
    }
}

fn concurrent_update_error(return_id: &str, expected: ReturnStatus) -> ApiError {
    ApiError::State(format!(
        "Return request {return_id} is no longer in '{expected}' status, please reload and retry"
    ))
}

fn order_status(order: &Order) -> Result<OrderStatus, ApiError> {
    OrderStatus::parse(&order.status).ok_or_else(|| {
        ApiError::Internal(format!(
            "order {} has unknown status '{}'",
            order.order_number, order.status
        ))
    })
}

fn return_status(record: &ReturnRequest) -> Result<ReturnStatus, ApiError> {
    ReturnStatus::parse(&record.status).ok_or_else(|| {
        ApiError::Internal(format!(
            "return {} has unknown status '{}'",
            record.return_id, record.status
        ))
    })
}

fn offset(page: u32, limit: u32) -> i64 {
    i64::from(page.saturating_sub(1)) * i64::from(limit)
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn next_day_start(date: NaiveDate) -> DateTime<Utc> {
    day_start(date.checked_add_days(Days::new(1)).unwrap_or(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        assert_eq!(offset(1, 20), 0);
        assert_eq!(offset(3, 10), 20);
    }

    #[test]
    fn test_inclusive_date_range_bounds() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(day_start(d).to_rfc3339(), "2024-03-01T00:00:00+00:00");
        assert_eq!(next_day_start(d).to_rfc3339(), "2024-03-02T00:00:00+00:00");
    }

    #[test]
    fn test_concurrent_update_is_a_state_error() {
        let err = concurrent_update_error("RET-20240301-00001", ReturnStatus::Requested);
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("RET-20240301-00001"));
        assert!(err.to_string().contains("'requested'"));
    }

    #[test]
    fn test_plain_filter_detection() {
        assert!(AdminReturnFilter::default().is_plain_status_filter());
        assert!(AdminReturnFilter { status: Some(ReturnStatus::Approved), ..Default::default() }
            .is_plain_status_filter());
        assert!(!AdminReturnFilter { search: Some("RET".into()), ..Default::default() }
            .is_plain_status_filter());
    }
}
