//! Daily-sequential human-readable business IDs

use chrono::{DateTime, Days, Local, NaiveDate};
use sqlx::PgPool;

use crate::error::ApiError;

/// Tables that carry daily-sequential business IDs.
#[derive(Clone, Copy, Debug)]
pub enum SequenceScope {
    Returns,
    Orders,
}

impl SequenceScope {
    fn prefix(self) -> &'static str {
        match self {
            SequenceScope::Returns => "RET",
            SequenceScope::Orders => "ORD",
        }
    }

    fn count_sql(self) -> &'static str {
        match self {
            SequenceScope::Returns => {
                "SELECT COUNT(*) FROM return_requests WHERE requested_at >= $1 AND requested_at < $2"
            }
            SequenceScope::Orders => {
                "SELECT COUNT(*) FROM orders WHERE placed_at >= $1 AND placed_at < $2"
            }
        }
    }
}

/// Mints the next `PREFIX-YYYYMMDD-00001` ID for today (server-local time).
///
/// The count and the caller's insert are separate statements, so two
/// concurrent creations on the same day can read the same count. The unique
/// constraint on the business-ID column turns that collision into an insert
/// failure rather than a silent duplicate.
pub async fn next_daily_id(pool: &PgPool, scope: SequenceScope) -> Result<String, ApiError> {
    let now = Local::now();
    let (start, end) = local_day_bounds(now)?;
    let (count,): (i64,) = sqlx::query_as(scope.count_sql())
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await
        .map_err(ApiError::db("count today's documents for sequence id"))?;
    Ok(format_sequence_id(scope.prefix(), now.date_naive(), count + 1))
}

// Both bounds are resolved as calendar midnights so the window stays
// aligned with the local date even across DST transitions.
fn local_day_bounds(now: DateTime<Local>) -> Result<(DateTime<Local>, DateTime<Local>), ApiError> {
    let today = now.date_naive();
    let tomorrow = today
        .checked_add_days(Days::new(1))
        .ok_or_else(|| ApiError::Internal("date overflow computing day bounds".into()))?;
    Ok((local_midnight(today)?, local_midnight(tomorrow)?))
}

fn local_midnight(date: NaiveDate) -> Result<DateTime<Local>, ApiError> {
    date.and_hms_opt(0, 0, 0)
        .and_then(|naive| naive.and_local_timezone(Local).earliest())
        .ok_or_else(|| ApiError::Internal("could not resolve local midnight".into()))
}

fn format_sequence_id(prefix: &str, date: NaiveDate, sequence: i64) -> String {
    format!("{}-{}-{:05}", prefix, date.format("%Y%m%d"), sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_id_format() {
        assert_eq!(format_sequence_id("RET", date(2024, 3, 1), 1), "RET-20240301-00001");
        assert_eq!(format_sequence_id("ORD", date(2024, 12, 31), 42), "ORD-20241231-00042");
    }

    #[test]
    fn test_sequence_wider_than_padding_is_kept() {
        assert_eq!(format_sequence_id("RET", date(2024, 3, 1), 123_456), "RET-20240301-123456");
    }

    #[test]
    fn test_day_bounds_are_consecutive_local_midnights() {
        let now = Local::now();
        let (start, end) = local_day_bounds(now).unwrap();
        assert_eq!(start.time(), chrono::NaiveTime::MIN);
        assert_eq!(end.time(), chrono::NaiveTime::MIN);
        assert_eq!(end.date_naive(), start.date_naive().checked_add_days(Days::new(1)).unwrap());
        assert!(start <= now && now < end);
    }
}
