//! Return window policy
//!
//! An order is returnable for a configurable number of days after its
//! delivery timestamp (falling back to placement). The deadline instant
//! itself still counts as eligible.

use chrono::{DateTime, Duration, Utc};

pub fn is_within_return_window(delivered_at: DateTime<Utc>, window_days: i64) -> bool {
    within_window_at(delivered_at, window_days, Utc::now())
}

pub fn within_window_at(delivered_at: DateTime<Utc>, window_days: i64, now: DateTime<Utc>) -> bool {
    now - delivered_at <= Duration::days(window_days)
}

/// Milliseconds left before the window closes, floored at zero.
pub fn time_remaining_ms(delivered_at: DateTime<Utc>, window_days: i64, now: DateTime<Utc>) -> i64 {
    let deadline = delivered_at + Duration::days(window_days);
    (deadline - now).num_milliseconds().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn t(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap().and_utc()
    }

    #[test]
    fn test_inside_window() {
        let delivered = t("2024-03-01 12:00:00");
        let now = t("2024-03-04 12:00:00");
        assert!(within_window_at(delivered, 7, now));
    }

    #[test]
    fn test_boundary_instant_is_eligible() {
        let delivered = t("2024-03-01 12:00:00");
        let deadline = delivered + Duration::days(7);
        assert!(within_window_at(delivered, 7, deadline));
    }

    #[test]
    fn test_one_millisecond_past_deadline_is_not() {
        let delivered = t("2024-03-01 12:00:00");
        let just_past = delivered + Duration::days(7) + Duration::milliseconds(1);
        assert!(!within_window_at(delivered, 7, just_past));
    }

    #[test]
    fn test_time_remaining() {
        let delivered = t("2024-03-01 12:00:00");
        let now = delivered + Duration::days(3);
        assert_eq!(time_remaining_ms(delivered, 7, now), Duration::days(4).num_milliseconds());
    }

    #[test]
    fn test_time_remaining_floors_at_zero() {
        let delivered = t("2024-03-01 12:00:00");
        let now = delivered + Duration::days(10);
        assert_eq!(time_remaining_ms(delivered, 7, now), 0);
    }
}
