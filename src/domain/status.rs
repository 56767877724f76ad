//! Order and return-request status machines

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ApiError;

/// Lifecycle of a return request. `Processed` and `Rejected` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStatus {
    Requested,
    Approved,
    Rejected,
    PickedUp,
    Received,
    Processed,
}

impl ReturnStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReturnStatus::Requested => "requested",
            ReturnStatus::Approved => "approved",
            ReturnStatus::Rejected => "rejected",
            ReturnStatus::PickedUp => "picked_up",
            ReturnStatus::Received => "received",
            ReturnStatus::Processed => "processed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "requested" => Some(ReturnStatus::Requested),
            "approved" => Some(ReturnStatus::Approved),
            "rejected" => Some(ReturnStatus::Rejected),
            "picked_up" => Some(ReturnStatus::PickedUp),
            "received" => Some(ReturnStatus::Received),
            "processed" => Some(ReturnStatus::Processed),
            _ => None,
        }
    }

    /// Outgoing edges of the transition graph. Empty for terminal states.
    pub fn next_allowed(self) -> &'static [ReturnStatus] {
        match self {
            ReturnStatus::Requested => &[ReturnStatus::Approved, ReturnStatus::Rejected],
            ReturnStatus::Approved => &[ReturnStatus::PickedUp, ReturnStatus::Rejected],
            ReturnStatus::PickedUp => &[ReturnStatus::Received],
            ReturnStatus::Received => &[ReturnStatus::Processed],
            ReturnStatus::Processed | ReturnStatus::Rejected => &[],
        }
    }

    pub fn can_transition_to(self, next: ReturnStatus) -> bool {
        self.next_allowed().contains(&next)
    }
}

impl fmt::Display for ReturnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sole gatekeeper for status writes: every update must pass through here.
pub fn validate_transition(current: ReturnStatus, requested: ReturnStatus) -> Result<(), ApiError> {
    if current.can_transition_to(requested) {
        Ok(())
    } else {
        Err(ApiError::State(format!(
            "Invalid transition: a return request cannot move from '{current}' to '{requested}'"
        )))
    }
}

/// Order lifecycle as persisted by the order service. This core only ever
/// reads it, and writes back the single `delivered` -> `refunded` flip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    OutForDelivery,
    Delivered,
    Cancelled,
    Refunded,
    Failed,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
            OrderStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "shipped" => Some(OrderStatus::Shipped),
            "out_for_delivery" => Some(OrderStatus::OutForDelivery),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            "refunded" => Some(OrderStatus::Refunded),
            "failed" => Some(OrderStatus::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ReturnStatus::*;

    const ALL: [ReturnStatus; 6] = [Requested, Approved, Rejected, PickedUp, Received, Processed];

    #[test]
    fn test_edge_list_matches_graph() {
        assert_eq!(Requested.next_allowed(), &[Approved, Rejected]);
        assert_eq!(Approved.next_allowed(), &[PickedUp, Rejected]);
        assert_eq!(PickedUp.next_allowed(), &[Received]);
        assert_eq!(Received.next_allowed(), &[Processed]);
    }

    #[test]
    fn test_terminal_states_have_no_edges() {
        assert!(Processed.next_allowed().is_empty());
        assert!(Rejected.next_allowed().is_empty());
    }

    #[test]
    fn test_every_allowed_pair_accepted() {
        for from in ALL {
            for to in from.next_allowed() {
                validate_transition(from, *to).unwrap();
            }
        }
    }

    #[test]
    fn test_every_other_pair_rejected() {
        for from in ALL {
            for to in ALL {
                if !from.next_allowed().contains(&to) {
                    let err = validate_transition(from, to).unwrap_err();
                    assert!(err.to_string().contains(from.as_str()));
                    assert!(err.to_string().contains(to.as_str()));
                }
            }
        }
    }

    #[test]
    fn test_requested_to_received_is_invalid() {
        assert!(validate_transition(Requested, Received).is_err());
    }

    #[test]
    fn test_parse_roundtrip() {
        for s in ALL {
            assert_eq!(ReturnStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(ReturnStatus::parse("shipped"), None);
        assert_eq!(OrderStatus::parse("out_for_delivery"), Some(OrderStatus::OutForDelivery));
        assert_eq!(OrderStatus::parse("picked_up"), None);
    }
}
