//! Return line items: validation against the order snapshot and refund math
//!
//! Refunds are computed from the order's line-item snapshot, never from the
//! live product price, so later price changes cannot alter a refund.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// One line item as snapshotted on the order at placement time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: u32,
    pub unit_price: i64,
    pub weight: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCondition {
    Unopened,
    Used,
    Damaged,
}

/// One item of a return request, positioned into the order's snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReturnItem {
    pub order_item_index: usize,
    pub quantity: u32,
    pub reason: String,
    pub condition: ItemCondition,
}

/// Checks every item index and quantity against the order snapshot.
pub fn validate_return_items(items: &[ReturnItem], ordered: &[OrderLineItem]) -> Result<(), ApiError> {
    if items.is_empty() {
        return Err(ApiError::Validation("At least one return item is required".into()));
    }
    for item in items {
        let Some(line) = ordered.get(item.order_item_index) else {
            return Err(ApiError::Validation(format!(
                "Invalid item index {}: the order has {} items",
                item.order_item_index,
                ordered.len()
            )));
        };
        if item.quantity == 0 {
            return Err(ApiError::Validation(format!(
                "Requested quantity must be at least 1 at index {}",
                item.order_item_index
            )));
        }
        if item.quantity > line.quantity {
            return Err(ApiError::Validation(format!(
                "Requested quantity {} exceeds ordered quantity {} at index {}",
                item.quantity, line.quantity, item.order_item_index
            )));
        }
    }
    Ok(())
}

/// Sum of snapshot unit price times requested quantity over all items.
/// Callers must validate the items first; out-of-range indexes contribute
/// nothing here.
pub fn refund_amount(items: &[ReturnItem], ordered: &[OrderLineItem]) -> i64 {
    items
        .iter()
        .filter_map(|item| {
            ordered
                .get(item.order_item_index)
                .map(|line| line.unit_price * i64::from(item.quantity))
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Vec<OrderLineItem> {
        vec![
            OrderLineItem { product_id: Uuid::new_v4(), name: "Kettle".into(), quantity: 2, unit_price: 1500, weight: 1.2 },
            OrderLineItem { product_id: Uuid::new_v4(), name: "Toaster".into(), quantity: 1, unit_price: 3200, weight: 2.0 },
        ]
    }

    fn item(index: usize, quantity: u32) -> ReturnItem {
        ReturnItem { order_item_index: index, quantity, reason: "defective".into(), condition: ItemCondition::Damaged }
    }

    #[test]
    fn test_valid_items_pass() {
        validate_return_items(&[item(0, 2), item(1, 1)], &snapshot()).unwrap();
    }

    #[test]
    fn test_empty_items_rejected() {
        assert!(validate_return_items(&[], &snapshot()).is_err());
    }

    #[test]
    fn test_out_of_range_index_names_the_index() {
        let err = validate_return_items(&[item(2, 1)], &snapshot()).unwrap_err();
        assert!(err.to_string().contains("index 2"));
    }

    #[test]
    fn test_excess_quantity_rejected() {
        let err = validate_return_items(&[item(1, 2)], &snapshot()).unwrap_err();
        assert!(err.to_string().contains("exceeds ordered quantity"));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        assert!(validate_return_items(&[item(0, 0)], &snapshot()).is_err());
    }

    #[test]
    fn test_refund_uses_snapshot_prices() {
        let refund = refund_amount(&[item(0, 2), item(1, 1)], &snapshot());
        assert_eq!(refund, 2 * 1500 + 3200);
    }

    #[test]
    fn test_refund_of_partial_quantities() {
        assert_eq!(refund_amount(&[item(0, 1)], &snapshot()), 1500);
    }
}
