//! Delivery charge calculation
//!
//! Pure arithmetic over a zone's base charge: a per-kg surcharge above the
//! zone's free-weight limit, and a capped discount for high-value orders.
//! All amounts are whole currency units.

use serde::Serialize;

/// Charge per whole kg (rounded up) above the zone's free-weight limit.
pub const EXTRA_WEIGHT_UNIT_CHARGE: i64 = 20;
/// Order value at and above which the free-delivery discount applies.
pub const FREE_DELIVERY_THRESHOLD: i64 = 100_000;
/// The discount never exceeds this, nor the total charge itself.
pub const FREE_DELIVERY_DISCOUNT_CAP: i64 = 50;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChargeBreakdown {
    pub original_charge: i64,
    pub total_charge: i64,
    pub weight_surcharge: i64,
    pub discount: i64,
    pub final_charge: i64,
    pub free_delivery_eligible: bool,
}

/// Computes the delivery charge breakdown for one shipment. Deterministic,
/// no side effects.
pub fn calculate_charges(
    zone_charge: i64,
    max_free_weight: f64,
    weight: f64,
    order_value: i64,
) -> ChargeBreakdown {
    let weight_surcharge = if weight > max_free_weight {
        (weight - max_free_weight).ceil() as i64 * EXTRA_WEIGHT_UNIT_CHARGE
    } else {
        0
    };
    let total_charge = zone_charge + weight_surcharge;

    let free_delivery_eligible = order_value >= FREE_DELIVERY_THRESHOLD;
    let discount = if free_delivery_eligible {
        FREE_DELIVERY_DISCOUNT_CAP.min(total_charge)
    } else {
        0
    };

    ChargeBreakdown {
        original_charge: zone_charge,
        total_charge,
        weight_surcharge,
        discount,
        final_charge: (total_charge - discount).max(0),
        free_delivery_eligible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let a = calculate_charges(50, 5.0, 7.3, 120_000);
        let b = calculate_charges(50, 5.0, 7.3, 120_000);
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_surcharge_at_or_below_free_weight() {
        assert_eq!(calculate_charges(50, 5.0, 5.0, 0).weight_surcharge, 0);
        assert_eq!(calculate_charges(50, 5.0, 2.5, 0).weight_surcharge, 0);
    }

    #[test]
    fn test_partial_kg_rounds_up() {
        // 0.1 kg over still bills one full unit
        let b = calculate_charges(50, 5.0, 5.1, 0);
        assert_eq!(b.weight_surcharge, EXTRA_WEIGHT_UNIT_CHARGE);
        assert_eq!(b.total_charge, 70);
    }

    #[test]
    fn test_heavy_shipment_below_threshold() {
        // 7 kg against a 5 kg limit: ceil(2) * 20 = 40
        let b = calculate_charges(50, 5.0, 7.0, 50_000);
        assert_eq!(b.weight_surcharge, 40);
        assert_eq!(b.total_charge, 90);
        assert_eq!(b.discount, 0);
        assert_eq!(b.final_charge, 90);
        assert!(!b.free_delivery_eligible);
    }

    #[test]
    fn test_discount_capped_by_total_charge() {
        // total 30 < cap 50, so the discount zeroes the charge exactly
        let b = calculate_charges(30, 5.0, 3.0, 150_000);
        assert!(b.free_delivery_eligible);
        assert_eq!(b.discount, 30);
        assert_eq!(b.final_charge, 0);
    }

    #[test]
    fn test_discount_cap_applies_on_large_charges() {
        let b = calculate_charges(200, 5.0, 5.0, 100_000);
        assert_eq!(b.discount, FREE_DELIVERY_DISCOUNT_CAP);
        assert_eq!(b.final_charge, 150);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(calculate_charges(50, 5.0, 1.0, FREE_DELIVERY_THRESHOLD).free_delivery_eligible);
        assert!(!calculate_charges(50, 5.0, 1.0, FREE_DELIVERY_THRESHOLD - 1).free_delivery_eligible);
    }

    #[test]
    fn test_final_charge_never_negative() {
        let b = calculate_charges(0, 5.0, 1.0, 200_000);
        assert_eq!(b.final_charge, 0);
    }
}
