//! Pure domain logic: status machine, return window, pricing, refund math.

pub mod delivery;
pub mod eligibility;
pub mod returns;
pub mod status;
