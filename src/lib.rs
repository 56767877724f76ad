//! Returns & Delivery Core
//!
//! The returns-and-delivery slice of the storefront backend.
//!
//! ## Features
//! - Order-return workflow: eligibility window, status machine, snapshot refunds
//! - Delivery-zone serviceability lookup by pincode
//! - Weight/threshold-based delivery charge calculation
//! - Daily-sequential business IDs for orders and returns

pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod http;
pub mod models;
pub mod pagination;
pub mod services;
