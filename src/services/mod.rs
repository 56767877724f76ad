//! Service layer: database-backed orchestration over the domain logic.

pub mod delivery;
pub mod orders;
pub mod returns;
pub mod sequence;
