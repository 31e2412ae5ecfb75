//! Shared types and models for the Chemical Manufacturing Inventory Platform
//!
//! This crate contains types shared between the backend and other components
//! of the system, plus the pure inventory-engine logic (FIFO batch
//! allocation, weighted-average costing, code generation) so it can be
//! exercised without a database.

pub mod allocation;
pub mod codes;
pub mod costing;
pub mod models;
pub mod types;
pub mod validation;

pub use allocation::*;
pub use codes::*;
pub use costing::*;
pub use models::*;
pub use types::*;
pub use validation::*;
