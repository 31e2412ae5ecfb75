//! Database models for the Chemical Manufacturing Inventory Platform
//!
//! Re-exports models from the shared crate and adds backend-specific models

pub use shared::models::*;
