//! Domain types and DTOs
//!
//! These types define the construction-progress model: the stage taxonomy,
//! the building snapshot and the model analysis contract.

pub mod ai;
pub mod building;
pub mod stages;

// Re-export commonly used types
pub use building::*;
pub use stages::*;

// AI types are accessed via crate::domain::ai:: to avoid namespace pollution
