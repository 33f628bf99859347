//! Service layer modules.
//!
//! Contains the building generator, the in-memory snapshot store, the model
//! client and the logic that applies model analyses to a building.

pub mod ai_client;
pub mod analysis;
pub mod generator;
pub mod store;

pub use ai_client::AiClient;
pub use analysis::AnalysisGate;
pub use store::BuildingStore;
