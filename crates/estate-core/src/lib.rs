//! Core logic for estate plot placement and drone flight distances.
//!
//! The engine is storage-agnostic: every read and write goes through the
//! [`PlotStore`] collaborator, which the caller scopes to one unit of work.

pub mod distance;
pub mod engine;
pub mod error;
pub mod flight;
pub mod grid;
pub mod memory;
pub mod models;
pub mod stats;
pub mod store;

pub use engine::{create_estate, drone_plan, estate_stats, place_tree};
pub use error::{EngineError, ValidationError};
pub use memory::MemoryStore;
pub use models::{
    CreateEstateRequest, DronePlan, Estate, EstateStats, PlantTreeRequest, Plot, RestPoint,
};
pub use store::{PlotStore, StoreError};
