//! Estate CLI - Command line tools for the estate server.
//!
//! Binaries:
//! - seed_estate: create an estate and plant a random set of trees
//! - drone_plan: query the drone plan for an existing estate

pub mod scenario;

pub use scenario::{random_planting, Scenario};
