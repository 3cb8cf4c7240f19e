//! Estate SDK - client library for the estate server
//!
//! Wraps the REST API for creating estates, planting trees and planning drone
//! flights.

pub mod client;

pub use client::{EstateClient, ServerError};
pub use estate_core::{DronePlan, EstateStats, RestPoint};
