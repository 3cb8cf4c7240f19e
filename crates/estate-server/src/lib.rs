//! Shared library surface for the estate server and its tests.

pub mod api;
pub mod backoff;
pub mod config;
pub mod persistence;
pub mod state;
