//! Persistence layer for the estate server.
//!
//! SQLite-backed storage for estates and plots. [`SqliteStore`] adapts it to
//! the engine's storage collaborator, one transaction per operation.

pub mod db;
pub mod estates;
pub mod plots;
pub mod store;

pub use db::{connect_with_retry, init_database, Database};
pub use store::SqliteStore;
