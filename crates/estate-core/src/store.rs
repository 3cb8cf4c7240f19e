//! Storage collaborator used by the engine.
//!
//! Lookups that find nothing return `Ok(None)`; that is a normal outcome, not
//! an error. An implementation handed to [`crate::place_tree`] must scope all
//! of its calls to a single all-or-nothing unit of work, and callers must
//! serialize insertions into the same estate.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Estate, Plot};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store failed (connection, query, constraint, bad row).
    #[error("storage error: {0}")]
    Backend(#[source] BoxError),
}

impl StoreError {
    pub fn backend(err: impl Into<BoxError>) -> Self {
        Self::Backend(err.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait PlotStore: Send {
    async fn insert_estate(&mut self, estate: &Estate) -> StoreResult<()>;

    async fn find_estate(&mut self, estate_id: Uuid) -> StoreResult<Option<Estate>>;

    /// Persist the aggregate fields of an existing estate.
    async fn update_estate(&mut self, estate: &Estate) -> StoreResult<()>;

    async fn find_plot(&mut self, estate_id: Uuid, x: i64, y: i64) -> StoreResult<Option<Plot>>;

    async fn insert_plot(&mut self, plot: &Plot) -> StoreResult<Uuid>;

    /// Persist a changed `distance`; no other plot field is ever mutated.
    async fn update_plot(&mut self, plot: &Plot) -> StoreResult<()>;

    /// Occupied plot with the greatest order number below `order_number`.
    async fn find_nearest_behind(
        &mut self,
        estate_id: Uuid,
        order_number: i64,
    ) -> StoreResult<Option<Plot>>;

    /// Occupied plot with the smallest order number above `order_number`.
    async fn find_nearest_ahead(
        &mut self,
        estate_id: Uuid,
        order_number: i64,
    ) -> StoreResult<Option<Plot>>;

    /// Add `delta` to the distance of every plot with a greater order number.
    async fn shift_distances_after(
        &mut self,
        estate_id: Uuid,
        order_number: i64,
        delta: i64,
    ) -> StoreResult<()>;

    /// Median of all tree heights in the estate, zero when empty.
    async fn median_tree_height(&mut self, estate_id: Uuid) -> StoreResult<i64>;

    /// Plot with the greatest distance not exceeding `ceiling`.
    async fn find_plot_by_max_distance(
        &mut self,
        estate_id: Uuid,
        ceiling: i64,
    ) -> StoreResult<Option<Plot>>;

    /// Plot stored at exactly `order_number`.
    async fn find_plot_by_order(
        &mut self,
        estate_id: Uuid,
        order_number: i64,
    ) -> StoreResult<Option<Plot>>;
}
