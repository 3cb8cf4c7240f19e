//! Transaction-scoped [`PlotStore`] backed by SQLite.
//!
//! Every call runs on the same transaction. Dropping the store without
//! calling [`SqliteStore::commit`] rolls back all of its writes.

use async_trait::async_trait;
use estate_core::store::{PlotStore, StoreError, StoreResult};
use estate_core::{Estate, Plot};
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use super::{estates, plots};

pub struct SqliteStore {
    tx: Transaction<'static, Sqlite>,
}

impl SqliteStore {
    /// Deferred transaction for read-only work.
    pub async fn begin(pool: &SqlitePool) -> StoreResult<Self> {
        let tx = pool.begin().await.map_err(StoreError::backend)?;
        Ok(Self { tx })
    }

    /// Transaction holding the database write lock from its first statement.
    ///
    /// A deferred transaction that reads before writing cannot upgrade while
    /// another writer is active and fails with `SQLITE_BUSY` instead of
    /// waiting, so writers must take the lock up front.
    pub async fn begin_write(pool: &SqlitePool) -> StoreResult<Self> {
        let tx = pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(StoreError::backend)?;
        Ok(Self { tx })
    }

    pub async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await.map_err(StoreError::backend)
    }
}

fn backend(err: anyhow::Error) -> StoreError {
    StoreError::backend(err)
}

#[async_trait]
impl PlotStore for SqliteStore {
    async fn insert_estate(&mut self, estate: &Estate) -> StoreResult<()> {
        estates::insert_estate(&mut self.tx, estate).await.map_err(backend)
    }

    async fn find_estate(&mut self, estate_id: Uuid) -> StoreResult<Option<Estate>> {
        estates::find_estate(&mut self.tx, estate_id).await.map_err(backend)
    }

    async fn update_estate(&mut self, estate: &Estate) -> StoreResult<()> {
        estates::update_estate(&mut self.tx, estate).await.map_err(backend)
    }

    async fn find_plot(&mut self, estate_id: Uuid, x: i64, y: i64) -> StoreResult<Option<Plot>> {
        plots::find_by_coordinates(&mut self.tx, estate_id, x, y)
            .await
            .map_err(backend)
    }

    async fn insert_plot(&mut self, plot: &Plot) -> StoreResult<Uuid> {
        plots::insert_plot(&mut self.tx, plot).await.map_err(backend)?;
        Ok(plot.id)
    }

    async fn update_plot(&mut self, plot: &Plot) -> StoreResult<()> {
        plots::update_distance(&mut self.tx, plot).await.map_err(backend)
    }

    async fn find_nearest_behind(
        &mut self,
        estate_id: Uuid,
        order_number: i64,
    ) -> StoreResult<Option<Plot>> {
        plots::find_nearest_behind(&mut self.tx, estate_id, order_number)
            .await
            .map_err(backend)
    }

    async fn find_nearest_ahead(
        &mut self,
        estate_id: Uuid,
        order_number: i64,
    ) -> StoreResult<Option<Plot>> {
        plots::find_nearest_ahead(&mut self.tx, estate_id, order_number)
            .await
            .map_err(backend)
    }

    async fn shift_distances_after(
        &mut self,
        estate_id: Uuid,
        order_number: i64,
        delta: i64,
    ) -> StoreResult<()> {
        let shifted = plots::shift_distances_after(&mut self.tx, estate_id, order_number, delta)
            .await
            .map_err(backend)?;
        tracing::trace!("Shifted {} plot(s) after order {} by {}", shifted, order_number, delta);
        Ok(())
    }

    async fn median_tree_height(&mut self, estate_id: Uuid) -> StoreResult<i64> {
        plots::median_tree_height(&mut self.tx, estate_id)
            .await
            .map_err(backend)
    }

    async fn find_plot_by_max_distance(
        &mut self,
        estate_id: Uuid,
        ceiling: i64,
    ) -> StoreResult<Option<Plot>> {
        plots::find_by_max_distance(&mut self.tx, estate_id, ceiling)
            .await
            .map_err(backend)
    }

    async fn find_plot_by_order(
        &mut self,
        estate_id: Uuid,
        order_number: i64,
    ) -> StoreResult<Option<Plot>> {
        plots::find_by_order(&mut self.tx, estate_id, order_number)
            .await
            .map_err(backend)
    }
}
