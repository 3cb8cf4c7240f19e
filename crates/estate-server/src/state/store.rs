//! Shared application state.
//!
//! Insertions into one estate are serialized through a per-estate mutex so
//! two requests never compute distances from the same stale neighbours.
//! Different estates proceed independently. A mutex lives in the map only
//! while some request holds or awaits it.

use std::sync::Arc;

use dashmap::DashMap;
use estate_core::{
    engine, CreateEstateRequest, DronePlan, EngineError, Estate, EstateStats, PlantTreeRequest,
    Plot,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::persistence::{Database, SqliteStore};

type EstateLocks = DashMap<Uuid, Arc<Mutex<()>>>;

pub struct AppState {
    db: Database,
    estate_locks: EstateLocks,
}

/// Held while inserting into one estate; evicts the map entry on release
/// when no other request is waiting for it.
struct EstateGuard<'a> {
    locks: &'a EstateLocks,
    estate_id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for EstateGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Clones are handed out under the same shard lock, so a count of one
        // means the map holds the only reference.
        self.locks
            .remove_if(&self.estate_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            estate_locks: DashMap::new(),
        }
    }

    async fn lock_estate(&self, estate_id: Uuid) -> EstateGuard<'_> {
        let lock = self
            .estate_locks
            .entry(estate_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let mut guard = EstateGuard {
            locks: &self.estate_locks,
            estate_id,
            guard: None,
        };
        guard.guard = Some(lock.lock_owned().await);
        guard
    }

    pub async fn create_estate(&self, request: CreateEstateRequest) -> Result<Estate, EngineError> {
        let mut store = SqliteStore::begin_write(self.db.pool()).await?;
        let estate = engine::create_estate(&mut store, request).await?;
        store.commit().await?;
        tracing::info!("Created estate {} ({}x{})", estate.id, estate.width, estate.length);
        Ok(estate)
    }

    /// Plant a tree atomically: either every distance and aggregate update
    /// lands, or none does.
    pub async fn place_tree(
        &self,
        estate_id: Uuid,
        request: PlantTreeRequest,
    ) -> Result<Plot, EngineError> {
        let _guard = self.lock_estate(estate_id).await;

        let mut store = SqliteStore::begin_write(self.db.pool()).await?;
        let plot = engine::place_tree(&mut store, estate_id, request).await?;
        store.commit().await?;

        tracing::info!(
            "Planted tree {} at ({}, {}) in estate {}",
            plot.id, plot.x, plot.y, estate_id
        );
        Ok(plot)
    }

    pub async fn estate_stats(&self, estate_id: Uuid) -> Result<EstateStats, EngineError> {
        let mut store = SqliteStore::begin(self.db.pool()).await?;
        engine::estate_stats(&mut store, estate_id).await
    }

    pub async fn drone_plan(
        &self,
        estate_id: Uuid,
        max_distance: Option<i64>,
    ) -> Result<DronePlan, EngineError> {
        let mut store = SqliteStore::begin(self.db.pool()).await?;
        engine::drone_plan(&mut store, estate_id, max_distance).await
    }
}
