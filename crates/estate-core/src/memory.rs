//! In-memory [`PlotStore`].
//!
//! Plots are keyed by `(estate, order number)` so neighbour lookups and the
//! tail shift are ordered range scans. Not durable and not transactional: a
//! failed insertion may leave partial writes behind.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Estate, Plot};
use crate::stats::median_height;
use crate::store::{PlotStore, StoreResult};

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    estates: HashMap<Uuid, Estate>,
    plots: BTreeMap<(Uuid, i64), Plot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All plots of an estate in scan order.
    pub fn plots(&self, estate_id: Uuid) -> Vec<Plot> {
        self.estate_plots(estate_id).cloned().collect()
    }

    fn estate_plots(&self, estate_id: Uuid) -> impl Iterator<Item = &Plot> + '_ {
        self.plots
            .range((estate_id, i64::MIN)..=(estate_id, i64::MAX))
            .map(|(_, plot)| plot)
    }
}

#[async_trait]
impl PlotStore for MemoryStore {
    async fn insert_estate(&mut self, estate: &Estate) -> StoreResult<()> {
        self.estates.insert(estate.id, estate.clone());
        Ok(())
    }

    async fn find_estate(&mut self, estate_id: Uuid) -> StoreResult<Option<Estate>> {
        Ok(self.estates.get(&estate_id).cloned())
    }

    async fn update_estate(&mut self, estate: &Estate) -> StoreResult<()> {
        self.estates.insert(estate.id, estate.clone());
        Ok(())
    }

    async fn find_plot(&mut self, estate_id: Uuid, x: i64, y: i64) -> StoreResult<Option<Plot>> {
        Ok(self
            .estate_plots(estate_id)
            .find(|plot| plot.x == x && plot.y == y)
            .cloned())
    }

    async fn insert_plot(&mut self, plot: &Plot) -> StoreResult<Uuid> {
        self.plots
            .insert((plot.estate_id, plot.order_number), plot.clone());
        Ok(plot.id)
    }

    async fn update_plot(&mut self, plot: &Plot) -> StoreResult<()> {
        if let Some(stored) = self.plots.get_mut(&(plot.estate_id, plot.order_number)) {
            stored.distance = plot.distance;
        }
        Ok(())
    }

    async fn find_nearest_behind(
        &mut self,
        estate_id: Uuid,
        order_number: i64,
    ) -> StoreResult<Option<Plot>> {
        Ok(self
            .plots
            .range((estate_id, i64::MIN)..(estate_id, order_number))
            .next_back()
            .map(|(_, plot)| plot.clone()))
    }

    async fn find_nearest_ahead(
        &mut self,
        estate_id: Uuid,
        order_number: i64,
    ) -> StoreResult<Option<Plot>> {
        if order_number == i64::MAX {
            return Ok(None);
        }
        Ok(self
            .plots
            .range((estate_id, order_number + 1)..=(estate_id, i64::MAX))
            .next()
            .map(|(_, plot)| plot.clone()))
    }

    async fn shift_distances_after(
        &mut self,
        estate_id: Uuid,
        order_number: i64,
        delta: i64,
    ) -> StoreResult<()> {
        if order_number == i64::MAX {
            return Ok(());
        }
        for (_, plot) in self
            .plots
            .range_mut((estate_id, order_number + 1)..=(estate_id, i64::MAX))
        {
            plot.distance += delta;
        }
        Ok(())
    }

    async fn median_tree_height(&mut self, estate_id: Uuid) -> StoreResult<i64> {
        let heights: Vec<i64> = self
            .estate_plots(estate_id)
            .map(|plot| plot.tree_height)
            .collect();
        Ok(median_height(&heights))
    }

    async fn find_plot_by_max_distance(
        &mut self,
        estate_id: Uuid,
        ceiling: i64,
    ) -> StoreResult<Option<Plot>> {
        Ok(self
            .estate_plots(estate_id)
            .filter(|plot| plot.distance <= ceiling)
            .max_by_key(|plot| (plot.distance, plot.order_number))
            .cloned())
    }

    async fn find_plot_by_order(
        &mut self,
        estate_id: Uuid,
        order_number: i64,
    ) -> StoreResult<Option<Plot>> {
        Ok(self.plots.get(&(estate_id, order_number)).cloned())
    }
}
