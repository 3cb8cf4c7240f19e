//! Estate operations: planting, statistics and drone plans.
//!
//! Each operation runs against a caller-scoped [`PlotStore`]. For
//! [`place_tree`] the caller must commit all writes together or discard them.

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::distance::{assign_distance, coverage_increment, forward_shift, Shift};
use crate::error::{EngineError, ValidationError};
use crate::flight::{rest_point, LANDING_RESERVE};
use crate::grid::order_number;
use crate::models::{CreateEstateRequest, DronePlan, Estate, EstateStats, PlantTreeRequest, Plot};
use crate::store::{PlotStore, StoreError};

/// Create an empty estate.
pub async fn create_estate<S>(store: &mut S, request: CreateEstateRequest) -> Result<Estate, EngineError>
where
    S: PlotStore + ?Sized,
{
    request.validate()?;
    let estate = Estate::new(request.width, request.length);
    store.insert_estate(&estate).await?;
    debug!("Created estate {} ({}x{})", estate.id, estate.width, estate.length);
    Ok(estate)
}

/// Plant a tree and update every distance and aggregate it affects.
pub async fn place_tree<S>(
    store: &mut S,
    estate_id: Uuid,
    request: PlantTreeRequest,
) -> Result<Plot, EngineError>
where
    S: PlotStore + ?Sized,
{
    request.validate()?;
    let PlantTreeRequest { x, y, height } = request;

    if store.find_plot(estate_id, x, y).await?.is_some() {
        return Err(ValidationError::Occupied { x, y }.into());
    }

    let mut estate = store
        .find_estate(estate_id)
        .await?
        .ok_or(EngineError::EstateNotFound(estate_id))?;
    if !estate.contains(x, y) {
        return Err(ValidationError::OutOfRange { x, y }.into());
    }

    let order = order_number(x, y, estate.length);
    let behind = store.find_nearest_behind(estate_id, order).await?;
    let plot = Plot {
        id: Uuid::new_v4(),
        estate_id,
        x,
        y,
        order_number: order,
        distance: assign_distance(behind.as_ref(), order, height),
        tree_height: height,
        created_at: Utc::now(),
    };
    store.insert_plot(&plot).await?;
    debug!(
        "Placed tree at ({}, {}) order {} distance {} in estate {}",
        x, y, order, plot.distance, estate_id
    );

    if let Some(shift) = propagate_forward(store, &plot).await? {
        debug!("Shifted distances ahead of order {} by {}", order, shift.delta);
    }

    let median = store.median_tree_height(estate_id).await?;
    let prev = store.find_plot_by_order(estate_id, order - 1).await?;
    let next = store.find_plot_by_order(estate_id, order + 1).await?;
    let coverage = coverage_increment(
        prev.map(|p| p.tree_height),
        next.map(|p| p.tree_height),
        height,
    );
    estate.record_tree(height, median, coverage);
    store.update_estate(&estate).await?;

    Ok(plot)
}

/// Re-anchor the nearest occupied plot ahead on `placed` and move every plot
/// beyond it by the same amount.
async fn propagate_forward<S>(store: &mut S, placed: &Plot) -> Result<Option<Shift>, StoreError>
where
    S: PlotStore + ?Sized,
{
    let Some(mut ahead) = store
        .find_nearest_ahead(placed.estate_id, placed.order_number)
        .await?
    else {
        return Ok(None);
    };

    let shift = forward_shift(placed, &ahead);
    ahead.distance = shift.ahead_distance;
    store.update_plot(&ahead).await?;
    store
        .shift_distances_after(placed.estate_id, ahead.order_number, shift.delta)
        .await?;
    Ok(Some(shift))
}

pub async fn estate_stats<S>(store: &mut S, estate_id: Uuid) -> Result<EstateStats, EngineError>
where
    S: PlotStore + ?Sized,
{
    let estate = store
        .find_estate(estate_id)
        .await?
        .ok_or(EngineError::EstateNotFound(estate_id))?;
    Ok(estate.stats())
}

/// Total coverage distance and, given a battery budget, where the drone lands.
pub async fn drone_plan<S>(
    store: &mut S,
    estate_id: Uuid,
    max_distance: Option<i64>,
) -> Result<DronePlan, EngineError>
where
    S: PlotStore + ?Sized,
{
    let estate = store
        .find_estate(estate_id)
        .await?
        .ok_or(EngineError::EstateNotFound(estate_id))?;

    let Some(max_distance) = max_distance else {
        return Ok(DronePlan {
            distance: estate.total_distance,
            rest: None,
        });
    };

    let budget = max_distance.saturating_sub(LANDING_RESERVE);
    let start = store.find_plot_by_max_distance(estate_id, budget).await?;
    let rest = rest_point(start.as_ref(), budget, estate.length);
    debug!(
        "Drone plan for estate {} with budget {} rests at ({}, {})",
        estate_id, budget, rest.x, rest.y
    );

    Ok(DronePlan {
        distance: estate.total_distance,
        rest: Some(rest),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::distance_after;
    use crate::memory::MemoryStore;
    use crate::models::RestPoint;
    use crate::stats::median_height;
    use crate::store::StoreResult;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    async fn estate(store: &mut MemoryStore, width: i64, length: i64) -> Estate {
        create_estate(store, CreateEstateRequest { width, length })
            .await
            .unwrap()
    }

    async fn plant(store: &mut MemoryStore, estate_id: Uuid, x: i64, y: i64, height: i64) -> Plot {
        place_tree(store, estate_id, PlantTreeRequest { x, y, height })
            .await
            .unwrap()
    }

    /// Recompute every distance from scratch in scan order.
    fn expected_distances(plots: &[Plot]) -> Vec<i64> {
        let mut expected = Vec::with_capacity(plots.len());
        let mut previous: Option<Plot> = None;
        for plot in plots {
            let distance = match &previous {
                Some(anchor) => distance_after(anchor, plot.order_number, plot.tree_height),
                None => assign_distance(None, plot.order_number, plot.tree_height),
            };
            expected.push(distance);
            previous = Some(Plot { distance, ..plot.clone() });
        }
        expected
    }

    #[tokio::test]
    async fn first_tree_on_odd_row() {
        let mut store = MemoryStore::new();
        let estate = estate(&mut store, 10, 5).await;

        let plot = plant(&mut store, estate.id, 1, 1, 10).await;
        assert_eq!(plot.order_number, 1);
        assert_eq!(plot.distance, 21);
    }

    #[tokio::test]
    async fn first_tree_on_even_row() {
        let mut store = MemoryStore::new();
        let estate = estate(&mut store, 10, 5).await;

        let plot = plant(&mut store, estate.id, 1, 2, 10).await;
        assert_eq!(plot.order_number, 10);
        assert_eq!(plot.distance, 90 + 11 + 10);
    }

    #[tokio::test]
    async fn adjacent_behind_neighbour() {
        let mut store = MemoryStore::new();
        let estate = estate(&mut store, 10, 5).await;
        let behind = Plot {
            id: Uuid::new_v4(),
            estate_id: estate.id,
            x: 4,
            y: 1,
            order_number: 4,
            distance: 140,
            tree_height: 12,
            created_at: Utc::now(),
        };
        store.insert_plot(&behind).await.unwrap();

        let plot = plant(&mut store, estate.id, 5, 1, 10).await;
        assert_eq!(plot.distance, 152);
    }

    #[tokio::test]
    async fn insertion_shifts_the_tail() {
        let mut store = MemoryStore::new();
        let estate = estate(&mut store, 2, 5).await;
        plant(&mut store, estate.id, 1, 1, 5).await;
        let ahead = plant(&mut store, estate.id, 4, 1, 8).await;
        let tail = plant(&mut store, estate.id, 5, 2, 3).await;
        let tail_far = plant(&mut store, estate.id, 1, 2, 20).await;

        let placed = plant(&mut store, estate.id, 2, 1, 9).await;
        let plots = store.plots(estate.id);

        let new_ahead = plots.iter().find(|p| p.order_number == ahead.order_number).unwrap();
        let expected_ahead = distance_after(&placed, ahead.order_number, ahead.tree_height);
        assert_eq!(new_ahead.distance, expected_ahead);
        let delta = expected_ahead - ahead.distance;
        assert_ne!(delta, 0);

        for before in [&tail, &tail_far] {
            let after = plots.iter().find(|p| p.id == before.id).unwrap();
            assert_eq!(after.distance, before.distance + delta);
        }
        let first = plots.iter().find(|p| p.order_number == 1).unwrap();
        assert_eq!(first.distance, 16);
    }

    #[tokio::test]
    async fn random_insertions_keep_distances_consistent() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut store = MemoryStore::new();
        let estate = estate(&mut store, 6, 7).await;

        let mut cells: Vec<(i64, i64)> = (1..=6)
            .flat_map(|y| (1..=7).map(move |x| (x, y)))
            .collect();
        cells.shuffle(&mut rng);

        let mut heights = Vec::new();
        for &(x, y) in cells.iter().take(25) {
            let height = rng.random_range(1..=30);
            heights.push(height);
            plant(&mut store, estate.id, x, y, height).await;

            let plots = store.plots(estate.id);
            let actual: Vec<i64> = plots.iter().map(|p| p.distance).collect();
            assert_eq!(actual, expected_distances(&plots));
            assert!(actual.windows(2).all(|w| w[0] <= w[1]), "distances must not decrease");
        }

        let stats = estate_stats(&mut store, estate.id).await.unwrap();
        assert_eq!(stats.count, 25);
        assert_eq!(stats.max, *heights.iter().max().unwrap());
        assert_eq!(stats.min, *heights.iter().min().unwrap());
        assert_eq!(stats.median, median_height(&heights));
    }

    #[tokio::test]
    async fn coverage_total_uses_scan_neighbours() {
        let mut store = MemoryStore::new();
        let estate = estate(&mut store, 2, 3).await;
        plant(&mut store, estate.id, 1, 1, 10).await;
        plant(&mut store, estate.id, 3, 1, 4).await;
        // order 2 sits between heights 10 and 4
        plant(&mut store, estate.id, 2, 1, 6).await;

        let plan = drone_plan(&mut store, estate.id, None).await.unwrap();
        assert_eq!(plan.distance, 60 + 20 + 8 + (4 + 2));
    }

    #[tokio::test]
    async fn rejects_occupied_and_out_of_range() {
        let mut store = MemoryStore::new();
        let estate = estate(&mut store, 10, 5).await;
        plant(&mut store, estate.id, 1, 1, 10).await;

        let occupied = place_tree(&mut store, estate.id, PlantTreeRequest { x: 1, y: 1, height: 3 }).await;
        assert!(matches!(
            occupied,
            Err(EngineError::Validation(ValidationError::Occupied { x: 1, y: 1 }))
        ));

        let outside = place_tree(&mut store, estate.id, PlantTreeRequest { x: 6, y: 11, height: 3 }).await;
        assert!(matches!(
            outside,
            Err(EngineError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert_eq!(store.plots(estate.id).len(), 1);
    }

    #[tokio::test]
    async fn missing_estate_is_not_found() {
        let mut store = MemoryStore::new();
        let id = Uuid::new_v4();

        let planted = place_tree(&mut store, id, PlantTreeRequest { x: 1, y: 1, height: 3 }).await;
        assert!(matches!(planted, Err(EngineError::EstateNotFound(missing)) if missing == id));
        assert!(matches!(estate_stats(&mut store, id).await, Err(EngineError::EstateNotFound(_))));
        assert!(matches!(drone_plan(&mut store, id, Some(10)).await, Err(EngineError::EstateNotFound(_))));
    }

    #[tokio::test]
    async fn drone_plan_from_origin_without_trees() {
        let mut store = MemoryStore::new();
        let estate = estate(&mut store, 10, 5).await;

        let plan = drone_plan(&mut store, estate.id, Some(21)).await.unwrap();
        assert_eq!(plan.distance, 500);
        assert_eq!(plan.rest, Some(RestPoint { x: 3, y: 1 }));
    }

    #[tokio::test]
    async fn drone_plan_starts_from_furthest_reachable_plot() {
        let mut store = MemoryStore::new();
        let estate = estate(&mut store, 10, 5).await;
        plant(&mut store, estate.id, 1, 1, 10).await; // distance 21
        plant(&mut store, estate.id, 3, 1, 10).await; // distance 21 + 11 + 10 + 11 + 10 = 63

        let plan = drone_plan(&mut store, estate.id, Some(50)).await.unwrap();
        // budget 49, start (1,1) at 21, 2 more plots
        assert_eq!(plan.rest, Some(RestPoint { x: 3, y: 1 }));

        let plan = drone_plan(&mut store, estate.id, Some(104)).await.unwrap();
        // budget 103, start (3,1) at 63, 4 more plots wraps into row 2
        assert_eq!(plan.rest, Some(RestPoint { x: 2, y: 2 }));
    }

    #[tokio::test]
    async fn drone_plan_handles_extreme_budgets() {
        let mut store = MemoryStore::new();
        let estate = estate(&mut store, 3, 1).await;
        plant(&mut store, estate.id, 1, 2, 5).await;

        let plan = drone_plan(&mut store, estate.id, Some(-100)).await.unwrap();
        assert_eq!(plan.rest, Some(RestPoint { x: 1, y: 1 }));

        let plan = drone_plan(&mut store, estate.id, Some(i64::MIN)).await.unwrap();
        assert_eq!(plan.rest, Some(RestPoint { x: 1, y: 1 }));

        let plan = drone_plan(&mut store, estate.id, Some(i64::MAX)).await.unwrap();
        let rest = plan.rest.unwrap();
        assert_eq!(rest.x, 1);
        assert!(rest.y > 1_000_000_000);
    }

    #[tokio::test]
    async fn reads_are_idempotent() {
        let mut store = MemoryStore::new();
        let estate = estate(&mut store, 4, 4).await;
        plant(&mut store, estate.id, 2, 3, 7).await;

        let first = (
            estate_stats(&mut store, estate.id).await.unwrap(),
            drone_plan(&mut store, estate.id, Some(120)).await.unwrap(),
        );
        let second = (
            estate_stats(&mut store, estate.id).await.unwrap(),
            drone_plan(&mut store, estate.id, Some(120)).await.unwrap(),
        );
        assert_eq!(first, second);
    }

    /// Delegates to a [`MemoryStore`] but fails the median query.
    struct BrokenMedian(MemoryStore);

    #[async_trait]
    impl PlotStore for BrokenMedian {
        async fn insert_estate(&mut self, estate: &Estate) -> StoreResult<()> {
            self.0.insert_estate(estate).await
        }
        async fn find_estate(&mut self, estate_id: Uuid) -> StoreResult<Option<Estate>> {
            self.0.find_estate(estate_id).await
        }
        async fn update_estate(&mut self, estate: &Estate) -> StoreResult<()> {
            self.0.update_estate(estate).await
        }
        async fn find_plot(&mut self, estate_id: Uuid, x: i64, y: i64) -> StoreResult<Option<Plot>> {
            self.0.find_plot(estate_id, x, y).await
        }
        async fn insert_plot(&mut self, plot: &Plot) -> StoreResult<Uuid> {
            self.0.insert_plot(plot).await
        }
        async fn update_plot(&mut self, plot: &Plot) -> StoreResult<()> {
            self.0.update_plot(plot).await
        }
        async fn find_nearest_behind(&mut self, estate_id: Uuid, order: i64) -> StoreResult<Option<Plot>> {
            self.0.find_nearest_behind(estate_id, order).await
        }
        async fn find_nearest_ahead(&mut self, estate_id: Uuid, order: i64) -> StoreResult<Option<Plot>> {
            self.0.find_nearest_ahead(estate_id, order).await
        }
        async fn shift_distances_after(&mut self, estate_id: Uuid, order: i64, delta: i64) -> StoreResult<()> {
            self.0.shift_distances_after(estate_id, order, delta).await
        }
        async fn median_tree_height(&mut self, _estate_id: Uuid) -> StoreResult<i64> {
            Err(StoreError::backend("median window query failed"))
        }
        async fn find_plot_by_max_distance(&mut self, estate_id: Uuid, ceiling: i64) -> StoreResult<Option<Plot>> {
            self.0.find_plot_by_max_distance(estate_id, ceiling).await
        }
        async fn find_plot_by_order(&mut self, estate_id: Uuid, order: i64) -> StoreResult<Option<Plot>> {
            self.0.find_plot_by_order(estate_id, order).await
        }
    }

    #[tokio::test]
    async fn store_failures_propagate_unchanged() {
        let mut store = BrokenMedian(MemoryStore::new());
        let estate = create_estate(&mut store, CreateEstateRequest { width: 3, length: 3 })
            .await
            .unwrap();

        let err = place_tree(&mut store, estate.id, PlantTreeRequest { x: 1, y: 1, height: 4 })
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Store(StoreError::Backend(_))));
        assert_eq!(err.to_string(), "storage error: median window query failed");
    }
}
