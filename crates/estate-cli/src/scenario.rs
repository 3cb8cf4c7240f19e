//! Seeded random planting scenarios.

use std::collections::HashSet;

use estate_core::models::{MAX_TREE_HEIGHT, MIN_TREE_HEIGHT};
use estate_core::PlantTreeRequest;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// An estate layout together with the trees to plant on it.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub width: i64,
    pub length: i64,
    pub trees: Vec<PlantTreeRequest>,
}

impl Scenario {
    pub fn random(width: i64, length: i64, count: usize, max_height: i64, seed: u64) -> Self {
        Self {
            width,
            length,
            trees: random_planting(width, length, count, max_height, seed),
        }
    }
}

/// Up to `count` plantings on distinct plots of a `width` x `length` estate.
///
/// Heights fall in `1..=max_height`, clamped to the valid tree range. The same
/// seed always produces the same plantings.
pub fn random_planting(
    width: i64,
    length: i64,
    count: usize,
    max_height: i64,
    seed: u64,
) -> Vec<PlantTreeRequest> {
    if width < 1 || length < 1 {
        return Vec::new();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let max_height = max_height.clamp(MIN_TREE_HEIGHT, MAX_TREE_HEIGHT);
    let area = (width as u64).saturating_mul(length as u64);
    let count = (count as u64).min(area) as usize;

    // Dense requests shuffle the whole grid, sparse ones sample cells.
    let cells: Vec<(i64, i64)> = if (count as u64).saturating_mul(2) >= area {
        let mut all: Vec<(i64, i64)> = (1..=width)
            .flat_map(|y| (1..=length).map(move |x| (x, y)))
            .collect();
        all.shuffle(&mut rng);
        all.truncate(count);
        all
    } else {
        let mut seen = HashSet::with_capacity(count);
        let mut picked = Vec::with_capacity(count);
        while picked.len() < count {
            let cell = (rng.random_range(1..=length), rng.random_range(1..=width));
            if seen.insert(cell) {
                picked.push(cell);
            }
        }
        picked
    };

    cells
        .into_iter()
        .map(|(x, y)| PlantTreeRequest {
            x,
            y,
            height: rng.random_range(MIN_TREE_HEIGHT..=max_height),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(trees: &[PlantTreeRequest]) -> Vec<(i64, i64)> {
        trees.iter().map(|t| (t.x, t.y)).collect()
    }

    #[test]
    fn plantings_are_distinct_and_in_range() {
        for (width, length, count) in [(3, 4, 12), (100, 200, 50), (1, 1, 5)] {
            let trees = random_planting(width, length, count, 30, 42);
            assert_eq!(trees.len() as i64, (count as i64).min(width * length));

            let unique: HashSet<_> = cells(&trees).into_iter().collect();
            assert_eq!(unique.len(), trees.len());
            for tree in &trees {
                assert!((1..=length).contains(&tree.x));
                assert!((1..=width).contains(&tree.y));
                assert!((1..=30).contains(&tree.height));
                assert!(tree.validate().is_ok());
            }
        }
    }

    #[test]
    fn same_seed_same_plantings() {
        let a = random_planting(20, 20, 30, 10, 7);
        let b = random_planting(20, 20, 30, 10, 7);
        let c = random_planting(20, 20, 30, 10, 8);
        assert_eq!(cells(&a), cells(&b));
        assert_ne!(cells(&a), cells(&c));
    }

    #[test]
    fn heights_are_clamped() {
        let trees = random_planting(5, 5, 25, 99, 1);
        assert!(trees.iter().all(|t| t.height <= MAX_TREE_HEIGHT));
        let trees = random_planting(5, 5, 25, 0, 1);
        assert!(trees.iter().all(|t| t.height == MIN_TREE_HEIGHT));
    }

    #[test]
    fn empty_grid_plants_nothing() {
        assert!(random_planting(0, 5, 3, 10, 1).is_empty());
        assert!(Scenario::random(4, 4, 0, 10, 1).trees.is_empty());
    }
}
