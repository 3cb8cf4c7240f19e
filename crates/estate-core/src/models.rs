//! Core data models for estates and planted plots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::grid::PLOT_WIDTH;

/// Largest accepted estate width or length, in plots.
pub const MAX_DIMENSION: i64 = 50_000;
/// Shortest tree that can be planted.
pub const MIN_TREE_HEIGHT: i64 = 1;
/// Tallest tree that can be planted.
pub const MAX_TREE_HEIGHT: i64 = 30;

/// A rectangular estate of `width` rows by `length` columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estate {
    pub id: Uuid,
    /// Number of rows (`y` axis)
    pub width: i64,
    /// Number of columns (`x` axis)
    pub length: i64,
    pub tree_count: i64,
    pub tree_max_height: i64,
    /// Zero until the first tree is planted
    pub tree_min_height: i64,
    pub tree_median_height: i64,
    /// Coarse coverage metric; see [`crate::distance::coverage_increment`]
    pub total_distance: i64,
    pub created_at: DateTime<Utc>,
}

impl Estate {
    /// Create an empty estate.
    ///
    /// With no trees the drone flies every plot at ground level, so the
    /// coverage total starts at one plot width per cell.
    pub fn new(width: i64, length: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            width,
            length,
            tree_count: 0,
            tree_max_height: 0,
            tree_min_height: 0,
            tree_median_height: 0,
            total_distance: width * length * PLOT_WIDTH,
            created_at: Utc::now(),
        }
    }

    /// Whether `(x, y)` lies on the estate grid.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        (1..=self.length).contains(&x) && (1..=self.width).contains(&y)
    }

    pub fn stats(&self) -> EstateStats {
        EstateStats {
            count: self.tree_count,
            max: self.tree_max_height,
            min: self.tree_min_height,
            median: self.tree_median_height,
        }
    }
}

/// A single occupied plot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plot {
    pub id: Uuid,
    pub estate_id: Uuid,
    pub x: i64,
    pub y: i64,
    /// Position in the estate's serpentine scan
    pub order_number: i64,
    /// Cumulative flight distance up to and including this plot
    pub distance: i64,
    pub tree_height: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CreateEstateRequest {
    pub width: i64,
    pub length: i64,
}

impl CreateEstateRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let range = 1..=MAX_DIMENSION;
        if !range.contains(&self.width) || !range.contains(&self.length) {
            return Err(ValidationError::InvalidDimensions {
                width: self.width,
                length: self.length,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlantTreeRequest {
    pub x: i64,
    pub y: i64,
    pub height: i64,
}

impl PlantTreeRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_TREE_HEIGHT..=MAX_TREE_HEIGHT).contains(&self.height) {
            return Err(ValidationError::InvalidHeight(self.height));
        }
        Ok(())
    }
}

/// Tree statistics for one estate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstateStats {
    pub count: i64,
    pub max: i64,
    pub min: i64,
    pub median: i64,
}

/// Where a battery-limited drone comes to rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestPoint {
    pub x: i64,
    pub y: i64,
}

/// Answer to a drone plan query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DronePlan {
    pub distance: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest: Option<RestPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_estate_covers_every_plot_at_ground_level() {
        let estate = Estate::new(10, 5);
        assert_eq!(estate.total_distance, 500);
        assert_eq!(estate.tree_count, 0);
        assert_eq!(estate.tree_min_height, 0);
    }

    #[test]
    fn contains_is_one_based_and_inclusive() {
        let estate = Estate::new(10, 5);
        assert!(estate.contains(1, 1));
        assert!(estate.contains(5, 10));
        assert!(!estate.contains(0, 1));
        assert!(!estate.contains(6, 1));
        assert!(!estate.contains(1, 11));
    }

    #[test]
    fn request_validation_bounds() {
        assert!(CreateEstateRequest { width: 1, length: 50_000 }.validate().is_ok());
        assert!(CreateEstateRequest { width: 0, length: 10 }.validate().is_err());
        assert!(CreateEstateRequest { width: 1, length: 100_000 }.validate().is_err());
        assert!(PlantTreeRequest { x: 1, y: 1, height: 30 }.validate().is_ok());
        assert!(PlantTreeRequest { x: 1, y: 1, height: -5 }.validate().is_err());
        assert!(PlantTreeRequest { x: 1, y: 1, height: 31 }.validate().is_err());
    }

    #[test]
    fn drone_plan_omits_missing_rest() {
        let plan = DronePlan { distance: 200, rest: None };
        let json = serde_json::to_value(plan).unwrap();
        assert_eq!(json, serde_json::json!({ "distance": 200 }));
    }
}
