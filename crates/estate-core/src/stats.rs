//! Estate-level tree aggregates.

use crate::models::Estate;

/// Median tree height: middle value for an odd count, truncated mean of the
/// two middle values for an even count, zero when there are no trees.
pub fn median_height(heights: &[i64]) -> i64 {
    if heights.is_empty() {
        return 0;
    }
    let mut sorted = heights.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2
    }
}

impl Estate {
    /// Fold a newly planted tree into the aggregates.
    ///
    /// `median` must already include the new tree; `coverage` is the
    /// increment from [`crate::distance::coverage_increment`].
    pub fn record_tree(&mut self, height: i64, median: i64, coverage: i64) {
        if self.tree_min_height <= 0 {
            self.tree_min_height = height;
        }
        self.tree_count += 1;
        self.tree_max_height = self.tree_max_height.max(height);
        self.tree_min_height = self.tree_min_height.min(height);
        self.tree_median_height = median;
        self.total_distance += coverage;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_empty_set_is_zero() {
        assert_eq!(median_height(&[]), 0);
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median_height(&[30, 10, 20]), 20);
        assert_eq!(median_height(&[4, 1, 3, 2]), 2);
        assert_eq!(median_height(&[10, 15]), 12);
    }

    #[test]
    fn first_tree_sets_min_height() {
        let mut estate = Estate::new(2, 2);
        estate.record_tree(12, 12, 24);
        assert_eq!(estate.stats().min, 12);
        assert_eq!(estate.stats().max, 12);
        assert_eq!(estate.tree_count, 1);
        assert_eq!(estate.total_distance, 40 + 24);

        estate.record_tree(5, 8, 7);
        assert_eq!(estate.stats().min, 5);
        assert_eq!(estate.stats().max, 12);
        assert_eq!(estate.stats().median, 8);
        assert_eq!(estate.tree_count, 2);
    }
}
