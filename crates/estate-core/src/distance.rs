//! Flight distance arithmetic.
//!
//! A plot's `distance` is the cumulative flight length from the scan origin
//! to just past that plot, including the climb over its tree. Between two
//! adjacent trees the drone stays airborne and only covers the height delta;
//! across a gap it lands after the first tree, crosses the empty plots at
//! ground level and climbs again.

use crate::grid::PLOT_WIDTH;
use crate::models::Plot;

/// Vertical margin needed to pass over a tree.
pub fn clearance(height: i64) -> i64 {
    height + 1
}

/// Distance of a plot with no occupied plot behind it.
pub fn distance_from_origin(order_number: i64, height: i64) -> i64 {
    (order_number - 1) * PLOT_WIDTH + clearance(height) + PLOT_WIDTH
}

/// Distance of a tree at `order_number`, measured from an occupied `anchor`
/// earlier in the scan with no occupied plots in between.
pub fn distance_after(anchor: &Plot, order_number: i64, height: i64) -> i64 {
    let gap = order_number - anchor.order_number;
    debug_assert!(gap >= 1, "anchor must precede the target plot");
    if gap == 1 {
        return anchor.distance + (anchor.tree_height - height).abs() + PLOT_WIDTH;
    }
    let over_anchor = anchor.distance + clearance(anchor.tree_height);
    let remaining = (gap - 1) * PLOT_WIDTH;
    over_anchor + remaining + clearance(height) + PLOT_WIDTH
}

/// Distance for a new tree given its nearest occupied plot behind.
pub fn assign_distance(behind: Option<&Plot>, order_number: i64, height: i64) -> i64 {
    match behind {
        Some(behind) => distance_after(behind, order_number, height),
        None => distance_from_origin(order_number, height),
    }
}

/// Correction applied to the plots ahead of a newly placed tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    /// Recomputed distance of the nearest occupied plot ahead
    pub ahead_distance: i64,
    /// Amount added to every plot beyond that neighbour; may be negative
    pub delta: i64,
}

/// Recompute the ahead-neighbour's distance from the newly placed plot.
pub fn forward_shift(placed: &Plot, ahead: &Plot) -> Shift {
    let ahead_distance = distance_after(placed, ahead.order_number, ahead.tree_height);
    Shift {
        ahead_distance,
        delta: ahead_distance - ahead.distance,
    }
}

/// Contribution of a new tree to the estate's coverage total.
///
/// Each side counts the height difference to the tree in the adjacent scan
/// slot, or the tree's own height when that slot is empty.
pub fn coverage_increment(prev_height: Option<i64>, next_height: Option<i64>, height: i64) -> i64 {
    let side = |neighbour: Option<i64>| match neighbour {
        Some(other) => (other - height).abs(),
        None => height,
    };
    side(prev_height) + side(next_height)
}
