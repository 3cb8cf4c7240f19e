//! Battery-limited drone flight extrapolation.

use crate::grid::PLOT_WIDTH;
use crate::models::{Plot, RestPoint};

/// Units kept in reserve for the final landing.
pub const LANDING_RESERVE: i64 = 1;

/// Where a drone with `budget` units left comes to rest, starting from the
/// furthest plot it reached (or the grid origin when it reached none).
///
/// Leftover battery is spent crossing whole plots along `x`, wrapping into the
/// following rows. The walk always advances `x` left-to-right, even on rows the
/// scan sweeps right-to-left, and `y` is not clamped to the estate width.
/// A budget below the start distance leaves the drone on the start plot.
pub fn rest_point(start: Option<&Plot>, budget: i64, length: i64) -> RestPoint {
    let (plot_distance, mut x, mut y) = match start {
        Some(plot) => (plot.distance, plot.x, plot.y),
        None => (0, 1, 1),
    };

    let mut remaining_plots = (budget.saturating_sub(plot_distance) / PLOT_WIDTH).max(0);
    if remaining_plots <= length - x {
        x += remaining_plots;
    } else {
        // the first wrap lands on row y + 1, every further full row adds one
        remaining_plots -= length - x;
        let rows = (remaining_plots - 1) / length;
        y = y.saturating_add(1).saturating_add(rows);
        x = remaining_plots - rows * length;
    }

    RestPoint { x, y }
}
