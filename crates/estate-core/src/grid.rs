//! Serpentine scan indexing.
//!
//! Odd rows are swept left-to-right and even rows right-to-left, so the
//! drone never repositions between rows. Order numbers run `1..=width*length`.

/// Lateral width of one plot, in distance units.
pub const PLOT_WIDTH: i64 = 10;

/// Scan position of `(x, y)` on an estate `length` columns wide.
///
/// Callers must have checked that the coordinate lies on the grid.
pub fn order_number(x: i64, y: i64, length: i64) -> i64 {
    let row_start = (y - 1) * length;
    if y % 2 == 1 {
        row_start + x
    } else {
        row_start + (length - x + 1)
    }
}

/// Inverse of [`order_number`].
pub fn coordinates(order_number: i64, length: i64) -> (i64, i64) {
    let index = order_number - 1;
    let y = index / length + 1;
    let offset = index % length;
    let x = if y % 2 == 1 { offset + 1 } else { length - offset };
    (x, y)
}
