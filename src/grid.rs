//! Adaptive grid aggregation over the planar point set.
//!
//! Resolution scales with the square root of the sample count so cell
//! population stays roughly constant whether the extract covers a dense city
//! center or a small town. Points are bucketed by integer cell index in one
//! pass, then each occupied cell gets the mean statistic of its points.

use std::collections::HashMap;

use geo::{Coord, Rect};
use tracing::debug;

/// A surviving listing after projection: planar position plus the statistic
/// being aggregated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarPoint {
    pub position: Coord<f64>,
    pub price_per_sqm: f64,
}

/// One occupied grid cell: planar bounds, the mean statistic, and how many
/// points produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub bounds: Rect<f64>,
    pub mean_price_per_sqm: f64,
    pub point_count: usize,
}

/// Number of grid divisions per axis for `n` surviving points.
pub fn grid_divisions(n: usize) -> usize {
    2 * (n as f64).sqrt().floor() as usize
}

/// Buckets the point set into an adaptive grid over its bounding box and
/// returns the occupied cells in row-major order (bottom row first).
///
/// Cells are half-open `[left, right) × [bottom, top)`; points on the top or
/// right edge of the bounding box are clamped into the last cell, so every
/// point lands in exactly one cell. Cells without points are not emitted.
pub fn aggregate(points: &[PlanarPoint]) -> Vec<GridCell> {
    if points.is_empty() {
        return Vec::new();
    }

    let xs = points.iter().map(|p| p.position.x);
    let ys = points.iter().map(|p| p.position.y);
    let x_min = xs.clone().fold(f64::INFINITY, f64::min);
    let x_max = xs.fold(f64::NEG_INFINITY, f64::max);
    let y_min = ys.clone().fold(f64::INFINITY, f64::min);
    let y_max = ys.fold(f64::NEG_INFINITY, f64::max);

    let divisions = grid_divisions(points.len()).max(1);
    let x_step = (x_max - x_min) / divisions as f64;
    let y_step = (y_max - y_min) / divisions as f64;

    // (sum, count) per occupied (ix, iy) index; O(N) over the point set.
    let mut buckets: HashMap<(usize, usize), (f64, usize)> = HashMap::new();
    for point in points {
        let ix = cell_index(point.position.x, x_min, x_step, divisions);
        let iy = cell_index(point.position.y, y_min, y_step, divisions);
        let bucket = buckets.entry((ix, iy)).or_insert((0.0, 0));
        bucket.0 += point.price_per_sqm;
        bucket.1 += 1;
    }

    let mut indices: Vec<(usize, usize)> = buckets.keys().copied().collect();
    indices.sort_by_key(|&(ix, iy)| (iy, ix));

    let cells: Vec<GridCell> = indices
        .into_iter()
        .map(|(ix, iy)| {
            let (sum, count) = buckets[&(ix, iy)];
            let left = x_min + ix as f64 * x_step;
            let bottom = y_min + iy as f64 * y_step;
            GridCell {
                bounds: Rect::new(
                    Coord { x: left, y: bottom },
                    Coord {
                        x: left + x_step,
                        y: bottom + y_step,
                    },
                ),
                mean_price_per_sqm: sum / count as f64,
                point_count: count,
            }
        })
        .collect();

    debug!(
        points = points.len(),
        divisions,
        occupied_cells = cells.len(),
        "Grid aggregated"
    );
    cells
}

/// Maps a coordinate to its cell index along one axis. A zero step (all
/// points share that coordinate) collapses the axis into index 0.
fn cell_index(value: f64, min: f64, step: f64, divisions: usize) -> usize {
    if step <= 0.0 {
        return 0;
    }
    (((value - min) / step).floor() as usize).min(divisions - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_points_no_cells() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn test_single_point_single_cell() {
        let cells = aggregate(&[point(10.0, 20.0, 7500.0)]);

        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].mean_price_per_sqm, 7500.0);
        assert_eq!(cells[0].point_count, 1);
    }

    #[test]
    fn test_grid_divisions_scaling() {
        assert_eq!(grid_divisions(0), 0);
        assert_eq!(grid_divisions(1), 2);
        assert_eq!(grid_divisions(100), 20);
        // floor, not round
        assert_eq!(grid_divisions(99), 18);
    }

    #[test]
    fn test_separated_points_get_their_own_cells() {
        let points = [
            point(0.0, 0.0, 1000.0),
            point(100.0, 0.0, 2000.0),
            point(0.0, 100.0, 3000.0),
        ];
        let cells = aggregate(&points);

        assert_eq!(cells.len(), 3);
        for cell in &cells {
            assert_eq!(cell.point_count, 1);
        }
        // row-major: bottom row left-to-right, then upper rows
        assert_eq!(cells[0].mean_price_per_sqm, 1000.0);
        assert_eq!(cells[1].mean_price_per_sqm, 2000.0);
        assert_eq!(cells[2].mean_price_per_sqm, 3000.0);
    }

    #[test]
    fn test_colocated_points_average() {
        let points = [point(5.0, 5.0, 1000.0), point(5.0, 5.0, 3000.0)];
        let cells = aggregate(&points);

        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].mean_price_per_sqm, 2000.0);
        assert_eq!(cells[0].point_count, 2);
    }

    #[test]
    fn test_every_point_counted_exactly_once() {
        // Includes points sitting exactly on the bounding box edges.
        let points: Vec<PlanarPoint> = (0..50)
            .map(|i| point(i as f64 * 3.7, (i % 7) as f64 * 11.0, 1000.0 + i as f64))
            .collect();

        let cells = aggregate(&points);
        let counted: usize = cells.iter().map(|c| c.point_count).sum();
        assert_eq!(counted, points.len());
        assert!(cells.iter().all(|c| c.point_count >= 1));
    }

    #[test]
    fn test_deterministic_ordering() {
        let points: Vec<PlanarPoint> = (0..40)
            .map(|i| point((i * 13 % 29) as f64, (i * 7 % 31) as f64, 5000.0 + i as f64))
            .collect();

        let a = aggregate(&points);
        let b = aggregate(&points);
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_extent_axis_does_not_divide_by_zero() {
        // All points on one vertical line: x extent is zero.
        let points = [point(5.0, 0.0, 1000.0), point(5.0, 50.0, 2000.0)];
        let cells = aggregate(&points);

        let counted: usize = cells.iter().map(|c| c.point_count).sum();
        assert_eq!(counted, 2);
    }

    fn point(x: f64, y: f64, price_per_sqm: f64) -> PlanarPoint {
        PlanarPoint {
            position: Coord { x, y },
            price_per_sqm,
        }
    }
}
