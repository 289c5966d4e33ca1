//! Quality filtering of normalized listings.
//!
//! Two layers: hard geographic bounds reject listings that geocoded outside
//! Morocco entirely, then a joint single-pass percentile trim absorbs
//! data-entry outliers (typo'd prices, geocoding glitches) without
//! hand-tuned thresholds.

use tracing::info;

use crate::normalize::Listing;
use crate::stats::percentile;

/// Latitude range covering Morocco, in WGS84 degrees.
pub const LAT_BOUNDS: (f64, f64) = (21.0, 36.0);
/// Longitude range covering Morocco, in WGS84 degrees.
pub const LON_BOUNDS: (f64, f64) = (-17.0, -1.0);

/// Fraction trimmed off each tail of the percentile-filtered variables;
/// 1% keeps the central 98%.
const TRIM_FRACTION: f64 = 0.01;

/// Caller-tunable range filters for room count and surface area.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParams {
    pub min_rooms: u32,
    pub max_rooms: u32,
    pub min_size: f64,
    pub max_size: f64,
}

impl Default for FilterParams {
    fn default() -> Self {
        FilterParams {
            min_rooms: 1,
            max_rooms: 8,
            min_size: 20.0,
            max_size: 500.0,
        }
    }
}

/// Inclusive `[p1, p99]` band for one trimmed variable.
#[derive(Debug, Clone, Copy)]
struct TrimBand {
    low: f64,
    high: f64,
}

impl TrimBand {
    fn over(values: &[f64]) -> Option<TrimBand> {
        Some(TrimBand {
            low: percentile(values, TRIM_FRACTION)?,
            high: percentile(values, 1.0 - TRIM_FRACTION)?,
        })
    }

    fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// Applies the full quality filter: hard geographic bounds, the caller's
/// rooms/size ranges, and the 1%/99% percentile trim on price-per-sqm,
/// latitude, and longitude.
///
/// Percentile thresholds are computed once over the set passing the
/// geographic bounds and then AND-combined with every other condition in a
/// single pass; records are never re-trimmed iteratively. Records without a
/// room count fail the rooms range. An empty input yields an empty output.
pub fn apply_filters(listings: Vec<Listing>, params: &FilterParams) -> Vec<Listing> {
    let total = listings.len();

    let in_bounds: Vec<Listing> = listings.into_iter().filter(in_morocco).collect();

    let pps: Vec<f64> = in_bounds.iter().map(|l| l.price_per_sqm).collect();
    let lats: Vec<f64> = in_bounds.iter().map(|l| l.latitude).collect();
    let lons: Vec<f64> = in_bounds.iter().map(|l| l.longitude).collect();

    let bands = (
        TrimBand::over(&pps),
        TrimBand::over(&lats),
        TrimBand::over(&lons),
    );
    let (Some(pps_band), Some(lat_band), Some(lon_band)) = bands else {
        info!(total, kept = 0, "Quality filter left no listings");
        return Vec::new();
    };

    let kept: Vec<Listing> = in_bounds
        .into_iter()
        .filter(|l| {
            l.rooms
                .is_some_and(|r| r >= params.min_rooms && r <= params.max_rooms)
                && l.size_sqm >= params.min_size
                && l.size_sqm <= params.max_size
                && pps_band.contains(l.price_per_sqm)
                && lat_band.contains(l.latitude)
                && lon_band.contains(l.longitude)
        })
        .collect();

    info!(total, kept = kept.len(), "Quality filter applied");
    kept
}

fn in_morocco(listing: &Listing) -> bool {
    listing.latitude >= LAT_BOUNDS.0
        && listing.latitude <= LAT_BOUNDS.1
        && listing.longitude >= LON_BOUNDS.0
        && listing.longitude <= LON_BOUNDS.1
}
