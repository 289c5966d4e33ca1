//! The heatmap pipeline: records in, grid GeoJSON out.
//!
//! Pure batch computation with no ambient state; every invocation recomputes
//! the full grid from the full record set.

use anyhow::Result;
use tracing::info;

use crate::filter::{FilterParams, apply_filters};
use crate::grid::{PlanarPoint, aggregate};
use crate::loader::{RawListing, load_all};
use crate::normalize::normalize_all;
use crate::output::{HeatmapResult, emit};
use crate::projection::to_mercator;
use crate::stats::mean;

/// Runs the full pipeline on an already-loaded record set: normalize,
/// filter, project, bucket, and emit.
///
/// The overall average is the mean over the whole filtered set, not a mean
/// of cell means, so grid coarsening never changes it.
#[tracing::instrument(skip(records, params), fields(records = records.len()))]
pub fn generate_heatmap(records: &[RawListing], params: &FilterParams) -> HeatmapResult {
    let listings = normalize_all(records);
    let filtered = apply_filters(listings, params);

    let values: Vec<f64> = filtered.iter().map(|l| l.price_per_sqm).collect();
    let overall_average_price = mean(&values);

    let points: Vec<PlanarPoint> = filtered
        .iter()
        .map(|l| PlanarPoint {
            position: to_mercator(l.longitude, l.latitude),
            price_per_sqm: l.price_per_sqm,
        })
        .collect();

    let cells = aggregate(&points);

    info!(
        datapoints = filtered.len(),
        occupied_cells = cells.len(),
        overall_average_price = ?overall_average_price,
        "Heatmap generated"
    );
    emit(&cells, overall_average_price)
}

/// Decodes one or more CSV extracts and runs the pipeline on the
/// concatenated record set.
///
/// # Errors
///
/// Returns an error if any source is not a readable CSV with headers; data
/// problems inside individual rows are handled by dropping the row.
pub fn generate_from_sources<'a, I>(sources: I, params: &FilterParams) -> Result<HeatmapResult>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let records = load_all(sources)?;
    Ok(generate_heatmap(&records, params))
}
