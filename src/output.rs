//! GeoJSON emission and persistence for the aggregated grid.
//!
//! Reprojects occupied cells back to geographic coordinates and serializes
//! them as two FeatureCollections (filled polygons and centroids) plus the
//! overall mean.

use std::fs;
use std::path::Path;

use anyhow::Result;
use geo::{Coord, Rect};
use serde::Serialize;
use tracing::{debug, info};

use crate::grid::GridCell;
use crate::projection::to_geographic;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Feature {
    pub properties: CellProperties,
    pub geometry: Geometry,
}

/// The one property every feature carries, keyed the way the map frontend
/// expects it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellProperties {
    #[serde(rename = "Price per Square Meter")]
    pub price_per_sqm: f64,
}

/// GeoJSON geometry, positions in `[longitude, latitude]` order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
    Point { coordinates: [f64; 2] },
}

/// The full result of one heatmap invocation. A pure value: identical input
/// and parameters serialize to identical bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapResult {
    pub grid_cells: FeatureCollection,
    pub centroids: FeatureCollection,
    /// Mean price-per-sqm over the whole filtered set; `null` when the
    /// filtered set is empty.
    pub overall_average_price: Option<f64>,
}

/// Builds the two feature collections from the occupied cells, reprojecting
/// each cell rectangle and its centroid to EPSG:4326.
pub fn emit(cells: &[GridCell], overall_average_price: Option<f64>) -> HeatmapResult {
    let mut polygons = Vec::with_capacity(cells.len());
    let mut centroids = Vec::with_capacity(cells.len());

    for cell in cells {
        let bounds = reproject_rect(&cell.bounds);
        let properties = CellProperties {
            price_per_sqm: cell.mean_price_per_sqm,
        };

        polygons.push(Feature {
            properties: properties.clone(),
            geometry: Geometry::Polygon {
                coordinates: vec![closed_ring(&bounds)],
            },
        });

        let center = bounds.center();
        centroids.push(Feature {
            properties,
            geometry: Geometry::Point {
                coordinates: [center.x, center.y],
            },
        });
    }

    HeatmapResult {
        grid_cells: FeatureCollection { features: polygons },
        centroids: FeatureCollection {
            features: centroids,
        },
        overall_average_price,
    }
}

/// Writes a result as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization or the file write fails.
pub fn write_result(path: &str, result: &HeatmapResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    fs::write(Path::new(path), json)?;
    info!(
        path,
        cells = result.grid_cells.features.len(),
        "Heatmap result written"
    );
    Ok(())
}

/// Logs a result as pretty-printed JSON.
pub fn print_json(result: &HeatmapResult) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

/// Logs the headline numbers for a result.
pub fn print_summary(result: &HeatmapResult) {
    debug!(
        cells = result.grid_cells.features.len(),
        centroids = result.centroids.features.len(),
        overall_average_price = ?result.overall_average_price,
        "Heatmap summary"
    );
}

fn reproject_rect(planar: &Rect<f64>) -> Rect<f64> {
    let (lon_min, lat_min) = to_geographic(planar.min());
    let (lon_max, lat_max) = to_geographic(planar.max());
    Rect::new(
        Coord {
            x: lon_min,
            y: lat_min,
        },
        Coord {
            x: lon_max,
            y: lat_max,
        },
    )
}

/// Counter-clockwise closed ring from the bottom-left corner.
fn closed_ring(bounds: &Rect<f64>) -> Vec<[f64; 2]> {
    let (min, max) = (bounds.min(), bounds.max());
    vec![
        [min.x, min.y],
        [max.x, min.y],
        [max.x, max.y],
        [min.x, max.y],
        [min.x, min.y],
    ]
}
