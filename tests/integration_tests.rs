use listing_heatmap::filter::{FilterParams, apply_filters};
use listing_heatmap::grid::{PlanarPoint, aggregate};
use listing_heatmap::heatmap::generate_from_sources;
use listing_heatmap::loader::load_records;
use listing_heatmap::normalize::normalize_all;
use listing_heatmap::output::Geometry;
use listing_heatmap::projection::to_mercator;

// 37 rows: three groups of ten clean Casablanca listings (price per sqm
// 8000 / 9000 / 10000 at three distinct locations) plus seven rows the
// pipeline must drop for various reasons.
const FIXTURE: &[u8] = include_bytes!("fixtures/sample_listings.csv");

#[test]
fn test_full_pipeline_on_fixture() {
    let result = generate_from_sources([FIXTURE], &FilterParams::default()).unwrap();

    assert_eq!(result.grid_cells.features.len(), 3);
    assert_eq!(result.centroids.features.len(), 3);

    let overall = result.overall_average_price.unwrap();
    assert!((overall - 9000.0).abs() < 1e-9);

    let mut means: Vec<f64> = result
        .grid_cells
        .features
        .iter()
        .map(|f| f.properties.price_per_sqm)
        .collect();
    means.sort_by(f64::total_cmp);
    assert_eq!(means, vec![8000.0, 9000.0, 10000.0]);
}

#[test]
fn test_centroids_mirror_grid_cells() {
    let result = generate_from_sources([FIXTURE], &FilterParams::default()).unwrap();

    for (cell, centroid) in result
        .grid_cells
        .features
        .iter()
        .zip(&result.centroids.features)
    {
        assert_eq!(cell.properties, centroid.properties);

        let Geometry::Polygon { coordinates } = &cell.geometry else {
            panic!("grid feature must be a polygon");
        };
        let Geometry::Point { coordinates: center } = &centroid.geometry else {
            panic!("centroid feature must be a point");
        };

        let ring = &coordinates[0];
        let lon_min = ring.iter().map(|p| p[0]).fold(f64::INFINITY, f64::min);
        let lon_max = ring.iter().map(|p| p[0]).fold(f64::NEG_INFINITY, f64::max);
        let lat_min = ring.iter().map(|p| p[1]).fold(f64::INFINITY, f64::min);
        let lat_max = ring.iter().map(|p| p[1]).fold(f64::NEG_INFINITY, f64::max);

        assert!((center[0] - (lon_min + lon_max) / 2.0).abs() < 1e-9);
        assert!((center[1] - (lat_min + lat_max) / 2.0).abs() < 1e-9);
    }
}

#[test]
fn test_output_is_bit_for_bit_deterministic() {
    let a = generate_from_sources([FIXTURE], &FilterParams::default()).unwrap();
    let b = generate_from_sources([FIXTURE], &FilterParams::default()).unwrap();

    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn test_cells_partition_the_filtered_set() {
    let records = load_records(FIXTURE).unwrap();
    let filtered = apply_filters(normalize_all(&records), &FilterParams::default());
    assert_eq!(filtered.len(), 30);

    let points: Vec<PlanarPoint> = filtered
        .iter()
        .map(|l| PlanarPoint {
            position: to_mercator(l.longitude, l.latitude),
            price_per_sqm: l.price_per_sqm,
        })
        .collect();
    let cells = aggregate(&points);

    let counted: usize = cells.iter().map(|c| c.point_count).sum();
    assert_eq!(counted, filtered.len());
    assert!(cells.iter().all(|c| c.point_count >= 1));
}

#[test]
fn test_concatenated_sources_share_one_grid() {
    let single = generate_from_sources([FIXTURE], &FilterParams::default()).unwrap();
    let double = generate_from_sources([FIXTURE, FIXTURE], &FilterParams::default()).unwrap();

    // Doubling every record doubles cell population but moves no statistic.
    assert_eq!(
        double.overall_average_price,
        single.overall_average_price
    );
    assert_eq!(
        double.grid_cells.features.len(),
        single.grid_cells.features.len()
    );
}

#[test]
fn test_narrow_size_range_prunes_everything() {
    let params = FilterParams {
        min_size: 150.0,
        max_size: 500.0,
        ..FilterParams::default()
    };
    let result = generate_from_sources([FIXTURE], &params).unwrap();

    // Every clean fixture listing is 100 sqm.
    assert!(result.grid_cells.features.is_empty());
    assert!(result.centroids.features.is_empty());
    assert_eq!(result.overall_average_price, None);
}
