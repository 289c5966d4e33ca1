//! Spherical Web Mercator projection (EPSG:4326 ⇄ EPSG:3857).
//!
//! Grid cells are laid out in planar meters so that equal-sized cells cover
//! roughly equal ground area; raw degrees would stretch cells with latitude.

use std::f64::consts::FRAC_PI_2;
use std::f64::consts::FRAC_PI_4;

use geo::Coord;

/// WGS84 semi-major axis in meters, the radius of the Mercator sphere.
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Projects a WGS84 `(longitude, latitude)` pair into Web Mercator meters.
pub fn to_mercator(longitude: f64, latitude: f64) -> Coord<f64> {
    Coord {
        x: EARTH_RADIUS_M * longitude.to_radians(),
        y: EARTH_RADIUS_M * (FRAC_PI_4 + latitude.to_radians() / 2.0).tan().ln(),
    }
}

/// Inverse projection: Web Mercator meters back to `(longitude, latitude)`
/// in WGS84 degrees.
pub fn to_geographic(planar: Coord<f64>) -> (f64, f64) {
    let longitude = (planar.x / EARTH_RADIUS_M).to_degrees();
    let latitude = (2.0 * (planar.y / EARTH_RADIUS_M).exp().atan() - FRAC_PI_2).to_degrees();
    (longitude, latitude)
}
