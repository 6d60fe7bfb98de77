//! Great-circle math on a spherical Earth.
//!
//! Inputs are [Coordinate]s, which are range-checked when built, so nothing here can fail or
//! produce NaN.

use serde::{Deserialize, Serialize};

use crate::location::Coordinate;

/// Mean radius of the Earth in meters
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance between two points in meters, using the Haversine formula.
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat().to_radians();
    let lat2 = b.lat().to_radians();
    let d_lat = (b.lat() - a.lat()).to_radians();
    let d_long = (b.long() - a.long()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_long / 2.0).sin().powi(2);
    // Rounding can push h just past 1 for antipodal points
    let h = h.clamp(0.0, 1.0);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_METERS * c
}

/// Initial compass bearing from `a` facing `b` in degrees, 0 is north and increases clockwise.
/// Always in `[0, 360)`. Coincident points have no direction, they get 0.
pub fn bearing_degrees(a: Coordinate, b: Coordinate) -> f64 {
    if a == b {
        return 0.0;
    }

    let lat1 = a.lat().to_radians();
    let lat2 = b.lat().to_radians();
    let d_long = (b.long() - a.long()).to_radians();

    let y = d_long.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_long.cos();

    let bearing = (y.atan2(x).to_degrees() + 360.0) % 360.0;
    // (-tiny + 360) can round up to exactly 360
    if bearing >= 360.0 { 0.0 } else { bearing }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, specta::Type)]
pub struct GeodesicResult {
    pub distance_meters: f64,
    pub bearing_degrees: f64,
}

impl GeodesicResult {
    /// Distance from `from` to `to` and the bearing `from` has to face to look at `to`
    pub fn between(from: Coordinate, to: Coordinate) -> Self {
        Self {
            distance_meters: distance_meters(from, to),
            bearing_degrees: bearing_degrees(from, to),
        }
    }
}
