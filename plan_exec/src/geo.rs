//! # Coordinate transform
//!
//! Converts between geodetic positions and the local planar (east-north) frame anchored at a
//! mission's reference point.
//!
//! An equirectangular approximation is used, which is accurate to well under a meter over the tens
//! of kilometers a mission covers, degrading gracefully at high latitudes.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use mission_if::LatLng;
use nalgebra::Vector2;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Mean radius of the Earth in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Project a geodetic point into the local frame of the reference point.
///
/// The returned vector is `[east, north]` in meters.
pub fn to_local(reference: &LatLng, point: &LatLng) -> Vector2<f64> {
    let d_lat_rad = (point.lat_deg - reference.lat_deg).to_radians();
    let d_lng_rad = (point.lng_deg - reference.lng_deg).to_radians();

    Vector2::new(
        d_lng_rad * reference.lat_deg.to_radians().cos() * EARTH_RADIUS_M,
        d_lat_rad * EARTH_RADIUS_M,
    )
}

/// Convert a point in the local frame of the reference point back into a geodetic point.
pub fn to_global(reference: &LatLng, point_m: &Vector2<f64>) -> LatLng {
    let d_lat_rad = point_m.y / EARTH_RADIUS_M;
    let d_lng_rad = point_m.x / (EARTH_RADIUS_M * reference.lat_deg.to_radians().cos());

    LatLng::new(
        reference.lat_deg + d_lat_rad.to_degrees(),
        reference.lng_deg + d_lng_rad.to_degrees(),
    )
}

/// Compass bearing in degrees (clockwise from north, [0, 360)) of the vector `from -> to` in the
/// local frame.
pub fn bearing_deg(from_m: &Vector2<f64>, to_m: &Vector2<f64>) -> f64 {
    let d = to_m - from_m;
    util::maths::wrap_360(d.x.atan2(d.y).to_degrees())
}
