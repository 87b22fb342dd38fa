//! Altitude interpolation along planned paths, for synthesising dialect commands on export.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use crate::dubins::{segment_length, LocalPath};

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Altitude at the given fraction of the way from `start_m` to `end_m`.
pub fn interpolate_altitude(start_m: f64, end_m: f64, fraction: f64) -> f64 {
    start_m + (end_m - start_m) * fraction
}

/// Altitude at the end of each of the three segments of the path, climbing or descending linearly
/// with distance flown.
///
/// A zero length path is at the end altitude throughout.
pub fn segment_end_altitudes(path: &LocalPath, start_m: f64, end_m: f64) -> [f64; 3] {
    let lengths: Vec<f64> = path.segments().iter().map(segment_length).collect();
    let total_m: f64 = lengths.iter().sum();

    if total_m <= std::f64::EPSILON {
        return [end_m; 3];
    }

    let mut alts = [end_m; 3];
    let mut flown_m = 0.0;
    for (alt, length_m) in alts.iter_mut().zip(lengths) {
        flown_m += length_m;
        *alt = interpolate_altitude(start_m, end_m, flown_m / total_m);
    }

    alts
}
