//! Chains the pair solver along a sequence of planning points.
//!
//! Each interior point is offset from its nominal position by its pass-by radius, to the side the
//! path turns about it, before the pairs are solved. The tunable heading and radius of each point
//! are exposed as a flat parameter vector for external optimisers.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::warn;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use util::maths;

use super::{solve, DubinsError, Endpoint, LocalPath};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A point to plan a Dubins path through.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DubinsPlanningPoint {
    /// Nominal position in the local frame
    pub position_m: Vector2<f64>,

    /// Compass heading in degrees
    pub heading_deg: f64,

    /// Turn radius
    pub radius_m: f64,

    /// Radius at which the vehicle passes by the point rather than through it
    pub passby_m: f64,

    /// If true the heading and radius may be optimised
    pub tunable: bool,

    /// Limits on the radius when optimising
    pub bounds: RadiusBounds,
}

/// Limits on the turn radius of a planning point.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RadiusBounds {
    /// The vehicle's minimum turn radius
    pub min_turn_radius_m: f64,

    /// Optional upper limit on the radius
    pub max_radius_m: Option<f64>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// What to do when no path exists between a pair of points in a chain.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoPathPolicy {
    /// Warn and leave the segment out, giving a partial chain
    Skip,

    /// Fail the whole chain
    Abort,
}

/// Bounds on a single tunable parameter.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamBound {
    /// A circular parameter wrapping in `[min, max)`
    Circular { min: f64, max: f64 },

    /// A linear parameter clamped to `[min, max]`
    Range { min: f64, max: Option<f64> },
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Default for NoPathPolicy {
    fn default() -> Self {
        NoPathPolicy::Skip
    }
}

impl DubinsPlanningPoint {
    /// A non-tunable point with no pass-by radius.
    pub fn new(position_m: Vector2<f64>, heading_deg: f64, radius_m: f64) -> Self {
        Self {
            position_m,
            heading_deg,
            radius_m,
            passby_m: 0.0,
            tunable: false,
            bounds: RadiusBounds::default(),
        }
    }

    /// The smallest radius this point may be tuned to.
    pub fn min_radius_m(&self) -> f64 {
        self.bounds.min_turn_radius_m.max(self.passby_m)
    }

    /// The position the path is actually planned through, offset to the right of the heading by
    /// the pass-by radius scaled by `bias`.
    pub fn offset_position(&self, bias: f64) -> Vector2<f64> {
        let h = self.heading_deg.to_radians();
        self.position_m + self.passby_m * bias * Vector2::new(h.cos(), -h.sin())
    }
}

impl ParamBound {
    /// Bring a value within this bound.
    pub fn apply(&self, value: f64) -> f64 {
        match *self {
            ParamBound::Circular { min, max } => {
                let wrapped = min + maths::rem_euclid(value - min, max - min);

                // rem_euclid can round up to the full span
                if wrapped >= max {
                    min
                } else {
                    wrapped
                }
            }
            ParamBound::Range { min, max } => maths::clamp_opt(value, Some(min), max),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// The pass-by side of each point.
///
/// Interior points are biased by the sign of the cross product of the incoming and outgoing legs,
/// positive being an offset to the right. The first and last points have no bias.
pub fn biases(points: &[DubinsPlanningPoint]) -> Vec<f64> {
    (0..points.len())
        .map(|i| {
            if i == 0 || i + 1 >= points.len() {
                return 0.0;
            }

            let incoming = points[i].position_m - points[i - 1].position_m;
            let outgoing = points[i + 1].position_m - points[i].position_m;

            maths::sign(incoming.x * outgoing.y - incoming.y * outgoing.x)
        })
        .collect()
}

/// Solve every consecutive pair of points, giving one result per pair.
pub fn solve_pairs(points: &[DubinsPlanningPoint]) -> Vec<Result<LocalPath, DubinsError>> {
    let endpoints: Vec<Endpoint> = points
        .iter()
        .zip(biases(points))
        .map(|(p, bias)| Endpoint::new(p.offset_position(bias), p.heading_deg, p.radius_m))
        .collect();

    endpoints
        .windows(2)
        .enumerate()
        .map(|(index, pair)| {
            solve(&pair[0], &pair[1]).map_err(|_| DubinsError::NoPathFound { index })
        })
        .collect()
}

/// Build the chain of paths through the points, applying the policy to pairs with no path.
///
/// Each path is returned alongside the index of the pair (and so of its first point) it joins.
pub fn build_indexed(
    points: &[DubinsPlanningPoint],
    policy: NoPathPolicy,
) -> Result<Vec<(usize, LocalPath)>, DubinsError> {
    let mut paths = Vec::with_capacity(points.len().saturating_sub(1));

    for (index, result) in solve_pairs(points).into_iter().enumerate() {
        match result {
            Ok(path) => paths.push((index, path)),
            Err(e) => match policy {
                NoPathPolicy::Skip => {
                    warn!(
                        "No Dubins path between points {} and {}, leaving the segment out",
                        index,
                        index + 1
                    )
                }
                NoPathPolicy::Abort => return Err(e),
            },
        }
    }

    Ok(paths)
}

/// Build the chain of paths through the points, applying the policy to pairs with no path.
pub fn build(
    points: &[DubinsPlanningPoint],
    policy: NoPathPolicy,
) -> Result<Vec<LocalPath>, DubinsError> {
    Ok(build_indexed(points, policy)?
        .into_iter()
        .map(|(_, path)| path)
        .collect())
}

/// Get the `[heading, radius]` pairs of every tunable point, flattened in point order.
pub fn get_tunable_parameters(points: &[DubinsPlanningPoint]) -> Vec<f64> {
    points
        .iter()
        .filter(|p| p.tunable)
        .flat_map(|p| vec![p.heading_deg, p.radius_m])
        .collect()
}

/// Write `[heading, radius]` pairs back into the tunable points, wrapping headings into
/// `[0, 360)`.
pub fn set_tunable_parameters(
    points: &mut [DubinsPlanningPoint],
    values: &[f64],
) -> Result<(), DubinsError> {
    check_count(points, values.len())?;

    for (point, pair) in points
        .iter_mut()
        .filter(|p| p.tunable)
        .zip(values.chunks(2))
    {
        point.heading_deg = maths::wrap_360(pair[0]);
        point.radius_m = pair[1];
    }

    Ok(())
}

/// Get the bounds of every tunable parameter, in the same order as [`get_tunable_parameters`].
pub fn get_bounds(points: &[DubinsPlanningPoint]) -> Vec<ParamBound> {
    points
        .iter()
        .filter(|p| p.tunable)
        .flat_map(|p| {
            vec![
                ParamBound::Circular {
                    min: 0.0,
                    max: 360.0,
                },
                ParamBound::Range {
                    min: p.min_radius_m(),
                    max: p.bounds.max_radius_m,
                },
            ]
        })
        .collect()
}

/// Bring a tunable parameter vector within the points' bounds.
pub fn apply_bounds(points: &[DubinsPlanningPoint], values: &mut [f64]) -> Result<(), DubinsError> {
    check_count(points, values.len())?;

    for (value, bound) in values.iter_mut().zip(get_bounds(points)) {
        *value = bound.apply(*value);
    }

    Ok(())
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn check_count(points: &[DubinsPlanningPoint], found: usize) -> Result<(), DubinsError> {
    let expected = 2 * points.iter().filter(|p| p.tunable).count();

    if expected != found {
        return Err(DubinsError::ParameterCountMismatch { expected, found });
    }

    Ok(())
}
