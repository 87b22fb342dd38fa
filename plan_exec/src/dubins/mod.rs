//! # Dubins paths
//!
//! Minimum length turn-straight-turn paths for a fixed-wing vehicle with a minimum turn radius.
//!
//! - [`solver`] - solves the shortest path between two oriented points.
//! - [`chain`] - chains the solver along a run of planning points, and provides the tunable
//!   parameter interface used by external optimisers.
//! - [`runs`] - extracts the runs of Dubins commands from a mission's mainline.
//!
//! All geometry is done in the local planar frame (x east, y north, meters). Headings are compass
//! headings in degrees (clockwise from north), arc angles are standard mathematical angles in
//! radians (anticlockwise from east).

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod chain;
pub mod runs;
pub mod solver;

pub use chain::*;
pub use runs::*;
pub use solver::*;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use mission_if::LatLng;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::geo;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Gravitational acceleration used in the load factor model.
pub const LOAD_FACTOR_GRAVITY_MS2: f64 = 9.81;

/// Gravitational acceleration used when calculating the vehicle's minimum turn radius.
pub const TURN_RADIUS_GRAVITY_MS2: f64 = 9.8;

// ------------------------------------------------------------------------------------------------
// TYPES
// ------------------------------------------------------------------------------------------------

/// A Dubins path in the local planar frame.
pub type LocalPath = DubinsPath<Vector2<f64>>;

/// A Dubins path localised into geodetic coordinates.
pub type GeoPath = DubinsPath<LatLng>;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A turn-straight-turn path.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DubinsPath<P> {
    pub turn_a: ArcSegment<P>,
    pub straight: Straight<P>,
    pub turn_b: ArcSegment<P>,
}

/// A circular arc.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcSegment<P> {
    /// Centre of the turn circle
    pub center: P,

    /// Radius of the turn circle
    pub radius_m: f64,

    /// Angle of the arc's start point about the centre
    pub start_rad: f64,

    /// Signed angle swept by the arc, positive anticlockwise (a left turn)
    pub sweep_rad: f64,
}

/// A straight line segment.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Straight<P> {
    pub start: P,
    pub end: P,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// One of the segments making up a path.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Segment<P> {
    Arc(ArcSegment<P>),
    Straight(Straight<P>),
}

/// Direction of a turn.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Turn {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DubinsError {
    #[error("No admissible Dubins path exists for pair {index}")]
    NoPathFound { index: usize },

    #[error("Expected {expected} tunable parameter values but found {found}")]
    ParameterCountMismatch { expected: usize, found: usize },
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Turn {
    /// The sign of the turn in the anticlockwise-positive convention.
    pub fn sign(&self) -> f64 {
        match self {
            Turn::Left => 1.0,
            Turn::Right => -1.0,
        }
    }
}

impl<P: Clone> DubinsPath<P> {
    /// The three segments of the path, in order.
    pub fn segments(&self) -> [Segment<P>; 3] {
        [
            Segment::Arc(self.turn_a.clone()),
            Segment::Straight(self.straight.clone()),
            Segment::Arc(self.turn_b.clone()),
        ]
    }

    /// Convert every point in the path into another representation.
    ///
    /// Radii and angles are unchanged.
    pub fn map_points<Q, F>(&self, f: F) -> DubinsPath<Q>
    where
        F: Fn(&P) -> Q,
    {
        DubinsPath {
            turn_a: ArcSegment {
                center: f(&self.turn_a.center),
                radius_m: self.turn_a.radius_m,
                start_rad: self.turn_a.start_rad,
                sweep_rad: self.turn_a.sweep_rad,
            },
            straight: Straight {
                start: f(&self.straight.start),
                end: f(&self.straight.end),
            },
            turn_b: ArcSegment {
                center: f(&self.turn_b.center),
                radius_m: self.turn_b.radius_m,
                start_rad: self.turn_b.start_rad,
                sweep_rad: self.turn_b.sweep_rad,
            },
        }
    }
}

impl LocalPath {
    /// Convert the path into geodetic coordinates about the given reference point.
    pub fn localise(&self, reference: &LatLng) -> GeoPath {
        self.map_points(|p| geo::to_global(reference, p))
    }

    /// The first point of the path.
    pub fn start_point(&self) -> Vector2<f64> {
        self.turn_a.point_at(0.0)
    }

    /// The last point of the path.
    pub fn end_point(&self) -> Vector2<f64> {
        self.turn_b.point_at(1.0)
    }

    /// Sample points along the path with at most the given separation between them.
    ///
    /// The first point is the start of the path and the last the end. Zero length segments add no
    /// points.
    pub fn sample(&self, separation_m: f64) -> Vec<Vector2<f64>> {
        let mut points = vec![self.start_point()];

        for seg in self.segments().iter() {
            let length_m = segment_length(seg);
            if length_m <= std::f64::EPSILON {
                continue;
            }

            let num_points = if separation_m > 0.0 {
                (length_m / separation_m).ceil().max(1.0) as usize
            }
            else {
                1
            };

            for i in 1..=num_points {
                points.push(seg.point_at(i as f64 / num_points as f64));
            }
        }

        points
    }
}

impl ArcSegment<Vector2<f64>> {
    /// The point on the arc at the given fraction of the sweep.
    pub fn point_at(&self, fraction: f64) -> Vector2<f64> {
        let angle = self.start_rad + self.sweep_rad * fraction;
        self.center + self.radius_m * Vector2::new(angle.cos(), angle.sin())
    }
}

impl Segment<Vector2<f64>> {
    /// The point at the given fraction of the segment's length.
    pub fn point_at(&self, fraction: f64) -> Vector2<f64> {
        match self {
            Segment::Arc(arc) => arc.point_at(fraction),
            Segment::Straight(s) => s.start + (s.end - s.start) * fraction,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Length of a single segment in meters.
pub fn segment_length(segment: &Segment<Vector2<f64>>) -> f64 {
    match segment {
        Segment::Arc(arc) => arc.sweep_rad.abs() * arc.radius_m,
        Segment::Straight(s) => (s.end - s.start).norm(),
    }
}

/// Total length of a path in meters.
pub fn path_length(path: &LocalPath) -> f64 {
    path.segments().iter().map(segment_length).sum()
}

/// Load factor of a coordinated turn of the given radius at the given velocity.
///
/// A zero radius gives a load factor of zero rather than infinity, so that degenerate turns don't
/// poison energy sums.
pub fn load_factor(radius_m: f64, velocity_ms: f64) -> f64 {
    if radius_m == 0.0 {
        return 0.0;
    }

    (1.0 + (velocity_ms.powi(4) / (radius_m * LOAD_FACTOR_GRAVITY_MS2).powi(2))).sqrt()
}

/// Energy cost of flying a path, where turns cost their length scaled by the load factor.
pub fn path_energy(path: &LocalPath, velocity_ms: f64, energy_constant: f64) -> f64 {
    let sum: f64 = path
        .segments()
        .iter()
        .map(|seg| match seg {
            Segment::Arc(arc) => segment_length(seg) * load_factor(arc.radius_m, velocity_ms),
            Segment::Straight(_) => segment_length(seg),
        })
        .sum();

    energy_constant * sum
}

/// Minimum turn radius of a vehicle flying at the given velocity with the given maximum bank
/// angle.
pub fn get_min_turn_radius(max_bank_deg: f64, velocity_ms: f64) -> f64 {
    velocity_ms.powi(2) / (TURN_RADIUS_GRAVITY_MS2 * max_bank_deg.to_radians().tan())
}
