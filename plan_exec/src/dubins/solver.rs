//! Solves the shortest Dubins path between two oriented points.
//!
//! Four topologies are evaluated, in the fixed order RSR, LSL, RSL, LSR. Each is admissible only
//! if neither endpoint's forced turn direction excludes it and the turn circles are far enough
//! apart for the tangent to exist. The shortest admissible path wins, with exact ties going to the
//! first topology in evaluation order.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector2;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use super::{path_length, ArcSegment, DubinsError, DubinsPath, LocalPath, Straight, Turn};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Arc sweeps within this many radians of a full turn are treated as zero.
const SWEEP_EPSILON_RAD: f64 = 1e-9;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// One end of a path to be solved.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Position in the local frame
    pub position_m: Vector2<f64>,

    /// Compass heading in degrees
    pub heading_deg: f64,

    /// Turn radius at this end
    pub radius_m: f64,

    /// If set the turn at this end must be in this direction
    pub forced: Option<Turn>,
}

/// An admissible path along with the topology which produced it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Solution {
    pub topology: Topology,
    pub path: LocalPath,
    pub length_m: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The turn-straight-turn topologies.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topology {
    Rsr,
    Lsl,
    Rsl,
    Lsr,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Endpoint {
    pub fn new(position_m: Vector2<f64>, heading_deg: f64, radius_m: f64) -> Self {
        Self {
            position_m,
            heading_deg,
            radius_m,
            forced: None,
        }
    }

    /// Force the turn at this end to be in the given direction.
    pub fn forced(mut self, turn: Turn) -> Self {
        self.forced = Some(turn);
        self
    }

    /// Centre of the turn circle on the given side.
    pub fn turn_center(&self, turn: Turn) -> Vector2<f64> {
        let h = self.heading_deg.to_radians();

        // The left normal of the heading vector (sin h, cos h)
        self.position_m + turn.sign() * self.radius_m * Vector2::new(-h.cos(), h.sin())
    }

    fn permits(&self, turn: Turn) -> bool {
        self.forced.map(|f| f == turn).unwrap_or(true)
    }
}

impl Topology {
    /// The order in which topologies are evaluated, which also breaks exact ties.
    pub const EVALUATION_ORDER: [Topology; 4] =
        [Topology::Rsr, Topology::Lsl, Topology::Rsl, Topology::Lsr];

    /// The turn directions at the start and end of this topology.
    pub fn turns(&self) -> (Turn, Turn) {
        match self {
            Topology::Rsr => (Turn::Right, Turn::Right),
            Topology::Lsl => (Turn::Left, Turn::Left),
            Topology::Rsl => (Turn::Right, Turn::Left),
            Topology::Lsr => (Turn::Left, Turn::Right),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Solve the shortest admissible path from `a` to `b`.
pub fn solve(a: &Endpoint, b: &Endpoint) -> Result<LocalPath, DubinsError> {
    solve_all(a, b)
        .into_iter()
        .min_by_key(|s| OrderedFloat(s.length_m))
        .map(|s| s.path)
        .ok_or(DubinsError::NoPathFound { index: 0 })
}

/// All admissible solutions from `a` to `b`, in evaluation order.
pub fn solve_all(a: &Endpoint, b: &Endpoint) -> Vec<Solution> {
    Topology::EVALUATION_ORDER
        .iter()
        .filter_map(|&t| solve_topology(t, a, b))
        .collect()
}

/// Solve a single topology, returning `None` if it isn't admissible.
pub fn solve_topology(topology: Topology, a: &Endpoint, b: &Endpoint) -> Option<Solution> {
    let (turn_a, turn_b) = topology.turns();

    if !a.permits(turn_a) || !b.permits(turn_b) {
        return None;
    }

    let center_a = a.turn_center(turn_a);
    let center_b = b.turn_center(turn_b);

    let delta = center_b - center_a;
    let dist_m = delta.norm();

    // Signed offset of the tangent from the centre line. For same-side turns its magnitude is the
    // radius difference, for cross turns the radius sum.
    let offset_m = turn_b.sign() * b.radius_m - turn_a.sign() * a.radius_m;

    if !(dist_m > offset_m.abs()) {
        return None;
    }

    // Direction of travel along the tangent, and its left normal
    let tangent_rad = delta.y.atan2(delta.x) - (offset_m / dist_m).asin();
    let normal = Vector2::new(-tangent_rad.sin(), tangent_rad.cos());

    let tangent_a = center_a - turn_a.sign() * a.radius_m * normal;
    let tangent_b = center_b - turn_b.sign() * b.radius_m * normal;

    let path = DubinsPath {
        turn_a: arc(center_a, a.radius_m, &a.position_m, &tangent_a, turn_a),
        straight: Straight {
            start: tangent_a,
            end: tangent_b,
        },
        turn_b: arc(center_b, b.radius_m, &tangent_b, &b.position_m, turn_b),
    };

    Some(Solution {
        topology,
        length_m: path_length(&path),
        path,
    })
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build the arc about `center` from `from` to `to` turning in the given direction.
fn arc(
    center: Vector2<f64>,
    radius_m: f64,
    from: &Vector2<f64>,
    to: &Vector2<f64>,
    turn: Turn,
) -> ArcSegment<Vector2<f64>> {
    let start_rad = angle_about(&center, from);
    let end_rad = angle_about(&center, to);

    let sweep_rad = match turn {
        Turn::Left => util::maths::wrap_2pi(end_rad - start_rad, SWEEP_EPSILON_RAD),
        Turn::Right => -util::maths::wrap_2pi(start_rad - end_rad, SWEEP_EPSILON_RAD),
    };

    ArcSegment {
        center,
        radius_m,
        start_rad,
        sweep_rad,
    }
}

fn angle_about(center: &Vector2<f64>, point: &Vector2<f64>) -> f64 {
    let d = point - center;
    d.y.atan2(d.x)
}
