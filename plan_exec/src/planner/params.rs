//! Parameters structure for the Planner

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::dubins::NoPathPolicy;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for mission planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerParams {
    // ---- VEHICLE ----
    /// Cruise airspeed of the vehicle.
    ///
    /// Units: meters/second
    pub velocity_ms: f64,

    /// Maximum bank angle the vehicle may turn at.
    ///
    /// Units: degrees
    pub max_bank_deg: f64,

    /// Scales path energies.
    #[serde(default = "default_energy_constant")]
    pub energy_constant: f64,

    // ---- PLANNING ----
    /// What to do when two points in a run cannot be joined.
    #[serde(default)]
    pub no_path_policy: NoPathPolicy,

    /// Pass-by radius used for Dubins commands which don't give one.
    ///
    /// Units: meters
    #[serde(default)]
    pub default_passby_m: f64,

    /// Upper limit on the radius of tunable points.
    ///
    /// Units: meters
    #[serde(default)]
    pub max_radius_m: Option<f64>,
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_energy_constant() -> f64 {
    1.0
}
