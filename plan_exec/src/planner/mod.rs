//! # Mission planner
//!
//! Plans the Dubins runs of a mission. The named collection is flattened and folded into its
//! mainline, the runs of Dubins commands are extracted, and each run is projected into planning
//! points and chained. The resulting paths are reported in both the local and geodetic frames,
//! along with their lengths, energies and the altitudes needed to export them.
//!
//! Dubins commands provide their own heading and turn radius. The ordinary commands anchoring
//! either end of a run face towards (or away from) their Dubins neighbour and turn at the
//! vehicle's minimum turn radius.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod altitude;
mod params;

pub use altitude::*;
pub use params::PlannerParams;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info};
use mission_if::{
    cmd::{PARAM_ALTITUDE, PARAM_HEADING, PARAM_PASSBY, PARAM_RADIUS, PARAM_TUNABLE},
    Dialect, LatLng, ParamError,
};
use nalgebra::Vector2;
use serde::Serialize;

use crate::{
    dubins::{
        build_indexed, get_min_turn_radius, path_energy, path_length, split_runs, DubinsError,
        DubinsPlanningPoint, DubinsRun, GeoPath, LocalPath, RadiusBounds,
    },
    geo,
    mission::{MainLineItem, Mission, MissionError},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Planner {
    params: PlannerParams,
}

/// A single planned path between two consecutive items of a run.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedLeg {
    /// Mainline id of the item the leg starts at
    pub from_id: usize,

    /// Mainline id of the item the leg ends at
    pub to_id: usize,

    /// The path in the local frame
    pub local_path: LocalPath,

    /// The path in geodetic coordinates
    pub geo_path: GeoPath,

    /// Altitude at the end of each of the path's three segments
    pub end_altitudes_m: [f64; 3],

    pub length_m: f64,

    pub energy: f64,
}

/// The planned legs of a single Dubins run.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedRun {
    /// Index in the mainline of the first item of the run
    pub start: usize,

    /// Legs of the run, pairs with no path are absent if they were skipped
    pub legs: Vec<PlannedLeg>,

    pub length_m: f64,

    pub energy: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error("Mission error: {0}")]
    Mission(#[from] MissionError),

    #[error("Dubins error: {0}")]
    Dubins(#[from] DubinsError),

    #[error("Mainline command {id} has an unusable parameter: {source}")]
    Param { id: usize, source: ParamError },
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Planner {
    pub fn new(params: PlannerParams) -> Self {
        Self { params }
    }

    /// The vehicle's minimum turn radius.
    pub fn min_turn_radius_m(&self) -> f64 {
        get_min_turn_radius(self.params.max_bank_deg, self.params.velocity_ms)
    }

    /// Plan every Dubins run in the named collection of the mission.
    pub fn plan<D>(
        &self,
        mission: &Mission,
        name: &str,
        dialect: &D,
    ) -> Result<Vec<PlannedRun>, PlanError>
    where
        D: Dialect + ?Sized,
    {
        let main_line = mission.main_line(name, dialect)?;
        let runs = split_runs(&main_line);

        debug!(
            "\"{}\" has {} mainline items in {} Dubins runs",
            name,
            main_line.len(),
            runs.len()
        );

        runs.iter()
            .map(|run| self.plan_run(mission.reference(), run))
            .collect()
    }

    /// Plan a single run.
    pub fn plan_run(
        &self,
        reference: &LatLng,
        run: &DubinsRun<'_, MainLineItem>,
    ) -> Result<PlannedRun, PlanError> {
        let points = self.planning_points(reference, run.run)?;
        let paths = build_indexed(&points, self.params.no_path_policy)?;

        let mut legs = Vec::with_capacity(paths.len());
        for (index, path) in paths {
            let from = &run.run[index];
            let to = &run.run[index + 1];

            legs.push(PlannedLeg {
                from_id: from.id,
                to_id: to.id,
                end_altitudes_m: segment_end_altitudes(
                    &path,
                    number(from, PARAM_ALTITUDE)?,
                    number(to, PARAM_ALTITUDE)?,
                ),
                length_m: path_length(&path),
                energy: path_energy(
                    &path,
                    self.params.velocity_ms,
                    self.params.energy_constant,
                ),
                geo_path: path.localise(reference),
                local_path: path,
            });
        }

        let length_m = legs.iter().map(|l| l.length_m).sum();
        let energy = legs.iter().map(|l| l.energy).sum();

        info!(
            "Planned run at mainline item {}: {} of {} legs, {:.1} m",
            run.start,
            legs.len(),
            run.run.len().saturating_sub(1),
            length_m
        );

        Ok(PlannedRun {
            start: run.start,
            legs,
            length_m,
            energy,
        })
    }

    /// Project the items of a run into planning points in the local frame of `reference`.
    pub fn planning_points(
        &self,
        reference: &LatLng,
        items: &[MainLineItem],
    ) -> Result<Vec<DubinsPlanningPoint>, PlanError> {
        let min_turn_radius_m = self.min_turn_radius_m();
        let bounds = RadiusBounds {
            min_turn_radius_m,
            max_radius_m: self.params.max_radius_m,
        };

        let positions = items
            .iter()
            .map(|item| {
                let point = item.cmd.position().map_err(|source| PlanError::Param {
                    id: item.id,
                    source,
                })?;
                Ok(geo::to_local(reference, &point))
            })
            .collect::<Result<Vec<Vector2<f64>>, PlanError>>()?;

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let mut point = if item.cmd.is_dubins() {
                    let mut p = DubinsPlanningPoint::new(
                        positions[i],
                        number(item, PARAM_HEADING)?,
                        number(item, PARAM_RADIUS)?,
                    );
                    p.passby_m =
                        optional(item, PARAM_PASSBY)?.unwrap_or(self.params.default_passby_m);
                    p.tunable = optional(item, PARAM_TUNABLE)?
                        .map(|t| t != 0.0)
                        .unwrap_or(false);
                    p
                } else {
                    let heading_deg = if i + 1 < items.len() {
                        geo::bearing_deg(&positions[i], &positions[i + 1])
                    } else if i > 0 {
                        geo::bearing_deg(&positions[i - 1], &positions[i])
                    } else {
                        0.0
                    };
                    DubinsPlanningPoint::new(positions[i], heading_deg, min_turn_radius_m)
                };

                point.bounds = bounds;
                Ok(point)
            })
            .collect()
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn number(item: &MainLineItem, name: &str) -> Result<f64, PlanError> {
    item.cmd.number(name).map_err(|source| PlanError::Param {
        id: item.id,
        source,
    })
}

/// A numeric parameter which may be left out.
fn optional(item: &MainLineItem, name: &str) -> Result<Option<f64>, PlanError> {
    match item.cmd.number(name) {
        Ok(v) => Ok(Some(v)),
        Err(ParamError::Missing(..)) => Ok(None),
        Err(source) => Err(PlanError::Param {
            id: item.id,
            source,
        }),
    }
}
