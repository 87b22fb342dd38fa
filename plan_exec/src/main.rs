//! Main planner executable entry point.
//!
//! Loads a mission document, plans the Dubins runs of one of its sub-missions and archives the
//! planned runs into the session directory.
//!
//! # Usage
//!
//! ```text
//! plan_exec <mission.json> [--params planner.toml] [--dialect table.toml] [--name Main]
//!     [--log-level debug]
//! ```
//!
//! If no parameter file is given `planner.toml` is loaded from the software root's `params`
//! directory.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use std::{fs, path::PathBuf};
use structopt::StructOpt;

// Internal
use mission_if::DescriptionTable;
use plan_lib::{
    mission::Mission,
    planner::{Planner, PlannerParams},
};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Plans the Dubins runs of a mission.
#[derive(Debug, StructOpt)]
#[structopt(name = "plan_exec")]
struct Args {
    /// The mission document to plan, in JSON.
    #[structopt(parse(from_os_str))]
    mission: PathBuf,

    /// Planner parameter file, defaults to `planner.toml` in the parameters directory.
    #[structopt(long, parse(from_os_str))]
    params: Option<PathBuf>,

    /// Dialect description table to add to the builtin commands.
    #[structopt(long, parse(from_os_str))]
    dialect: Option<PathBuf>,

    /// The sub-mission to plan.
    #[structopt(long, default_value = "Main")]
    name: String,

    /// Minimum level to log at, at least `info`.
    #[structopt(long, default_value = "debug")]
    log_level: LevelFilter,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let args = Args::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("plan_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger, keeping the per-edit traces of the mission tree out
    logger_init(
        args.log_level,
        &[("plan_lib::mission", LevelFilter::Debug)],
        &session,
    )
    .wrap_err("Failed to initialise logging")?;

    info!("Mission Planner Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", args);

    // ---- LOAD PARAMETERS ----

    let params: PlannerParams = match args.params {
        Some(ref path) => util::params::load_from_path(path),
        None => util::params::load("planner.toml"),
    }
    .wrap_err("Could not load planner params")?;

    let dialect = match args.dialect {
        Some(ref path) => {
            let table: DescriptionTable = util::params::load_from_path(path)
                .wrap_err("Could not load the dialect table")?;
            DescriptionTable::builtin().merge(table)
        }
        None => DescriptionTable::builtin(),
    };

    info!("Planner parameters loaded");
    debug!(
        "Dialect commands: {:?}",
        dialect.iter().map(|d| d.tag.as_str()).collect::<Vec<_>>()
    );

    // ---- LOAD MISSION ----

    let mission_str = fs::read_to_string(&args.mission)
        .wrap_err_with(|| format!("Could not read mission file {:?}", args.mission))?;
    let mission: Mission =
        serde_json::from_str(&mission_str).wrap_err("Could not parse the mission")?;

    info!(
        "Loaded mission with sub-missions {:?}",
        mission.get_missions().collect::<Vec<_>>()
    );

    // ---- PLAN ----

    let planner = Planner::new(params);
    let runs = planner
        .plan(&mission, &args.name, &dialect)
        .wrap_err_with(|| format!("Failed to plan \"{}\"", args.name))?;

    if runs.is_empty() {
        warn!("\"{}\" contains no Dubins runs", args.name);
    }

    let length_m: f64 = runs.iter().map(|r| r.length_m).sum();
    let energy: f64 = runs.iter().map(|r| r.energy).sum();
    info!(
        "Planned {} runs, total length {:.1} m, total energy {:.1}",
        runs.len(),
        length_m,
        energy
    );

    // ---- ARCHIVE ----

    let path = session
        .save("plan.json", &runs)
        .wrap_err("Failed to archive the planned runs")?;

    info!("Planned runs saved to {:?}", path);

    Ok(())
}
