//! # Mission interface crate.
//!
//! Provides the common mission data model shared between the planner, the editor and any dialect
//! layer.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command definitions, the items which make up a mission
pub mod cmd;

/// Command descriptions and the dialect lookup interface
pub mod desc;

/// Geodetic position types
pub mod geo;

// ------------------------------------------------------------------------------------------------
// REEXPORTS
// ------------------------------------------------------------------------------------------------

pub use cmd::{BuiltinKind, Command, ParamError, ParamValue, Params};
pub use desc::{CommandDescription, DescriptionTable, Dialect, ParamDescription, ParamKind};
pub use geo::LatLng;
