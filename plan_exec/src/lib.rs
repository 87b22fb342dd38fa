//! # Planner library.
//!
//! This library allows other crates in the workspace, and the editor, to access the mission tree
//! and path planning items defined inside the planner crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Coordinate transform - converts between geodetic positions and the local planar frame
pub mod geo;

/// Dubins paths - pair solver, chain builder and run extraction
pub mod dubins;

/// Mission tree - the copy-on-write hierarchical mission document
pub mod mission;

/// Planner - plans the Dubins runs of a mission
pub mod planner;
