//! # Mission tree
//!
//! A [`Mission`] is a set of named collections of commands (sub-missions) plus the reference point
//! used to project the mission into the local planar frame. Collections reference each other by
//! name using [`Command::Group`]s, which are expanded by [`Mission::flatten`].
//!
//! Missions are never edited in place. Every edit returns a new mission, leaving the original
//! unchanged, and the editor swaps its reference to the new one. Collections are shared between
//! a mission and its edits until an edit touches them.
//!
//! The group references must never form a cycle. This is enforced when a group is added (see
//! [`Mission::push_to_mission`] and [`Mission::insert`]) and when a mission document is
//! deserialised; [`Mission::set`] is a trusted bulk replace and is not checked.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod edit;
mod main_line;

pub use main_line::MainLineItem;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use mission_if::{Command, LatLng};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// The main sub-mission, the one the vehicle flies
pub const MAIN: &str = "Main";

/// The geofence sub-mission
pub const GEOFENCE: &str = "Geofence";

/// The markers sub-mission
pub const MARKERS: &str = "Markers";

/// Sub-missions which are always present.
pub const RESERVED: [&str; 3] = [MAIN, GEOFENCE, MARKERS];

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A hierarchical mission document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MissionDoc", into = "MissionDoc")]
pub struct Mission {
    missions: BTreeMap<String, Arc<Vec<Command>>>,

    reference: LatLng,
}

/// The serialised form of a mission.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MissionDoc {
    #[serde(default)]
    reference: LatLng,

    #[serde(default)]
    missions: BTreeMap<String, Vec<Command>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MissionError {
    #[error("No sub-mission named \"{0}\" exists")]
    MissingMission(String),

    #[error("Adding a group of \"{child}\" to \"{parent}\" would make the mission recursive")]
    RecursiveMission { parent: String, child: String },

    #[error("Index {index} is out of range for sub-mission \"{name}\" of length {len}")]
    IndexOutOfRange {
        name: String,
        index: usize,
        len: usize,
    },

    #[error("Sub-mission \"{0}\" is reserved and cannot be removed")]
    ReservedMission(String),

    #[error("A sub-mission named \"{0}\" already exists")]
    DuplicateMission(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Mission {
    /// Create an empty mission about the given reference point.
    pub fn new(reference: LatLng) -> Self {
        let missions = RESERVED
            .iter()
            .map(|name| (name.to_string(), Arc::new(Vec::new())))
            .collect();

        Self {
            missions,
            reference,
        }
    }

    /// The reference point of the local frame.
    pub fn reference(&self) -> &LatLng {
        &self.reference
    }

    /// Get the commands in the named sub-mission.
    pub fn get(&self, name: &str) -> Result<&[Command], MissionError> {
        self.missions
            .get(name)
            .map(|cmds| cmds.as_slice())
            .ok_or_else(|| MissionError::MissingMission(name.to_string()))
    }

    /// Names of all the sub-missions, in sorted order.
    pub fn get_missions(&self) -> impl Iterator<Item = &str> {
        self.missions.keys().map(|k| k.as_str())
    }

    pub fn has_mission(&self, name: &str) -> bool {
        self.missions.contains_key(name)
    }

    /// True if the named sub-mission contains, at any depth, a group referencing `target`.
    ///
    /// Groups referencing missing sub-missions are ignored.
    pub fn contains(&self, name: &str, target: &str) -> Result<bool, MissionError> {
        let mut visited = HashSet::new();
        let mut stack = vec![name];

        // Check the root exists
        self.get(name)?;

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }

            let cmds = match self.missions.get(current) {
                Some(c) => c,
                None => continue,
            };

            for child in cmds.iter().filter_map(Command::group_name) {
                if child == target {
                    return Ok(true);
                }
                stack.push(child);
            }
        }

        Ok(false)
    }

    /// True if the named sub-mission contains a group referencing itself at any depth.
    pub fn is_recursive(&self, name: &str) -> Result<bool, MissionError> {
        self.contains(name, name)
    }

    /// Expand all groups in the named sub-mission, depth first, giving a list with no groups in
    /// it.
    pub fn flatten(&self, name: &str) -> Result<Vec<Command>, MissionError> {
        let mut flat = Vec::new();
        self.flatten_into(name, &mut flat)?;
        Ok(flat)
    }

    /// The number of commands in the flattened sub-mission.
    pub fn flat_len(&self, name: &str) -> Result<usize, MissionError> {
        self.get(name)?
            .iter()
            .map(|cmd| match cmd.group_name() {
                Some(child) => self.flat_len(child),
                None => Ok(1),
            })
            .sum()
    }

    /// Map an index into the flattened sub-mission back to the sub-mission and local index of
    /// the command.
    ///
    /// Returns `None` if the index is beyond the end of the flattened sub-mission.
    pub fn find_nth_position(
        &self,
        name: &str,
        n: usize,
    ) -> Result<Option<(String, usize)>, MissionError> {
        let mut remaining = n;

        for (index, cmd) in self.get(name)?.iter().enumerate() {
            match cmd.group_name() {
                Some(child) => {
                    let child_len = self.flat_len(child)?;
                    if remaining < child_len {
                        return self.find_nth_position(child, remaining);
                    }
                    remaining -= child_len;
                }
                None => {
                    if remaining == 0 {
                        return Ok(Some((name.to_string(), index)));
                    }
                    remaining -= 1;
                }
            }
        }

        Ok(None)
    }

    fn flatten_into(&self, name: &str, flat: &mut Vec<Command>) -> Result<(), MissionError> {
        for cmd in self.get(name)? {
            match cmd.group_name() {
                Some(child) => self.flatten_into(child, flat)?,
                None => flat.push(cmd.clone()),
            }
        }

        Ok(())
    }
}

impl Default for Mission {
    fn default() -> Self {
        Self::new(LatLng::default())
    }
}

impl TryFrom<MissionDoc> for Mission {
    type Error = MissionError;

    /// Loaded documents go through the same group checks as edits: every group must name an
    /// existing sub-mission and no sub-mission may reach itself.
    fn try_from(doc: MissionDoc) -> Result<Self, Self::Error> {
        let mut mission = Mission::new(doc.reference);

        for (name, cmds) in doc.missions {
            mission.missions.insert(name, Arc::new(cmds));
        }

        for (name, cmds) in mission.missions.iter() {
            for child in cmds.iter().filter_map(Command::group_name) {
                if !mission.has_mission(child) {
                    return Err(MissionError::MissingMission(child.to_string()));
                }
            }

            if mission.is_recursive(name)? {
                let child = cmds
                    .iter()
                    .filter_map(Command::group_name)
                    .find(|c| *c == name.as_str() || mission.contains(c, name).unwrap_or(false))
                    .unwrap_or(name.as_str());

                return Err(MissionError::RecursiveMission {
                    parent: name.to_string(),
                    child: child.to_string(),
                });
            }
        }

        Ok(mission)
    }
}

impl From<Mission> for MissionDoc {
    fn from(mission: Mission) -> Self {
        Self {
            reference: mission.reference,
            missions: mission
                .missions
                .into_iter()
                .map(|(name, cmds)| (name, Arc::try_unwrap(cmds).unwrap_or_else(|c| (*c).clone())))
                .collect(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn wp(n: f64) -> Command {
        Command::waypoint(n, n, 10.0)
    }

    /// Main = [wp0, Group(A), wp3], A = [wp1, Group(B)], B = [wp2]
    fn nested() -> Mission {
        let mut mission = Mission::default();
        mission
            .missions
            .insert(MAIN.into(), Arc::new(vec![wp(0.0), Command::group("A"), wp(3.0)]));
        mission
            .missions
            .insert("A".into(), Arc::new(vec![wp(1.0), Command::group("B")]));
        mission.missions.insert("B".into(), Arc::new(vec![wp(2.0)]));
        mission
    }

    #[test]
    fn test_reserved() {
        let mission = Mission::default();

        let names: Vec<&str> = mission.get_missions().collect();
        assert_eq!(names, vec![GEOFENCE, MAIN, MARKERS]);
        assert_eq!(mission.get(MAIN), Ok(&[][..]));
        assert_eq!(
            mission.get("Nope"),
            Err(MissionError::MissingMission("Nope".into()))
        );
    }

    #[test]
    fn test_flatten() -> Result<(), MissionError> {
        let mission = nested();

        let flat = mission.flatten(MAIN)?;
        assert_eq!(flat, vec![wp(0.0), wp(1.0), wp(2.0), wp(3.0)]);
        assert_eq!(mission.flat_len(MAIN)?, 4);
        assert_eq!(mission.flat_len("A")?, 2);

        Ok(())
    }

    #[test]
    fn test_find_nth_position() -> Result<(), MissionError> {
        let mission = nested();

        assert_eq!(mission.find_nth_position(MAIN, 0)?, Some((MAIN.into(), 0)));
        assert_eq!(mission.find_nth_position(MAIN, 1)?, Some(("A".into(), 0)));
        assert_eq!(mission.find_nth_position(MAIN, 2)?, Some(("B".into(), 0)));
        assert_eq!(mission.find_nth_position(MAIN, 3)?, Some((MAIN.into(), 2)));
        assert_eq!(mission.find_nth_position(MAIN, 4)?, None);

        // Every flat index maps back to the same command
        let flat = mission.flatten(MAIN)?;
        for (n, cmd) in flat.iter().enumerate() {
            let (name, index) = mission.find_nth_position(MAIN, n)?.unwrap();
            assert_eq!(&mission.get(&name)?[index], cmd);
        }

        Ok(())
    }

    #[test]
    fn test_contains() -> Result<(), MissionError> {
        let mission = nested();

        assert!(mission.contains(MAIN, "A")?);
        assert!(mission.contains(MAIN, "B")?);
        assert!(mission.contains("A", "B")?);
        assert!(!mission.contains("B", "A")?);
        assert!(!mission.is_recursive(MAIN)?);

        Ok(())
    }

    #[test]
    fn test_serde() {
        let mission = nested();

        let json = serde_json::to_string(&mission).unwrap();
        let back: Mission = serde_json::from_str(&json).unwrap();
        assert_eq!(mission, back);

        // Reserved collections are filled in when missing
        let partial: Mission = serde_json::from_str(
            r#"{"reference": {"lat_deg": 51.0, "lng_deg": -1.0}, "missions": {}}"#,
        )
        .unwrap();
        assert_eq!(partial.reference(), &LatLng::new(51.0, -1.0));
        assert!(partial.has_mission(MAIN));
    }

    #[test]
    fn test_load_checks_groups() {
        let doc = |missions: Vec<(&str, Vec<Command>)>| MissionDoc {
            reference: LatLng::default(),
            missions: missions
                .into_iter()
                .map(|(name, cmds)| (name.to_string(), cmds))
                .collect(),
        };

        let cycle = doc(vec![
            (MAIN, vec![Command::group("A")]),
            ("A", vec![wp(1.0), Command::group(MAIN)]),
        ]);
        assert_eq!(
            Mission::try_from(cycle),
            Err(MissionError::RecursiveMission {
                parent: "A".into(),
                child: MAIN.into()
            })
        );

        let own = doc(vec![("B", vec![Command::group("B")])]);
        assert_eq!(
            Mission::try_from(own),
            Err(MissionError::RecursiveMission {
                parent: "B".into(),
                child: "B".into()
            })
        );

        let dangling = doc(vec![(MAIN, vec![Command::group("Nope")])]);
        assert_eq!(
            Mission::try_from(dangling),
            Err(MissionError::MissingMission("Nope".into()))
        );

        let fine = doc(vec![(MAIN, vec![Command::group("A")]), ("A", vec![wp(1.0)])]);
        assert!(Mission::try_from(fine).is_ok());
    }
}
