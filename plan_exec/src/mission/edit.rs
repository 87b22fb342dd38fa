//! Copy-on-write edits of a [`Mission`].
//!
//! Each edit clones the mission, which only clones the shared pointers to its collections, and
//! then copies the collections it actually changes. Failed edits return an error before anything
//! is changed so the original mission is always left as it was.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    collections::{BTreeSet, HashSet},
    sync::Arc,
};

use log::trace;
use mission_if::{Command, LatLng};

use super::{Mission, MissionError, RESERVED};

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Mission {
    /// Replace the named collection wholesale, creating it if it doesn't exist.
    ///
    /// The new list is not checked for recursion.
    pub fn set(&self, name: &str, list: Vec<Command>) -> Mission {
        trace!("Setting \"{}\" to {} commands", name, list.len());

        let mut next = self.clone();
        next.missions.insert(name.to_string(), Arc::new(list));
        next
    }

    /// Move the reference point of the mission.
    pub fn with_reference(&self, reference: LatLng) -> Mission {
        let mut next = self.clone();
        next.reference = reference;
        next
    }

    /// Append a command to the named collection.
    pub fn push_to_mission(&self, name: &str, cmd: Command) -> Result<Mission, MissionError> {
        self.get(name)?;
        self.check_group(name, &cmd)?;

        trace!("Pushing {} to \"{}\"", cmd.type_tag(), name);

        let mut next = self.clone();
        next.list_mut(name)?.push(cmd);
        Ok(next)
    }

    /// Create a new collection.
    pub fn add_sub_mission(&self, name: &str, list: Vec<Command>) -> Result<Mission, MissionError> {
        if self.has_mission(name) {
            return Err(MissionError::DuplicateMission(name.to_string()));
        }

        // A dangling group elsewhere may already reference the new name
        for cmd in list.iter() {
            self.check_group(name, cmd)?;
        }

        trace!("Adding sub-mission \"{}\"", name);

        Ok(self.set(name, list))
    }

    /// Delete a collection and every group which references it.
    pub fn remove_sub_mission(&self, name: &str) -> Result<Mission, MissionError> {
        if RESERVED.contains(&name) {
            return Err(MissionError::ReservedMission(name.to_string()));
        }
        self.get(name)?;

        trace!("Removing sub-mission \"{}\"", name);

        let mut next = self.clone();
        next.missions.remove(name);

        for list in next.missions.values_mut() {
            if list.iter().any(|c| c.group_name() == Some(name)) {
                Arc::make_mut(list).retain(|c| c.group_name() != Some(name));
            }
        }

        Ok(next)
    }

    /// Insert a command at the given flat index of the named collection.
    ///
    /// The command lands in whichever collection holds the command currently at that flat
    /// index, just before it. An index at or past the end of the flattened collection appends to
    /// the named collection.
    pub fn insert(&self, index: usize, name: &str, cmd: Command) -> Result<Mission, MissionError> {
        let (host, local) = match self.find_nth_position(name, index)? {
            Some(pos) => pos,
            None => (name.to_string(), self.get(name)?.len()),
        };

        self.check_group(&host, &cmd)?;

        trace!(
            "Inserting {} at flat index {} of \"{}\" (\"{}\"[{}])",
            cmd.type_tag(),
            index,
            name,
            host,
            local
        );

        let mut next = self.clone();
        next.list_mut(&host)?.insert(local, cmd);
        Ok(next)
    }

    /// Remove a command from the named collection, the last one if no index is given.
    pub fn pop(
        &self,
        name: &str,
        index: Option<usize>,
    ) -> Result<(Mission, Command), MissionError> {
        let len = self.get(name)?.len();
        let index = match index {
            Some(i) => i,
            None => len.saturating_sub(1),
        };
        self.check_index(name, index, len)?;

        let mut next = self.clone();
        let cmd = next.list_mut(name)?.remove(index);

        trace!("Popped {} from \"{}\"[{}]", cmd.type_tag(), name, index);

        Ok((next, cmd))
    }

    /// Apply `f` to the command at the given local index.
    ///
    /// If the command is a group and `recurse` is set `f` is instead applied to every command in
    /// the referenced collection, and in turn to the collections it references.
    pub fn change_param<F>(
        &self,
        index: usize,
        name: &str,
        f: F,
        recurse: bool,
    ) -> Result<Mission, MissionError>
    where
        F: FnMut(&mut Command),
    {
        self.change_many_params(&[index], name, f, recurse)
    }

    /// Batched form of [`Mission::change_param`].
    pub fn change_many_params<F>(
        &self,
        indices: &[usize],
        name: &str,
        mut f: F,
        recurse: bool,
    ) -> Result<Mission, MissionError>
    where
        F: FnMut(&mut Command),
    {
        let len = self.get(name)?.len();
        for &index in indices {
            self.check_index(name, index, len)?;
        }

        // Split the indices into local changes and groups to expand
        let mut local = BTreeSet::new();
        let mut expand = Vec::new();
        for &index in indices {
            match self.get(name)?[index].group_name() {
                Some(child) if recurse => expand.push(child.to_string()),
                _ => {
                    local.insert(index);
                }
            }
        }

        // Every collection reachable from the expanded groups, each visited once
        let mut reached = Vec::new();
        let mut visited = HashSet::new();
        while let Some(current) = expand.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            for child in self.get(&current)?.iter().filter_map(Command::group_name) {
                expand.push(child.to_string());
            }
            reached.push(current);
        }

        trace!(
            "Changing {} commands in \"{}\" and {} nested sub-missions",
            local.len(),
            name,
            reached.len()
        );

        let mut next = self.clone();

        if !local.is_empty() {
            let list = next.list_mut(name)?;
            for index in local {
                f(&mut list[index]);
            }
        }

        for sub in reached {
            for cmd in next.list_mut(&sub)?.iter_mut().filter(|c| !c.is_group()) {
                f(cmd);
            }
        }

        Ok(next)
    }

    /// Mutable access to a collection, copying it first if it is shared.
    fn list_mut(&mut self, name: &str) -> Result<&mut Vec<Command>, MissionError> {
        self.missions
            .get_mut(name)
            .map(Arc::make_mut)
            .ok_or_else(|| MissionError::MissingMission(name.to_string()))
    }

    /// Fails if adding `cmd` to `host` would let `host` reach itself through groups.
    fn check_group(&self, host: &str, cmd: &Command) -> Result<(), MissionError> {
        let child = match cmd.group_name() {
            Some(c) => c,
            None => return Ok(()),
        };

        let recursive = child == host || {
            self.get(child)?;
            self.contains(child, host)?
        };

        if recursive {
            return Err(MissionError::RecursiveMission {
                parent: host.to_string(),
                child: child.to_string(),
            });
        }

        Ok(())
    }

    fn check_index(&self, name: &str, index: usize, len: usize) -> Result<(), MissionError> {
        if index >= len {
            Err(MissionError::IndexOutOfRange {
                name: name.to_string(),
                index,
                len,
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mission::MAIN;
    use mission_if::cmd::PARAM_ALTITUDE;

    fn wp(n: f64) -> Command {
        Command::waypoint(n, n, 10.0)
    }

    fn altitude(cmd: &Command) -> f64 {
        cmd.number(PARAM_ALTITUDE).unwrap()
    }

    #[test]
    fn test_end_to_end_example() -> Result<(), MissionError> {
        let mission = Mission::default().set(MAIN, vec![Command::waypoint(0.0, 0.0, 10.0)]);
        let mission = mission.add_sub_mission("Takeoff", vec![])?;
        let mission = mission.insert(0, MAIN, Command::group("Takeoff"))?;

        let main = mission.get(MAIN)?;
        assert_eq!(main.len(), 2);
        assert_eq!(main[0], Command::group("Takeoff"));

        assert_eq!(mission.flatten(MAIN)?.len(), 1);
        assert_eq!(mission.find_nth_position(MAIN, 0)?, Some((MAIN.into(), 1)));

        Ok(())
    }

    #[test]
    fn test_recursion_guard() -> Result<(), MissionError> {
        let mission = Mission::default()
            .add_sub_mission("A", vec![wp(1.0)])?
            .add_sub_mission("B", vec![wp(2.0), Command::group("A")])?;

        // Self reference
        assert_eq!(
            mission.push_to_mission("A", Command::group("A")),
            Err(MissionError::RecursiveMission {
                parent: "A".into(),
                child: "A".into()
            })
        );

        // B already contains A
        assert_eq!(
            mission.push_to_mission("A", Command::group("B")),
            Err(MissionError::RecursiveMission {
                parent: "A".into(),
                child: "B".into()
            })
        );

        // Transitively through Main
        let mission = mission.push_to_mission(MAIN, Command::group("B"))?;
        assert!(matches!(
            mission.push_to_mission("A", Command::group(MAIN)),
            Err(MissionError::RecursiveMission { .. })
        ));

        // Insert goes through the same guard, against the collection actually receiving the group
        assert!(matches!(
            mission.insert(1, MAIN, Command::group(MAIN)),
            Err(MissionError::RecursiveMission { .. })
        ));

        // A new collection grouping itself doesn't exist yet, but is still recursive
        assert_eq!(
            mission.add_sub_mission("C", vec![wp(3.0), Command::group("C")]),
            Err(MissionError::RecursiveMission {
                parent: "C".into(),
                child: "C".into()
            })
        );

        assert_eq!(mission.get("A")?, &[wp(1.0)]);
        assert_eq!(mission.get("B")?, &[wp(2.0), Command::group("A")]);
        assert!(!mission.is_recursive(MAIN)?);
        assert!(!mission.has_mission("C"));

        // Groups must point at something
        assert_eq!(
            mission.push_to_mission(MAIN, Command::group("Nope")),
            Err(MissionError::MissingMission("Nope".into()))
        );

        Ok(())
    }

    #[test]
    fn test_add_remove_sub_mission() -> Result<(), MissionError> {
        let mission = Mission::default()
            .add_sub_mission("A", vec![wp(1.0)])?
            .push_to_mission(MAIN, Command::group("A"))?
            .push_to_mission(MAIN, wp(2.0))?
            .push_to_mission(MAIN, Command::group("A"))?;

        assert_eq!(
            mission.add_sub_mission("A", vec![]),
            Err(MissionError::DuplicateMission("A".into()))
        );
        assert_eq!(
            mission.remove_sub_mission(MAIN),
            Err(MissionError::ReservedMission(MAIN.into()))
        );

        let removed = mission.remove_sub_mission("A")?;
        assert!(!removed.has_mission("A"));
        assert_eq!(removed.get(MAIN)?, &[wp(2.0)]);

        // Original untouched
        assert_eq!(mission.get(MAIN)?.len(), 3);

        Ok(())
    }

    #[test]
    fn test_insert_nested() -> Result<(), MissionError> {
        let mission = Mission::default()
            .add_sub_mission("A", vec![wp(1.0), wp(2.0)])?
            .set(MAIN, vec![wp(0.0), Command::group("A"), wp(3.0)]);

        // Flat index 2 is A[1]
        let inserted = mission.insert(2, MAIN, wp(9.0))?;
        assert_eq!(inserted.get("A")?, &[wp(1.0), wp(9.0), wp(2.0)]);
        assert_eq!(inserted.get(MAIN)?.len(), 3);

        // Past the end appends to the named collection
        let appended = mission.insert(100, MAIN, wp(9.0))?;
        assert_eq!(appended.get(MAIN)?.last(), Some(&wp(9.0)));
        assert_eq!(appended.get("A")?.len(), 2);

        Ok(())
    }

    #[test]
    fn test_pop() -> Result<(), MissionError> {
        let mission = Mission::default().set(MAIN, vec![wp(0.0), wp(1.0), wp(2.0)]);

        let (popped, cmd) = mission.pop(MAIN, None)?;
        assert_eq!(cmd, wp(2.0));
        assert_eq!(popped.get(MAIN)?.len(), 2);

        let (popped, cmd) = mission.pop(MAIN, Some(0))?;
        assert_eq!(cmd, wp(0.0));
        assert_eq!(popped.get(MAIN)?, &[wp(1.0), wp(2.0)]);

        assert_eq!(
            mission.pop(MAIN, Some(3)).map(|(_, c)| c),
            Err(MissionError::IndexOutOfRange {
                name: MAIN.into(),
                index: 3,
                len: 3
            })
        );
        assert!(Mission::default().pop(MAIN, None).is_err());

        Ok(())
    }

    #[test]
    fn test_change_param() -> Result<(), MissionError> {
        let mission = Mission::default()
            .add_sub_mission("B", vec![wp(2.0)])?
            .add_sub_mission("A", vec![wp(1.0), Command::group("B")])?
            .set(MAIN, vec![wp(0.0), Command::group("A"), wp(3.0)]);

        let raise = |c: &mut Command| {
            c.set_param(PARAM_ALTITUDE, 50.0);
        };

        let changed = mission.change_param(0, MAIN, raise, false)?;
        assert_eq!(altitude(&changed.get(MAIN)?[0]), 50.0);
        assert_eq!(altitude(&changed.get(MAIN)?[2]), 10.0);

        // Recursing through the group changes everything below it, but not the group itself
        let changed = mission.change_param(1, MAIN, raise, true)?;
        assert_eq!(changed.get(MAIN)?[1], Command::group("A"));
        assert_eq!(altitude(&changed.get("A")?[0]), 50.0);
        assert_eq!(altitude(&changed.get("B")?[0]), 50.0);
        assert_eq!(altitude(&changed.get(MAIN)?[0]), 10.0);

        let changed = mission.change_many_params(&[0, 2], MAIN, raise, false)?;
        let alts: Vec<f64> = changed.flatten(MAIN)?.iter().map(altitude).collect();
        assert_eq!(alts, vec![50.0, 10.0, 10.0, 50.0]);

        assert!(matches!(
            mission.change_param(3, MAIN, raise, false),
            Err(MissionError::IndexOutOfRange { .. })
        ));

        // Nothing leaked back into the original
        let alts: Vec<f64> = mission.flatten(MAIN)?.iter().map(altitude).collect();
        assert_eq!(alts, vec![10.0; 4]);

        Ok(())
    }

    #[test]
    fn test_clone_isolation() -> Result<(), MissionError> {
        let original = Mission::default()
            .add_sub_mission("A", vec![wp(1.0)])?
            .set(MAIN, vec![wp(0.0)]);

        let edited = original.push_to_mission(MAIN, wp(5.0))?;

        assert_eq!(original.get(MAIN)?, &[wp(0.0)]);
        assert_eq!(edited.get(MAIN)?, &[wp(0.0), wp(5.0)]);

        // Untouched collections are shared, touched ones are not
        assert!(Arc::ptr_eq(&original.missions["A"], &edited.missions["A"]));
        assert!(!Arc::ptr_eq(&original.missions[MAIN], &edited.missions[MAIN]));

        let moved = original.with_reference(LatLng::new(1.0, 2.0));
        assert_eq!(original.reference(), &LatLng::default());
        assert_eq!(moved.reference(), &LatLng::new(1.0, 2.0));

        Ok(())
    }
}
