//! Folds a flattened collection into its mainline: the destinations, each carrying the
//! non-destination commands which follow it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;
use mission_if::{Command, Dialect};
use serde::Serialize;

use super::{Mission, MissionError};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A destination in the mainline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MainLineItem {
    /// The destination command
    pub cmd: Command,

    /// Index of the destination in the flattened collection
    pub id: usize,

    /// Non-destination commands following the destination, in order
    pub other: Vec<Command>,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Mission {
    /// Get the mainline of the named collection.
    ///
    /// Non-destination commands before the first destination belong to no item and are dropped.
    pub fn main_line<D>(&self, name: &str, dialect: &D) -> Result<Vec<MainLineItem>, MissionError>
    where
        D: Dialect + ?Sized,
    {
        let flat = self.flatten(name)?;
        let mut items: Vec<MainLineItem> = Vec::new();
        let mut dropped = 0;

        for (id, cmd) in flat.into_iter().enumerate() {
            if dialect.is_destination(&cmd) {
                items.push(MainLineItem {
                    cmd,
                    id,
                    other: Vec::new(),
                });
            } else {
                match items.last_mut() {
                    Some(item) => item.other.push(cmd),
                    None => dropped += 1,
                }
            }
        }

        if dropped > 0 {
            debug!(
                "Dropped {} commands before the first destination of \"{}\"",
                dropped, name
            );
        }

        Ok(items)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mission::MAIN;
    use mission_if::{CommandDescription, DescriptionTable, ParamValue, Params};

    #[test]
    fn test_main_line() -> Result<(), MissionError> {
        let servo = Command::set_servo(1, 1500);
        let mission = Mission::default()
            .add_sub_mission("A", vec![Command::waypoint(1.0, 1.0, 10.0), servo.clone()])?
            .set(
                MAIN,
                vec![
                    servo.clone(),
                    Command::takeoff(0.0, 0.0, 10.0),
                    servo.clone(),
                    Command::group("A"),
                    Command::land(2.0, 2.0, 0.0),
                ],
            );

        let line = mission.main_line(MAIN, &DescriptionTable::builtin())?;

        assert_eq!(line.len(), 3);
        assert_eq!(line[0].cmd, Command::takeoff(0.0, 0.0, 10.0));
        assert_eq!(line[0].id, 1);
        assert_eq!(line[0].other, vec![servo.clone()]);

        assert_eq!(line[1].id, 3);
        assert_eq!(line[1].other, vec![servo]);

        assert_eq!(line[2].id, 5);
        assert!(line[2].other.is_empty());

        Ok(())
    }

    #[test]
    fn test_dialect_destinations() -> Result<(), MissionError> {
        let mut loiter = CommandDescription {
            tag: "LoiterTurns".into(),
            value: 18,
            label: "Loiter turns".into(),
            parameters: vec![],
            has_location: true,
            is_destination: true,
        };
        let dialect = DescriptionTable::builtin().with(loiter.clone());

        let mut params = Params::new();
        params.insert("latitude".into(), ParamValue::Number(1.0));
        params.insert("longitude".into(), ParamValue::Number(1.0));
        params.insert("altitude".into(), ParamValue::Number(20.0));
        let located = Command::dialect("LoiterTurns", params);

        // Unknown commands and destinations without a location are never destinations
        let mission = Mission::default().set(
            MAIN,
            vec![
                Command::waypoint(0.0, 0.0, 10.0),
                located.clone(),
                Command::dialect("LoiterTurns", Params::new()),
                Command::dialect("Unknown", Params::new()),
            ],
        );

        let line = mission.main_line(MAIN, &dialect)?;
        assert_eq!(line.len(), 2);
        assert_eq!(line[1].cmd, located);
        assert_eq!(line[1].other.len(), 2);

        // Descriptions decide, not the command shape
        loiter.is_destination = false;
        let dialect = DescriptionTable::builtin().with(loiter);
        let line = mission.main_line(MAIN, &dialect)?;
        assert_eq!(line.len(), 1);
        assert_eq!(line[0].other.len(), 3);

        Ok(())
    }
}
