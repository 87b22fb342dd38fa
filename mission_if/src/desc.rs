//! # Command descriptions
//!
//! Each dialect provides a table of [`CommandDescription`]s, one per command type. The mission
//! tree only needs to know whether a command is a destination, all other dialect semantics are
//! left to the dialect layer. Lookups go through the [`Dialect`] trait so that the behaviour is
//! injected rather than hard-coded into the tree.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;
use serde::{Deserialize, Serialize};

use crate::cmd::{
    BuiltinKind, Command, PARAM_ALTITUDE, PARAM_HEADING, PARAM_INSTANCE, PARAM_LATITUDE,
    PARAM_LONGITUDE, PARAM_PASSBY, PARAM_PWM, PARAM_RADIUS, PARAM_TUNABLE,
};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Provides command descriptions for a particular dialect.
pub trait Dialect {
    /// Get the description of the command with the given type tag.
    fn describe(&self, tag: &str) -> Option<&CommandDescription>;

    /// True if the command is a destination which carries a location.
    ///
    /// Commands without a description are never destinations.
    fn is_destination(&self, cmd: &Command) -> bool {
        self.describe(cmd.type_tag())
            .map(|d| d.is_destination)
            .unwrap_or(false)
            && cmd.has_location()
    }
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Describes a single command type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDescription {
    /// The type tag, matching [`Command::type_tag`]
    pub tag: String,

    /// The dialect's numeric value for this command
    pub value: u32,

    /// Human readable label
    pub label: String,

    /// The parameters exposed by the command
    #[serde(default)]
    pub parameters: Vec<ParamDescription>,

    /// True if the command has a location
    #[serde(default)]
    pub has_location: bool,

    /// True if the command is somewhere the vehicle travels to
    #[serde(default)]
    pub is_destination: bool,
}

/// Describes a single parameter of a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDescription {
    pub name: String,

    #[serde(default)]
    pub label: String,

    pub kind: ParamKind,

    #[serde(default)]
    pub min: Option<f64>,

    #[serde(default)]
    pub max: Option<f64>,
}

/// A table of command descriptions.
///
/// When loaded from a file each entry is a `[[command]]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptionTable {
    #[serde(rename = "command", default)]
    commands: Vec<CommandDescription>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Number,
    Text,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl ParamDescription {
    pub fn number(name: &str, min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            name: name.to_string(),
            label: name.to_string(),
            kind: ParamKind::Number,
            min,
            max,
        }
    }
}

impl DescriptionTable {
    /// Create a table describing only the builtin commands.
    pub fn builtin() -> Self {
        let location = || {
            vec![
                ParamDescription::number(PARAM_LATITUDE, Some(-90.0), Some(90.0)),
                ParamDescription::number(PARAM_LONGITUDE, Some(-180.0), Some(180.0)),
                ParamDescription::number(PARAM_ALTITUDE, None, None),
            ]
        };

        let commands = BuiltinKind::ALL
            .iter()
            .map(|kind| {
                let (value, label, parameters, destination) = match kind {
                    BuiltinKind::Waypoint => (16, "Waypoint", location(), true),
                    BuiltinKind::Takeoff => (22, "Takeoff", location(), true),
                    BuiltinKind::Land => (21, "Land", location(), true),
                    BuiltinKind::SetServo => (
                        183,
                        "Set Servo",
                        vec![
                            ParamDescription::number(PARAM_INSTANCE, Some(0.0), None),
                            ParamDescription::number(PARAM_PWM, Some(0.0), None),
                        ],
                        false,
                    ),
                    BuiltinKind::DubinsPath => {
                        let mut params = location();
                        params.push(ParamDescription::number(
                            PARAM_HEADING,
                            Some(0.0),
                            Some(360.0),
                        ));
                        params.push(ParamDescription::number(PARAM_RADIUS, Some(0.0), None));
                        params.push(ParamDescription::number(PARAM_PASSBY, Some(0.0), None));
                        params.push(ParamDescription::number(
                            PARAM_TUNABLE,
                            Some(0.0),
                            Some(1.0),
                        ));
                        (0, "Dubins Path", params, true)
                    }
                };

                CommandDescription {
                    tag: kind.tag().to_string(),
                    value,
                    label: label.to_string(),
                    parameters,
                    has_location: destination,
                    is_destination: destination,
                }
            })
            .collect();

        Self { commands }
    }

    /// Add a description, replacing any existing description with the same tag.
    pub fn with(mut self, desc: CommandDescription) -> Self {
        if self.describe(&desc.tag).is_some() {
            debug!("Replacing the description of {}", desc.tag);
        }
        self.commands.retain(|d| d.tag != desc.tag);
        self.commands.push(desc);
        self
    }

    /// Merge another table into this one, the other table's descriptions taking precedence.
    pub fn merge(self, other: DescriptionTable) -> Self {
        other.commands.into_iter().fold(self, |table, desc| table.with(desc))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDescription> {
        self.commands.iter()
    }
}

impl Dialect for DescriptionTable {
    fn describe(&self, tag: &str) -> Option<&CommandDescription> {
        self.commands.iter().find(|d| d.tag == tag)
    }
}
