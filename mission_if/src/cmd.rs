//! # Mission commands
//!
//! A [`Command`] is either one of the fixed builtin navigation/action commands, a dialect-specific
//! command identified only by its type tag, or a [`Command::Group`] which references another
//! named collection of commands in the mission.
//!
//! Parameters are kept as a name to value mapping rather than fixed fields since dialect commands
//! vary in which parameters they expose. Position parameters are conventionally named, see the
//! `PARAM_*` constants.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geo::LatLng;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Latitude in degrees
pub const PARAM_LATITUDE: &str = "latitude";

/// Longitude in degrees
pub const PARAM_LONGITUDE: &str = "longitude";

/// Altitude in meters
pub const PARAM_ALTITUDE: &str = "altitude";

/// Heading in degrees, clockwise from north
pub const PARAM_HEADING: &str = "heading";

/// Turn radius in meters
pub const PARAM_RADIUS: &str = "radius";

/// Pass-by radius in meters
pub const PARAM_PASSBY: &str = "passbyRadius";

/// Non-zero if the heading and radius may be optimised
pub const PARAM_TUNABLE: &str = "tunable";

/// Servo output instance
pub const PARAM_INSTANCE: &str = "instance";

/// Servo PWM value in microseconds
pub const PARAM_PWM: &str = "pwm";

/// Type tag used for group commands
pub const GROUP_TAG: &str = "Group";

// ------------------------------------------------------------------------------------------------
// TYPES
// ------------------------------------------------------------------------------------------------

/// A mapping from parameter name to value.
pub type Params = BTreeMap<String, ParamValue>;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A single mission command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    /// One of the builtin commands.
    Builtin { kind: BuiltinKind, params: Params },

    /// A command only understood by a particular dialect, identified by its type tag.
    Dialect { tag: String, params: Params },

    /// A reference to another named collection of commands.
    ///
    /// The referenced collection is not owned by the group, it lives independently in the
    /// mission.
    Group { name: String },
}

/// The builtin command kinds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuiltinKind {
    Waypoint,
    Takeoff,
    Land,
    SetServo,
    DubinsPath,
}

/// A parameter value, either numeric or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

/// Errors which can occur when reading parameters from a command.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("Command {0} has no parameter named \"{1}\"")]
    Missing(String, String),

    #[error("Parameter \"{1}\" of command {0} is not numeric")]
    NotNumeric(String, String),

    #[error("Group commands do not have parameters")]
    GroupHasNoParams,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl BuiltinKind {
    /// All builtin kinds, in the order they are described.
    pub const ALL: [BuiltinKind; 5] = [
        BuiltinKind::Waypoint,
        BuiltinKind::Takeoff,
        BuiltinKind::Land,
        BuiltinKind::SetServo,
        BuiltinKind::DubinsPath,
    ];

    /// The type tag of this kind, used to look up its description.
    pub fn tag(&self) -> &'static str {
        match self {
            BuiltinKind::Waypoint => "Waypoint",
            BuiltinKind::Takeoff => "Takeoff",
            BuiltinKind::Land => "Land",
            BuiltinKind::SetServo => "SetServo",
            BuiltinKind::DubinsPath => "DubinsPath",
        }
    }
}

impl Command {
    /// A waypoint at the given position.
    pub fn waypoint(lat_deg: f64, lng_deg: f64, alt_m: f64) -> Self {
        Self::located(BuiltinKind::Waypoint, lat_deg, lng_deg, alt_m)
    }

    /// A takeoff to the given position.
    pub fn takeoff(lat_deg: f64, lng_deg: f64, alt_m: f64) -> Self {
        Self::located(BuiltinKind::Takeoff, lat_deg, lng_deg, alt_m)
    }

    /// A landing at the given position.
    pub fn land(lat_deg: f64, lng_deg: f64, alt_m: f64) -> Self {
        Self::located(BuiltinKind::Land, lat_deg, lng_deg, alt_m)
    }

    /// Set a servo output to the given PWM value.
    pub fn set_servo(instance: u32, pwm_us: u32) -> Self {
        let mut params = Params::new();
        params.insert(PARAM_INSTANCE.into(), ParamValue::from(instance as f64));
        params.insert(PARAM_PWM.into(), ParamValue::from(pwm_us as f64));

        Command::Builtin {
            kind: BuiltinKind::SetServo,
            params,
        }
    }

    /// A Dubins path marker, planned through with the given heading and turn radius.
    #[allow(clippy::too_many_arguments)]
    pub fn dubins(
        lat_deg: f64,
        lng_deg: f64,
        alt_m: f64,
        heading_deg: f64,
        radius_m: f64,
        passby_m: f64,
        tunable: bool,
    ) -> Self {
        let mut cmd = Self::located(BuiltinKind::DubinsPath, lat_deg, lng_deg, alt_m);
        cmd.set_param(PARAM_HEADING, heading_deg);
        cmd.set_param(PARAM_RADIUS, radius_m);
        cmd.set_param(PARAM_PASSBY, passby_m);
        cmd.set_param(PARAM_TUNABLE, tunable);
        cmd
    }

    /// A group referencing the named collection.
    pub fn group<S: Into<String>>(name: S) -> Self {
        Command::Group { name: name.into() }
    }

    /// A dialect command with the given type tag and parameters.
    pub fn dialect<S: Into<String>>(tag: S, params: Params) -> Self {
        Command::Dialect {
            tag: tag.into(),
            params,
        }
    }

    fn located(kind: BuiltinKind, lat_deg: f64, lng_deg: f64, alt_m: f64) -> Self {
        let mut params = Params::new();
        params.insert(PARAM_LATITUDE.into(), ParamValue::from(lat_deg));
        params.insert(PARAM_LONGITUDE.into(), ParamValue::from(lng_deg));
        params.insert(PARAM_ALTITUDE.into(), ParamValue::from(alt_m));

        Command::Builtin { kind, params }
    }

    /// The type tag of this command.
    pub fn type_tag(&self) -> &str {
        match self {
            Command::Builtin { kind, .. } => kind.tag(),
            Command::Dialect { tag, .. } => tag,
            Command::Group { .. } => GROUP_TAG,
        }
    }

    /// The name of the referenced collection if this is a group.
    pub fn group_name(&self) -> Option<&str> {
        match self {
            Command::Group { name } => Some(name),
            _ => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Command::Group { .. })
    }

    /// True if this command is a Dubins path marker.
    pub fn is_dubins(&self) -> bool {
        matches!(
            self,
            Command::Builtin {
                kind: BuiltinKind::DubinsPath,
                ..
            }
        )
    }

    pub fn params(&self) -> Option<&Params> {
        match self {
            Command::Builtin { params, .. } | Command::Dialect { params, .. } => Some(params),
            Command::Group { .. } => None,
        }
    }

    pub fn params_mut(&mut self) -> Option<&mut Params> {
        match self {
            Command::Builtin { params, .. } | Command::Dialect { params, .. } => Some(params),
            Command::Group { .. } => None,
        }
    }

    /// Get a numeric parameter by name.
    pub fn number(&self, name: &str) -> Result<f64, ParamError> {
        let params = self.params().ok_or(ParamError::GroupHasNoParams)?;

        match params.get(name) {
            Some(value) => value.as_f64().ok_or_else(|| {
                ParamError::NotNumeric(self.type_tag().to_string(), name.to_string())
            }),
            None => Err(ParamError::Missing(
                self.type_tag().to_string(),
                name.to_string(),
            )),
        }
    }

    /// Set a parameter, returning false if this command cannot carry parameters (is a group).
    pub fn set_param<V: Into<ParamValue>>(&mut self, name: &str, value: V) -> bool {
        match self.params_mut() {
            Some(params) => {
                params.insert(name.to_string(), value.into());
                true
            }
            None => false,
        }
    }

    /// True if the command carries numeric latitude, longitude and altitude parameters.
    pub fn has_location(&self) -> bool {
        [PARAM_LATITUDE, PARAM_LONGITUDE, PARAM_ALTITUDE]
            .iter()
            .all(|p| self.number(p).is_ok())
    }

    /// The geodetic position of the command.
    pub fn position(&self) -> Result<LatLng, ParamError> {
        Ok(LatLng::new(
            self.number(PARAM_LATITUDE)?,
            self.number(PARAM_LONGITUDE)?,
        ))
    }
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            ParamValue::Text(_) => None,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Number(if value { 1.0 } else { 0.0 })
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_params() {
        let mut wp = Command::waypoint(51.0, -1.0, 100.0);

        assert_eq!(wp.type_tag(), "Waypoint");
        assert!(wp.has_location());
        assert_eq!(wp.number(PARAM_ALTITUDE), Ok(100.0));
        assert_eq!(
            wp.number(PARAM_HEADING),
            Err(ParamError::Missing("Waypoint".into(), PARAM_HEADING.into()))
        );

        assert_eq!(wp.position(), Ok(LatLng::new(51.0, -1.0)));

        assert!(wp.set_param(PARAM_ALTITUDE, "high"));
        assert!(!wp.has_location());
        assert_eq!(
            wp.number(PARAM_ALTITUDE),
            Err(ParamError::NotNumeric("Waypoint".into(), PARAM_ALTITUDE.into()))
        );

        assert!(wp.set_param(PARAM_LONGITUDE, "west"));
        assert_eq!(
            wp.position(),
            Err(ParamError::NotNumeric("Waypoint".into(), PARAM_LONGITUDE.into()))
        );

        let mut group = Command::group("Takeoff");
        assert_eq!(group.group_name(), Some("Takeoff"));
        assert!(!group.set_param(PARAM_ALTITUDE, 10.0));
        assert_eq!(group.number(PARAM_ALTITUDE), Err(ParamError::GroupHasNoParams));
    }

    #[test]
    fn test_serde() {
        let cmds = vec![
            Command::dubins(1.0, 2.0, 3.0, 90.0, 50.0, 0.0, true),
            Command::group("Landing"),
            Command::dialect("DoJump", Params::new()),
        ];

        let json = serde_json::to_string(&cmds).unwrap();
        let back: Vec<Command> = serde_json::from_str(&json).unwrap();

        assert_eq!(cmds, back);
        assert!(back[0].is_dubins());
        assert_eq!(back[0].number(PARAM_TUNABLE), Ok(1.0));
    }
}
