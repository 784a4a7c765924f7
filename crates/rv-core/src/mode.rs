//! Leg modes carried by departure/arrival events.

use std::fmt;

/// Mode of the leg that a departure starts or an arrival ends.
///
/// MATSim writes `car` and `transit_walk` for the modes the visualizer draws
/// differently; any other value is kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LegMode {
    Car,
    TransitWalk,
    Other(String),
}

impl LegMode {
    pub fn from_value(value: &str) -> Self {
        match value {
            "car" => LegMode::Car,
            "transit_walk" => LegMode::TransitWalk,
            other => LegMode::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LegMode::Car => "car",
            LegMode::TransitWalk => "transit_walk",
            LegMode::Other(s) => s,
        }
    }
}

impl fmt::Display for LegMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
