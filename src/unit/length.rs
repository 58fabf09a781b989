//! Length units.

use std::fmt;

use serde::Serialize;

use super::Unit;

const METERS_PER_FOOT: f64 = 0.3048;
const METERS_PER_INCH: f64 = METERS_PER_FOOT / 12.0;

/// Units a distance can be recorded in. The base unit is meters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Meters,
    Feet,
    Inches,
}

impl LengthUnit {
    /// The suffix letter that marks a number as being in this unit.
    pub fn suffix(self) -> char {
        match self {
            Self::Meters => 'm',
            Self::Feet => 'f',
            Self::Inches => 'i',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Meters => "meters",
            Self::Feet => "feet",
            Self::Inches => "inches",
        }
    }
}

impl Unit for LengthUnit {
    fn to_base(self, value: f64) -> f64 {
        match self {
            Self::Meters => value,
            Self::Feet => value * METERS_PER_FOOT,
            Self::Inches => value * METERS_PER_INCH,
        }
    }

    fn from_base(self, value: f64) -> f64 {
        match self {
            Self::Meters => value,
            Self::Feet => value / METERS_PER_FOOT,
            Self::Inches => value / METERS_PER_INCH,
        }
    }

    fn render(self, value: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Walls writes inches as `i<inches>`; `<feet>i<inches>` is the
            // compound form, so the suffix can't trail the number.
            Self::Inches if value < 0.0 => write!(f, "-i{}", -value),
            Self::Inches => write!(f, "i{}", value),
            _ => write!(f, "{}{}", value, self.suffix()),
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
