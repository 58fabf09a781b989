//! Angle units.

use std::f64::consts::PI;
use std::fmt;

use serde::Serialize;

use super::Unit;

/// Units an azimuth or inclination can be recorded in. The base unit is degrees.
///
/// Percent grade is only meaningful for inclinations; it converts through
/// `atan` rather than a constant factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    Degrees,
    Radians,
    Gradians,
    /// 6400 per full circle
    Mils,
    PercentGrade,
}

impl AngleUnit {
    /// The suffix that marks a number as being in this unit.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Degrees => "d",
            Self::Radians => "rad",
            Self::Gradians => "g",
            Self::Mils => "m",
            Self::PercentGrade => "p",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Degrees => "degrees",
            Self::Radians => "radians",
            Self::Gradians => "grads",
            Self::Mils => "mils",
            Self::PercentGrade => "percent",
        }
    }
}

impl Unit for AngleUnit {
    fn to_base(self, value: f64) -> f64 {
        match self {
            Self::Degrees => value,
            Self::Radians => value.to_degrees(),
            Self::Gradians => value * 0.9,
            Self::Mils => value * 360.0 / 6400.0,
            Self::PercentGrade => (value / 100.0).atan().to_degrees(),
        }
    }

    fn from_base(self, value: f64) -> f64 {
        match self {
            Self::Degrees => value,
            Self::Radians => value * PI / 180.0,
            Self::Gradians => value / 0.9,
            Self::Mils => value * 6400.0 / 360.0,
            Self::PercentGrade => value.to_radians().tan() * 100.0,
        }
    }

    fn render(self, value: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", value, self.suffix())
    }
}

impl fmt::Display for AngleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
