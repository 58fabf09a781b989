//! Compass points used by quadrant bearings and latitude/longitude.

use serde::Serialize;

use super::{AngleUnit, UAngle};

/// One of the four cardinal directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CardinalDirection {
    North,
    East,
    South,
    West,
}

impl CardinalDirection {
    /// Bearing of this direction from north, clockwise.
    pub fn angle(self) -> UAngle {
        let degrees = match self {
            Self::North => 0.0,
            Self::East => 90.0,
            Self::South => 180.0,
            Self::West => 270.0,
        };
        UAngle::new(degrees, AngleUnit::Degrees)
    }

    /// Whether this is north or south.
    pub fn is_meridional(self) -> bool {
        matches!(self, Self::North | Self::South)
    }

    /// Bearing reached by turning `rotation` from this direction toward `to`.
    ///
    /// `to` must be perpendicular to `self` (`N45E`, `S30W`, `E10N`, ...).
    /// The result is in `rotation`'s unit, normalized to one turn.
    pub fn quadrant(self, rotation: UAngle, to: CardinalDirection) -> UAngle {
        let unit = rotation.unit;
        let base = self.angle().get(unit);
        let full_turn = UAngle::new(360.0, AngleUnit::Degrees).get(unit);
        let clockwise = (to.angle().value - self.angle().value).rem_euclid(360.0) == 90.0;
        let value = if clockwise {
            base + rotation.value
        } else {
            base - rotation.value
        };
        UAngle::new(value.rem_euclid(full_turn), unit)
    }
}
