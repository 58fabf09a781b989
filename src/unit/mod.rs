//! Values tagged with units of measure.
//!
//! Survey readings are lengths or angles in whatever unit the data file
//! declares. [`UnitizedDouble`] keeps the number and its unit together;
//! the unit type parameter makes mixing a length with an angle a type
//! error. Conversions go through each unit family's base unit (meters,
//! degrees).

mod angle;
mod cardinal;
mod length;

pub use angle::AngleUnit;
pub use cardinal::CardinalDirection;
pub use length::LengthUnit;

use std::fmt;

use serde::Serialize;

/// A unit within one dimension (length or angle).
pub trait Unit: Copy + PartialEq + fmt::Debug {
    /// Convert `value` in this unit to the dimension's base unit.
    fn to_base(self, value: f64) -> f64;

    /// Convert `value` in the base unit to this unit.
    fn from_base(self, value: f64) -> f64;

    /// Render `value` in this unit the way a Walls file would write it.
    fn render(self, value: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

/// A number tagged with a unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnitizedDouble<U> {
    pub value: f64,
    pub unit: U,
}

/// A length reading.
pub type ULength = UnitizedDouble<LengthUnit>;

/// An angle reading.
pub type UAngle = UnitizedDouble<AngleUnit>;

impl<U: Unit> UnitizedDouble<U> {
    pub fn new(value: f64, unit: U) -> Self {
        Self { value, unit }
    }

    /// The same quantity expressed in `unit`.
    pub fn in_unit(self, unit: U) -> Self {
        if unit == self.unit {
            return self;
        }
        Self::new(unit.from_base(self.unit.to_base(self.value)), unit)
    }

    /// The numeric value in `unit`.
    pub fn get(self, unit: U) -> f64 {
        self.in_unit(unit).value
    }

    pub fn is_zero(self) -> bool {
        self.value == 0.0
    }

    /// Negate the value, keeping the unit.
    pub fn negate(self) -> Self {
        Self::new(-self.value, self.unit)
    }

    /// Add `other`, converted to this value's unit.
    pub fn add(self, other: Self) -> Self {
        Self::new(self.value + other.get(self.unit), self.unit)
    }
}

impl<U: Unit> fmt::Display for UnitizedDouble<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.unit.render(self.value, f)
    }
}
