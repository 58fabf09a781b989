//! Numeric readings: lengths, angles and variance overrides.

use std::collections::HashMap;

use crate::error::{Result, WallsError};
use crate::line::LineParser;
use crate::unit::{AngleUnit, CardinalDirection, LengthUnit, UAngle, ULength};

use super::parser::WallsParser;
use super::tables::{
    AZM_UNIT_SUFFIXES, CARDINAL_DIRECTIONS, EAST_WEST, INC_UNIT_SUFFIXES, LENGTH_UNIT_SUFFIXES,
    NORTH_SOUTH, NUMBER_TOKEN,
};
use super::variance::VarianceOverride;

impl WallsParser {
    /// `[0-9]+(.[0-9]*)?` or `.[0-9]+`.
    pub fn unsigned_double_literal(&mut self) -> Result<f64> {
        let token = self.expect_regex(&NUMBER_TOKEN, "<NUMBER>")?;
        token
            .value()
            .parse::<f64>()
            .map_err(|_| WallsError::invalid_number(token))
    }

    /// Consume a leading `+` or `-`; true if the value is negated.
    fn sign(&mut self) -> bool {
        match self.peek_char() {
            Some('-') => {
                self.advance(1);
                true
            }
            Some('+') => {
                self.advance(1);
                false
            }
            _ => false,
        }
    }

    /// An optional unit suffix letter.
    ///
    /// With `strict`, any other letter right after the number is rejected
    /// instead of being left for the next production.
    fn unit_suffix<U: Copy>(&mut self, suffixes: &HashMap<char, U>, default: U, strict: bool) -> Result<U> {
        match self.peek_char() {
            Some(c) if suffixes.contains_key(&c) => Ok(self.one_of_map_or(suffixes, default)),
            Some(c) if strict && c.is_ascii_alphabetic() => Err(WallsError::UnknownUnit {
                unit: c,
                segment: self.here(),
            }),
            _ => Ok(default),
        }
    }

    /// `i` followed by a number of inches.
    pub fn unsigned_length_inches(&mut self) -> Result<ULength> {
        self.expect_char_ignore_case('i')?;
        let inches = self.unsigned_double_literal()?;
        Ok(ULength::new(inches, LengthUnit::Inches))
    }

    /// A number with an optional `m`/`f` suffix, or feet-and-inches `5i6`.
    pub fn unsigned_length_non_inches(&mut self, default_unit: LengthUnit) -> Result<ULength> {
        let value = self.unsigned_double_literal()?;
        let unit = self.unit_suffix(&LENGTH_UNIT_SUFFIXES, default_unit, true)?;
        if unit == LengthUnit::Inches {
            let inches = self.maybe(|p| p.unsigned_double_literal()).unwrap_or(0.0);
            return Ok(ULength::new(value * 12.0 + inches, LengthUnit::Inches));
        }
        Ok(ULength::new(value, unit))
    }

    pub fn unsigned_length(&mut self, default_unit: LengthUnit) -> Result<ULength> {
        self.one_of(&[
            &|p: &mut Self| p.unsigned_length_non_inches(default_unit),
            &|p: &mut Self| p.unsigned_length_inches(),
        ])
    }

    /// A signed length.
    pub fn length(&mut self, default_unit: LengthUnit) -> Result<ULength> {
        let negative = self.sign();
        let length = self.unsigned_length(default_unit)?;
        Ok(if negative { length.negate() } else { length })
    }

    /// A number with an optional unit suffix, or a `D:M:S` angle.
    pub fn unsigned_angle(
        &mut self,
        suffixes: &HashMap<char, AngleUnit>,
        default_unit: AngleUnit,
    ) -> Result<UAngle> {
        self.unsigned_angle_with(suffixes, default_unit, true)
    }

    fn unsigned_angle_with(
        &mut self,
        suffixes: &HashMap<char, AngleUnit>,
        default_unit: AngleUnit,
        strict: bool,
    ) -> Result<UAngle> {
        let start = self.index();
        let dms = self.maybe(|p| {
            p.maybe(|p| p.unsigned_double_literal());
            p.expect_char(':')
        });
        if dms.is_some() {
            self.set_index(start);
            return self.unsigned_dms_angle();
        }
        let value = self.unsigned_double_literal()?;
        let unit = self.unit_suffix(suffixes, default_unit, strict)?;
        Ok(UAngle::new(value, unit))
    }

    /// `D[:M[:S]]` in degrees; any part may be left empty.
    pub fn unsigned_dms_angle(&mut self) -> Result<UAngle> {
        let start = self.index();
        let degrees = self.maybe(|p| p.unsigned_double_literal());
        let mut minutes = None;
        let mut seconds = None;
        if self.maybe(|p| p.expect_char(':')).is_some() {
            minutes = self.dms_component("minutes")?;
            if self.maybe(|p| p.expect_char(':')).is_some() {
                seconds = self.dms_component("seconds")?;
            }
        }
        if degrees.is_none() && minutes.is_none() && seconds.is_none() {
            self.set_index(start);
            return self.fail(&["<NUMBER>"]);
        }
        let value = degrees.unwrap_or(0.0)
            + minutes.unwrap_or(0.0) / 60.0
            + seconds.unwrap_or(0.0) / 3600.0;
        Ok(UAngle::new(value, AngleUnit::Degrees))
    }

    fn dms_component(&mut self, component: &'static str) -> Result<Option<f64>> {
        let start = self.index();
        let Some(value) = self.maybe(|p| p.unsigned_double_literal()) else {
            return Ok(None);
        };
        if value >= 60.0 {
            return Err(WallsError::InvalidDmsComponent {
                component,
                value,
                segment: self.since(start),
            });
        }
        Ok(Some(value))
    }

    /// `N`/`S` and a DMS angle; south is negative.
    pub fn latitude(&mut self) -> Result<UAngle> {
        let hemisphere = self.one_of_map(&NORTH_SOUTH)?;
        let start = self.index();
        let angle = self.unsigned_dms_angle()?;
        if angle.get(AngleUnit::Degrees) > 90.0 {
            return Err(WallsError::out_of_range("latitude", self.since(start)));
        }
        Ok(if hemisphere == CardinalDirection::South {
            angle.negate()
        } else {
            angle
        })
    }

    /// `E`/`W` and a DMS angle; west is negative.
    pub fn longitude(&mut self) -> Result<UAngle> {
        let hemisphere = self.one_of_map(&EAST_WEST)?;
        let start = self.index();
        let angle = self.unsigned_dms_angle()?;
        if angle.get(AngleUnit::Degrees) > 180.0 {
            return Err(WallsError::out_of_range("longitude", self.since(start)));
        }
        Ok(if hemisphere == CardinalDirection::West {
            angle.negate()
        } else {
            angle
        })
    }

    pub fn non_quadrant_azimuth(&mut self, default_unit: AngleUnit) -> Result<UAngle> {
        let start = self.index();
        let azimuth = self.unsigned_angle(&AZM_UNIT_SUFFIXES, default_unit)?;
        if azimuth.get(AngleUnit::Degrees) >= 360.0 {
            return Err(WallsError::out_of_range("azimuth", self.since(start)));
        }
        Ok(azimuth)
    }

    /// A bearing such as `N30E`, or a bare cardinal letter.
    pub fn quadrant_azimuth(&mut self, default_unit: AngleUnit) -> Result<UAngle> {
        let from = self.one_of_map(&CARDINAL_DIRECTIONS)?;
        let start = self.index();
        let Some(angle) = self.maybe(|p| p.unsigned_angle_with(&AZM_UNIT_SUFFIXES, default_unit, false))
        else {
            return Ok(from.angle().in_unit(default_unit));
        };
        if angle.get(AngleUnit::Degrees) > 90.0 {
            return Err(WallsError::out_of_range("quadrant angle", self.since(start)));
        }
        let to = if from.is_meridional() {
            self.one_of_map(&EAST_WEST)?
        } else {
            self.one_of_map(&NORTH_SOUTH)?
        };
        Ok(from.quadrant(angle, to))
    }

    pub fn azimuth(&mut self, default_unit: AngleUnit) -> Result<UAngle> {
        self.one_of(&[
            &|p: &mut Self| p.quadrant_azimuth(default_unit),
            &|p: &mut Self| p.non_quadrant_azimuth(default_unit),
        ])
    }

    /// A signed azimuth correction such as a declination.
    pub fn azimuth_offset(&mut self, default_unit: AngleUnit) -> Result<UAngle> {
        let negative = self.sign();
        let angle = self.unsigned_angle(&AZM_UNIT_SUFFIXES, default_unit)?;
        Ok(if negative { angle.negate() } else { angle })
    }

    pub fn unsigned_inclination(&mut self, default_unit: AngleUnit) -> Result<UAngle> {
        let start = self.index();
        let angle = self.unsigned_angle(&INC_UNIT_SUFFIXES, default_unit)?;
        if angle.get(AngleUnit::Degrees) > 90.0 {
            return Err(WallsError::out_of_range("inclination", self.since(start)));
        }
        Ok(angle)
    }

    pub fn inclination(&mut self, default_unit: AngleUnit) -> Result<UAngle> {
        let negative = self.sign();
        let angle = self.unsigned_inclination(default_unit)?;
        Ok(if negative { angle.negate() } else { angle })
    }

    // ============ Variance Overrides ============

    /// `?`: the vector floats entirely.
    pub fn floated_vector_variance_override(&mut self) -> Result<VarianceOverride> {
        self.expect_char('?')?;
        Ok(VarianceOverride::Floated)
    }

    /// `*`: the traverse floats.
    pub fn floated_traverse_variance_override(&mut self) -> Result<VarianceOverride> {
        self.expect_char('*')?;
        Ok(VarianceOverride::FloatedTraverse)
    }

    pub fn length_variance_override(&mut self, default_unit: LengthUnit) -> Result<VarianceOverride> {
        Ok(VarianceOverride::LengthOverride(self.unsigned_length(default_unit)?))
    }

    /// `R` followed by an RMS error length.
    pub fn rms_error_variance_override(&mut self, default_unit: LengthUnit) -> Result<VarianceOverride> {
        self.expect_char_ignore_case('r')?;
        Ok(VarianceOverride::RmsError(self.unsigned_length(default_unit)?))
    }

    pub fn variance_override(&mut self, default_unit: LengthUnit) -> Option<VarianceOverride> {
        self.maybe(|p| {
            p.one_of(&[
                &|p: &mut Self| p.floated_vector_variance_override(),
                &|p: &mut Self| p.floated_traverse_variance_override(),
                &|p: &mut Self| p.length_variance_override(default_unit),
                &|p: &mut Self| p.rms_error_variance_override(default_unit),
            ])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::Segment;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn parser_on(text: &str) -> WallsParser {
        let mut parser = WallsParser::new();
        parser.begin_line(Segment::new(text, None, 0, 0));
        parser
    }

    #[test]
    fn test_unsigned_length_suffixes() {
        let mut p = parser_on("12.3f");
        assert_eq!(
            p.unsigned_length(LengthUnit::Meters).unwrap(),
            ULength::new(12.3, LengthUnit::Feet)
        );
        let mut p = parser_on("5");
        assert_eq!(
            p.unsigned_length(LengthUnit::Feet).unwrap(),
            ULength::new(5.0, LengthUnit::Feet)
        );
        let mut p = parser_on("4M");
        assert_eq!(p.unsigned_length(LengthUnit::Feet).unwrap().unit, LengthUnit::Meters);
    }

    #[test]
    fn test_feet_and_inches() {
        let mut p = parser_on("5i6");
        assert_eq!(
            p.unsigned_length(LengthUnit::Meters).unwrap(),
            ULength::new(66.0, LengthUnit::Inches)
        );
        let mut p = parser_on("i8");
        assert_eq!(
            p.unsigned_length(LengthUnit::Meters).unwrap(),
            ULength::new(8.0, LengthUnit::Inches)
        );
        let mut p = parser_on("2i");
        assert_eq!(
            p.unsigned_length(LengthUnit::Meters).unwrap(),
            ULength::new(24.0, LengthUnit::Inches)
        );
    }

    #[test]
    fn test_length_errors() {
        let mut p = parser_on("1.2.3");
        assert!(matches!(
            p.unsigned_length(LengthUnit::Meters),
            Err(WallsError::InvalidNumber { .. })
        ));
        let mut p = parser_on("10x");
        assert!(matches!(
            p.unsigned_length(LengthUnit::Meters),
            Err(WallsError::UnknownUnit { unit: 'x', .. })
        ));
        let mut p = parser_on("-3f");
        assert_eq!(
            p.length(LengthUnit::Meters).unwrap(),
            ULength::new(-3.0, LengthUnit::Feet)
        );
    }

    #[test]
    fn test_dms_angles() {
        let mut p = parser_on("10:30:00");
        assert_relative_eq!(p.unsigned_dms_angle().unwrap().value, 10.5);
        let mut p = parser_on(":30");
        assert_relative_eq!(p.unsigned_dms_angle().unwrap().value, 0.5);
        let mut p = parser_on("10::36");
        assert_relative_eq!(p.unsigned_dms_angle().unwrap().value, 10.01, epsilon = 1e-9);

        let mut p = parser_on("10:60:00");
        match p.unsigned_dms_angle() {
            Err(WallsError::InvalidDmsComponent { component, value, .. }) => {
                assert_eq!(component, "minutes");
                assert_relative_eq!(value, 60.0);
            }
            other => panic!("unexpected result {:?}", other),
        }
        let mut p = parser_on("10:0:61");
        assert!(matches!(
            p.unsigned_dms_angle(),
            Err(WallsError::InvalidDmsComponent { component: "seconds", .. })
        ));
    }

    #[test]
    fn test_azimuths() {
        let mut p = parser_on("N30E");
        assert_relative_eq!(p.azimuth(AngleUnit::Degrees).unwrap().get(AngleUnit::Degrees), 30.0);
        let mut p = parser_on("s45w");
        assert_relative_eq!(p.azimuth(AngleUnit::Degrees).unwrap().get(AngleUnit::Degrees), 225.0);
        let mut p = parser_on("W");
        assert_relative_eq!(p.azimuth(AngleUnit::Degrees).unwrap().get(AngleUnit::Degrees), 270.0);
        let mut p = parser_on("200g");
        assert_eq!(
            p.azimuth(AngleUnit::Degrees).unwrap(),
            UAngle::new(200.0, AngleUnit::Gradians)
        );
        let mut p = parser_on("350:30");
        assert_relative_eq!(p.azimuth(AngleUnit::Degrees).unwrap().value, 350.5);
    }

    #[test]
    fn test_azimuth_range() {
        let mut p = parser_on("360");
        assert!(matches!(
            p.azimuth(AngleUnit::Degrees),
            Err(WallsError::ValueOutOfRange { what: "azimuth", .. })
        ));
        let mut p = parser_on("N91E");
        assert!(matches!(
            p.azimuth(AngleUnit::Degrees),
            Err(WallsError::ValueOutOfRange { what: "quadrant angle", .. })
        ));
    }

    #[test]
    fn test_inclinations() {
        let mut p = parser_on("-8p");
        assert_eq!(
            p.inclination(AngleUnit::Degrees).unwrap(),
            UAngle::new(-8.0, AngleUnit::PercentGrade)
        );
        let mut p = parser_on("+12");
        assert_eq!(
            p.inclination(AngleUnit::Degrees).unwrap(),
            UAngle::new(12.0, AngleUnit::Degrees)
        );
        let mut p = parser_on("91");
        assert!(matches!(
            p.inclination(AngleUnit::Degrees),
            Err(WallsError::ValueOutOfRange { what: "inclination", .. })
        ));
        let mut p = parser_on("45x");
        assert!(matches!(
            p.inclination(AngleUnit::Degrees),
            Err(WallsError::UnknownUnit { unit: 'x', .. })
        ));
    }

    #[test]
    fn test_latitude_longitude() {
        let mut p = parser_on("S31:15");
        assert_relative_eq!(p.latitude().unwrap().value, -31.25);
        let mut p = parser_on("W97:43:48");
        assert_relative_eq!(p.longitude().unwrap().value, -97.73, epsilon = 1e-9);
        let mut p = parser_on("N91");
        assert!(p.latitude().is_err());
    }

    #[test]
    fn test_variance_override_tokens() {
        let mut p = parser_on("?");
        assert_eq!(p.variance_override(LengthUnit::Meters), Some(VarianceOverride::Floated));
        let mut p = parser_on("*");
        assert_eq!(
            p.variance_override(LengthUnit::Meters),
            Some(VarianceOverride::FloatedTraverse)
        );
        let mut p = parser_on("R2.5f");
        assert_eq!(
            p.variance_override(LengthUnit::Meters),
            Some(VarianceOverride::RmsError(ULength::new(2.5, LengthUnit::Feet)))
        );
        let mut p = parser_on("3m");
        assert_eq!(
            p.variance_override(LengthUnit::Feet),
            Some(VarianceOverride::LengthOverride(ULength::new(3.0, LengthUnit::Meters)))
        );
        let mut p = parser_on(")");
        assert_eq!(p.variance_override(LengthUnit::Meters), None);
        assert_eq!(p.index(), 0);
    }

    proptest! {
        #[test]
        fn prop_length_display_round_trips(
            value in 0.0f64..10_000.0,
            unit in prop_oneof![
                Just(LengthUnit::Meters),
                Just(LengthUnit::Feet),
                Just(LengthUnit::Inches),
            ],
        ) {
            let length = ULength::new(value, unit);
            let mut p = parser_on(&length.to_string());
            let parsed = p.unsigned_length(LengthUnit::Meters).unwrap();
            prop_assert!(p.is_at_end());
            prop_assert_eq!(parsed.unit, unit);
            prop_assert!((parsed.value - value).abs() <= 1e-9 * value.max(1.0));
        }
    }
}
