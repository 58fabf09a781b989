//! Data lines: shots between two stations, and LRUD-only station lines.

use crate::error::Result;
use crate::line::LineParser;
use crate::unit::ULength;

use super::parser::WallsParser;
use super::tables::OMITTED;
use super::types::{Lrud, Vector, WallsEvent};
use super::units::{CtElement, LrudElement, RectElement, VectorType};
use super::variance::VarianceOverride;

impl WallsParser {
    /// A data line: `from to measurements...` or `station <lruds>`.
    pub(super) fn vector_line(&mut self) -> Result<()> {
        let from = self.station_name()?;
        self.one_of(&[
            &|p: &mut Self| p.lrud_line(&from),
            &|p: &mut Self| p.shot_line(&from),
        ])
    }

    fn lrud_line(&mut self, station: &str) -> Result<()> {
        self.whitespace()?;
        let lruds = self.lruds()?;
        let comment = self.inline_comment_or_end_of_line()?;
        self.emit(WallsEvent::Lruds {
            station: station.to_string(),
            lruds,
        });
        if let Some(comment) = comment {
            self.emit(WallsEvent::Comment { comment });
        }
        Ok(())
    }

    fn shot_line(&mut self, from: &str) -> Result<()> {
        self.whitespace()?;
        let to = self.station_name()?;
        let mut vector = Vector::new(self.line().clone(), from.to_string(), to, &self.units);
        match self.units.vector_type {
            VectorType::Ct => self.compass_measurements(&mut vector)?,
            VectorType::Rect => self.rect_measurements(&mut vector)?,
        }
        self.after_measurements(&mut vector)?;
        self.emit(WallsEvent::Vector(Box::new(vector)));
        Ok(())
    }

    /// `--` (or more dashes) for a reading that was not taken, else `production`.
    pub fn optional<T, F>(&mut self, production: F) -> Result<Option<T>>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        if self.maybe(|p| p.expect_regex(&OMITTED, "--")).is_some() {
            return Ok(None);
        }
        production(self).map(Some)
    }

    // ============ Compass and Tape ============

    /// Distance, azimuth and inclination in the configured order.
    ///
    /// A trailing inclination may be left off entirely.
    pub fn compass_measurements(&mut self, vector: &mut Vector) -> Result<()> {
        let order = self.units.ct_order.clone();
        for (n, element) in order.iter().enumerate() {
            let trailing_inclination = *element == CtElement::V && n + 1 == order.len();
            if trailing_inclination {
                if self.maybe(|p| p.whitespace().and_then(|_| p.peek_measurement())).is_none() {
                    return Ok(());
                }
            } else {
                self.whitespace()?;
            }
            match element {
                CtElement::D => vector.distance = Some(self.distance()?),
                CtElement::A => self.azimuth_readings(vector)?,
                CtElement::V => self.inclination_readings(vector)?,
            }
        }
        self.instrument_and_target_heights(vector);
        Ok(())
    }

    /// Succeeds without consuming if a reading (rather than LRUDs, a
    /// variance, a directive or a comment) starts here.
    fn peek_measurement(&mut self) -> Result<()> {
        match self.peek_char() {
            None | Some('<' | '*' | '(' | '#' | ';') => self.fail(&["<MEASUREMENT>"]),
            Some(_) => Ok(()),
        }
    }

    fn distance(&mut self) -> Result<ULength> {
        let d_unit = self.units.d_unit;
        self.unsigned_length(d_unit)
    }

    /// `fs[/bs]`, either reading may be `--`; the frontsight may be
    /// dropped before `/`, but a `/` must be followed by a backsight.
    pub fn azimuth_readings(&mut self, vector: &mut Vector) -> Result<()> {
        let (a_unit, ab_unit) = (self.units.a_unit, self.units.ab_unit);
        if self.peek_char() != Some('/') {
            vector.frontsight_azimuth = self.optional(|p| p.azimuth(a_unit))?;
        }
        if self.maybe(|p| p.expect_char('/')).is_some() {
            vector.backsight_azimuth = self.optional(|p| p.azimuth(ab_unit))?;
        }
        Ok(())
    }

    /// `fs[/bs]`, either reading may be `--`; the frontsight may be
    /// dropped before `/`, but a `/` must be followed by a backsight.
    pub fn inclination_readings(&mut self, vector: &mut Vector) -> Result<()> {
        let (v_unit, vb_unit) = (self.units.v_unit, self.units.vb_unit);
        if self.peek_char() != Some('/') {
            vector.frontsight_inclination = self.optional(|p| p.inclination(v_unit))?;
        }
        if self.maybe(|p| p.expect_char('/')).is_some() {
            vector.backsight_inclination = self.optional(|p| p.inclination(vb_unit))?;
        }
        Ok(())
    }

    fn instrument_and_target_heights(&mut self, vector: &mut Vector) {
        let s_unit = self.units.s_unit;
        vector.instrument_height = self.maybe(|p| {
            p.whitespace()?;
            p.length(s_unit)
        });
        if vector.instrument_height.is_some() {
            vector.target_height = self.maybe(|p| {
                p.whitespace()?;
                p.length(s_unit)
            });
        }
    }

    // ============ Rectangular ============

    /// East, north and up offsets in the configured order; a trailing up
    /// offset may be left off.
    pub fn rect_measurements(&mut self, vector: &mut Vector) -> Result<()> {
        let order = self.units.rect_order.clone();
        let d_unit = self.units.d_unit;
        for (n, element) in order.iter().enumerate() {
            let value = if *element == RectElement::U && n + 1 == order.len() {
                match self.maybe(|p| {
                    p.whitespace()?;
                    p.length(d_unit)
                }) {
                    Some(value) => value,
                    None => return Ok(()),
                }
            } else {
                self.whitespace()?;
                self.length(d_unit)?
            };
            match element {
                RectElement::E => vector.east = Some(value),
                RectElement::N => vector.north = Some(value),
                RectElement::U => vector.up = Some(value),
            }
        }
        Ok(())
    }

    // ============ After the Measurements ============

    fn after_measurements(&mut self, vector: &mut Vector) -> Result<()> {
        self.maybe_whitespace();
        if self.peek_char() == Some('(') {
            let (horizontal, vertical) = self.variance_overrides()?;
            vector.horizontal_variance = horizontal;
            vector.vertical_variance = vertical;
            self.maybe_whitespace();
        }
        if matches!(self.peek_char(), Some('<' | '*')) {
            vector.lruds = Some(self.lruds()?);
            self.maybe_whitespace();
        }
        if self.peek_char() == Some('#') {
            vector.segment = self.inline_segment()?;
        }
        vector.comment = self.inline_comment_or_end_of_line()?;
        Ok(())
    }

    /// `(h,v)` or `(hv)`; a single override applies to both components.
    pub fn variance_overrides(&mut self) -> Result<(Option<VarianceOverride>, Option<VarianceOverride>)> {
        let d_unit = self.units.d_unit;
        self.expect_char('(')?;
        self.maybe_whitespace();
        let horizontal = self.variance_override(d_unit);
        self.maybe_whitespace();
        let overrides = if self.maybe(|p| p.expect_char(',')).is_some() {
            self.maybe_whitespace();
            let vertical = self.variance_override(d_unit);
            (horizontal, vertical)
        } else if horizontal.is_some() {
            (horizontal, horizontal)
        } else {
            return self.fail(&["?", "*", "R", "<LENGTH>", ","]);
        };
        self.maybe_whitespace();
        self.expect_char(')')?;
        Ok(overrides)
    }

    /// `<l r u d [azimuth] [C]>` or the same between `*`s.
    ///
    /// Values are read in the configured LRUD order; any may be `--`.
    pub fn lruds(&mut self) -> Result<Lrud> {
        let close = match self.one_of(&[
            &|p: &mut Self| p.expect_char('<'),
            &|p: &mut Self| p.expect_char('*'),
        ])? {
            '<' => '>',
            _ => '*',
        };
        let s_unit = self.units.s_unit;
        let a_unit = self.units.a_unit;
        let mut lrud = Lrud::default();
        self.maybe_whitespace();
        for (n, element) in self.units.lrud_order.clone().into_iter().enumerate() {
            if n > 0 {
                self.lrud_separator()?;
            }
            let value = self.optional(|p| p.unsigned_length(s_unit))?;
            match element {
                LrudElement::L => lrud.left = value,
                LrudElement::R => lrud.right = value,
                LrudElement::U => lrud.up = value,
                LrudElement::D => lrud.down = value,
            }
        }
        lrud.facing_azimuth = self.maybe(|p| {
            p.lrud_separator()?;
            p.azimuth(a_unit)
        });
        lrud.c_flag = self
            .maybe(|p| {
                p.lrud_separator()?;
                p.expect_char_ignore_case('c')
            })
            .is_some();
        self.maybe_whitespace();
        self.expect_char(close)?;
        Ok(lrud)
    }

    fn lrud_separator(&mut self) -> Result<()> {
        let start = self.index();
        self.maybe_whitespace();
        if self.maybe(|p| p.expect_char(',')).is_some() {
            self.maybe_whitespace();
        }
        if self.index() == start {
            return self.fail(&["<WHITESPACE>", ","]);
        }
        Ok(())
    }

    /// A `#SEGMENT` at the end of a data line; applies to that line only.
    pub fn inline_segment(&mut self) -> Result<Vec<String>> {
        self.expect_char('#')?;
        self.one_of_words(&[("segment", ()), ("seg", ()), ("s", ())])?;
        let path = self.segment_directive()?;
        Ok(self.units.resolve_segment(path.value()))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::WallsError;
    use crate::unit::{AngleUnit, LengthUnit, UAngle, ULength};
    use crate::walls::types::{Vector, WallsEvent};
    use crate::walls::variance::VarianceOverride;
    use crate::walls::visitor::EventCollector;
    use crate::walls::WallsParser;

    fn parse(text: &str) -> (EventCollector, Vec<WallsError>) {
        let mut parser = WallsParser::new();
        let mut events = EventCollector::new();
        let errors = parser.parse_text(text, &mut events);
        (events, errors)
    }

    fn only_vector(text: &str) -> Vector {
        let (events, errors) = parse(text);
        assert!(errors.is_empty(), "{:?}", errors);
        let vectors: Vec<_> = events.vectors().cloned().collect();
        assert_eq!(vectors.len(), 1, "{:?}", events.events);
        vectors.into_iter().next().unwrap()
    }

    fn meters(value: f64) -> Option<ULength> {
        Some(ULength::new(value, LengthUnit::Meters))
    }

    fn degrees(value: f64) -> Option<UAngle> {
        Some(UAngle::new(value, AngleUnit::Degrees))
    }

    #[test]
    fn test_simple_shot() {
        let vector = only_vector("A1 A2 10.5 45 -5");
        assert_eq!(vector.from, "A1");
        assert_eq!(vector.to, "A2");
        assert_eq!(vector.distance, meters(10.5));
        assert_eq!(vector.frontsight_azimuth, degrees(45.0));
        assert_eq!(vector.frontsight_inclination, degrees(-5.0));
        assert_eq!(vector.backsight_azimuth, None);
    }

    #[test]
    fn test_backsights_and_omitted_readings() {
        let vector = only_vector("A1 A2 10 N45E/225 --/+4");
        assert_eq!(vector.frontsight_azimuth, degrees(45.0));
        assert_eq!(vector.backsight_azimuth, degrees(225.0));
        assert_eq!(vector.frontsight_inclination, None);
        assert_eq!(vector.backsight_inclination, degrees(4.0));

        let vector = only_vector("A1 A2 10 /225");
        assert_eq!(vector.frontsight_azimuth, None);
        assert_eq!(vector.backsight_azimuth, degrees(225.0));
        assert_eq!(vector.frontsight_inclination, None);

        let (events, errors) = parse("A1 A2 10 45/ 0");
        assert_eq!(errors.len(), 1, "{:?}", errors);
        assert!(events.vectors().next().is_none());
    }

    #[test]
    fn test_instrument_and_target_heights() {
        let vector = only_vector("A1 A2 10 45 -5 1.5 1.2");
        assert_eq!(vector.instrument_height, meters(1.5));
        assert_eq!(vector.target_height, meters(1.2));
    }

    #[test]
    fn test_custom_order_and_units() {
        let (events, errors) = parse("#units feet order=AVD a=grads\nB1 B2 100 -10 25");
        assert!(errors.is_empty(), "{:?}", errors);
        let vector = events.vectors().next().cloned().unwrap();
        assert_eq!(vector.frontsight_azimuth, Some(UAngle::new(100.0, AngleUnit::Gradians)));
        assert_eq!(vector.frontsight_inclination, degrees(-10.0));
        assert_eq!(vector.distance, Some(ULength::new(25.0, LengthUnit::Feet)));
        assert_eq!(vector.units.a_unit, AngleUnit::Gradians);
    }

    #[test]
    fn test_rect_vectors() {
        let (events, errors) = parse("#units rect order=NEU\nA1 A2 -3 4 5\nA2 A3 1 2");
        assert!(errors.is_empty(), "{:?}", errors);
        let vectors: Vec<_> = events.vectors().collect();
        assert_eq!(vectors[0].north, meters(-3.0));
        assert_eq!(vectors[0].east, meters(4.0));
        assert_eq!(vectors[0].up, meters(5.0));
        assert_eq!(vectors[1].up, None);
        assert_eq!(vectors[0].distance, None);
    }

    #[test]
    fn test_variance_overrides() {
        let vector = only_vector("A1 A2 10 45 0 (?)");
        assert_eq!(vector.horizontal_variance, Some(VarianceOverride::Floated));
        assert_eq!(vector.vertical_variance, Some(VarianceOverride::Floated));

        let vector = only_vector("A1 A2 10 45 0 (R2f, *)");
        assert_eq!(
            vector.horizontal_variance,
            Some(VarianceOverride::RmsError(ULength::new(2.0, LengthUnit::Feet)))
        );
        assert_eq!(vector.vertical_variance, Some(VarianceOverride::FloatedTraverse));

        let vector = only_vector("A1 A2 10 45 0 (,3)");
        assert_eq!(vector.horizontal_variance, None);
        assert_eq!(
            vector.vertical_variance,
            Some(VarianceOverride::LengthOverride(ULength::new(3.0, LengthUnit::Meters)))
        );

        let (_, errors) = parse("A1 A2 10 45 0 ()");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_lruds_on_shot() {
        let vector = only_vector("A1 A2 10 45 0 <1,2.5,--,4 N30E c> ; big room");
        let lruds = vector.lruds.unwrap();
        assert_eq!(lruds.left, meters(1.0));
        assert_eq!(lruds.right, meters(2.5));
        assert_eq!(lruds.up, None);
        assert_eq!(lruds.down, meters(4.0));
        assert_eq!(lruds.facing_azimuth, degrees(30.0));
        assert!(lruds.c_flag);
        assert_eq!(vector.comment.as_deref(), Some(" big room"));
    }

    #[test]
    fn test_lruds_without_inclination() {
        let vector = only_vector("A1 A2 10 45 *1 2 3 4*");
        assert_eq!(vector.frontsight_inclination, None);
        assert_eq!(vector.lruds.unwrap().down, meters(4.0));
    }

    #[test]
    fn test_lrud_only_line() {
        let (events, errors) = parse("#units lrud=from:UDLR\nA1 <1 2 3 4>");
        assert!(errors.is_empty(), "{:?}", errors);
        match events.events.last() {
            Some(WallsEvent::Lruds { station, lruds }) => {
                assert_eq!(station, "A1");
                assert_eq!(lruds.up, meters(1.0));
                assert_eq!(lruds.right, meters(4.0));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_inline_segment_applies_to_one_vector() {
        let (events, errors) = parse("#SEG /cave\nA1 A2 10 45 0 #s side ;c\nA2 A3 10 45 0");
        assert!(errors.is_empty(), "{:?}", errors);
        let vectors: Vec<_> = events.vectors().collect();
        assert_eq!(vectors[0].segment, vec!["cave", "side"]);
        assert_eq!(vectors[0].comment.as_deref(), Some("c"));
        assert_eq!(vectors[1].segment, vec!["cave"]);
    }

    #[test]
    fn test_prefixed_station_names() {
        let (events, errors) = parse("#prefix cave\nA1 X:B2 10 45 0");
        assert!(errors.is_empty(), "{:?}", errors);
        let vector = events.vectors().next().unwrap();
        assert_eq!(vector.from, "cave:A1");
        assert_eq!(vector.to, "X:B2");
    }

    #[test]
    fn test_malformed_vectors() {
        let (events, errors) = parse("A1 A2 ten 45 0\nA1 A2 10 400 0\nA1 A2 10 45 0 extra");
        assert_eq!(errors.len(), 3, "{:?}", errors);
        assert!(events.vectors().next().is_none());
        assert!(matches!(errors[1], WallsError::ValueOutOfRange { .. }));
        assert_eq!(errors[2].segment().map(|s| s.start()), Some(14));
    }

    #[test]
    fn test_macro_in_vector() {
        let (events, errors) = parse("#units $s=A\n$(s)1 $(s)2 10 45 0");
        assert!(errors.is_empty(), "{:?}", errors);
        let vector = events.vectors().next().unwrap();
        assert_eq!((vector.from.as_str(), vector.to.as_str()), ("A1", "A2"));
    }
}
