//! `#UNITS` lines and their options.

use crate::error::{Result, WallsError};
use crate::line::{LineParser, Segment};
use crate::unit::LengthUnit;

use super::parser::WallsParser;
use super::tables::{
    AZM_UNITS, CASE_TYPES, CORRECTED_VALUES, CT_ELEMENTS, INC_UNITS, LENGTH_UNITS, LRUD_ELEMENTS,
    LRUD_TYPES, MACRO_NAME, RECT_ELEMENTS, REQUIRED_CT_ELEMENTS, REQUIRED_LRUD_ELEMENTS,
    REQUIRED_RECT_ELEMENTS, TAPING_METHODS,
};
use super::types::WallsEvent;
use super::units::{BacksightType, VectorType, WallsUnits};

type UnitsOption = fn(&mut WallsParser) -> Result<()>;

const UNITS_OPTIONS: &[(&str, UnitsOption)] = &[
    ("save", WallsParser::save),
    ("restore", WallsParser::restore),
    ("reset", WallsParser::reset),
    ("meters", WallsParser::meters),
    ("m", WallsParser::meters),
    ("feet", WallsParser::feet),
    ("f", WallsParser::feet),
    ("ct", WallsParser::ct),
    ("rect", WallsParser::rect),
    ("d", WallsParser::d),
    ("s", WallsParser::s),
    ("a", WallsParser::a),
    ("ab", WallsParser::ab),
    ("a/ab", WallsParser::a_ab),
    ("v", WallsParser::v),
    ("vb", WallsParser::vb),
    ("v/vb", WallsParser::v_vb),
    ("order", WallsParser::order),
    ("o", WallsParser::order),
    ("decl", WallsParser::decl),
    ("grid", WallsParser::grid),
    ("incd", WallsParser::incd),
    ("inch", WallsParser::inch),
    ("incs", WallsParser::incs),
    ("inca", WallsParser::inca),
    ("incab", WallsParser::incab),
    ("incv", WallsParser::incv),
    ("incvb", WallsParser::incvb),
    ("typeab", WallsParser::typeab),
    ("typevb", WallsParser::typevb),
    ("case", WallsParser::case),
    ("lrud", WallsParser::lrud),
    ("prefix", WallsParser::prefix1),
    ("prefix1", WallsParser::prefix1),
    ("prefix2", WallsParser::prefix2),
    ("prefix3", WallsParser::prefix3),
    ("tape", WallsParser::tape),
    ("uvh", WallsParser::uvh),
    ("uvv", WallsParser::uvv),
    ("uv", WallsParser::uv),
    ("flag", WallsParser::flag),
];

impl WallsParser {
    /// The options of a `#UNITS` line; the keyword has been read.
    pub fn units_line(&mut self) -> Result<()> {
        self.units_options()?;
        self.emit(WallsEvent::UnitsChanged {
            units: self.units.clone(),
        });
        self.end_of_directive()
    }

    /// Options separated by whitespace or commas, up to a comment or the
    /// end of the line.
    pub fn units_options(&mut self) -> Result<()> {
        let mut first = true;
        loop {
            let separated = self.option_separator();
            if self.is_at_end() || self.peek_char() == Some(';') {
                return Ok(());
            }
            if !first && !separated {
                return self.fail(&["<WHITESPACE>", ",", ";", "<END OF LINE>"]);
            }
            self.units_option()?;
            first = false;
        }
    }

    fn option_separator(&mut self) -> bool {
        let start = self.index();
        while let Some(c) = self.peek_char().filter(|&c| c.is_whitespace() || c == ',') {
            self.advance(c.len_utf8());
        }
        self.index() > start
    }

    pub fn units_option(&mut self) -> Result<()> {
        if self.peek_char() == Some('$') {
            return self.macro_option();
        }
        let option = self.one_of_words(UNITS_OPTIONS)?;
        option(self)
    }

    /// `$name[=value]` defines a macro for the rest of the session.
    pub fn macro_option(&mut self) -> Result<()> {
        self.expect_char('$')?;
        let name = self.expect_regex(&MACRO_NAME, "<MACRO NAME>")?;
        let value = if self.maybe(|p| p.expect_char('=')).is_some() {
            self.option_text()?.unwrap_or_default()
        } else {
            String::new()
        };
        self.macros.insert(name.value().to_string(), value);
        Ok(())
    }

    /// Quoted text or a bare word; `None` if neither follows.
    fn option_text(&mut self) -> Result<Option<String>> {
        if self.peek_char() == Some('"') {
            return self.quoted_text().map(Some);
        }
        Ok(self.maybe(|p| p.quoted_text_or_nonwhitespace()))
    }

    /// The option keyword just read, for error locations.
    fn previous_word(&self) -> Segment {
        let before = &self.line().value()[..self.index()];
        let start = before
            .trim_end_matches(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '/')
            .len();
        self.since(start)
    }

    fn equals(&mut self) -> Result<()> {
        self.expect_char('=')?;
        Ok(())
    }

    // ============ Stack ============

    fn save(&mut self) -> Result<()> {
        let depth = self.config.max_units_stack_depth;
        if self.stack.len() >= depth {
            return Err(WallsError::UnitsStackFull {
                depth,
                segment: self.previous_word(),
            });
        }
        self.stack.push(self.units.clone());
        Ok(())
    }

    fn restore(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(units) => {
                self.units = units;
                Ok(())
            }
            None => Err(WallsError::EmptyUnitsStack {
                segment: self.previous_word(),
            }),
        }
    }

    fn reset(&mut self) -> Result<()> {
        self.units = WallsUnits::default();
        Ok(())
    }

    // ============ Units ============

    fn meters(&mut self) -> Result<()> {
        self.units.set_length_unit(LengthUnit::Meters);
        Ok(())
    }

    fn feet(&mut self) -> Result<()> {
        self.units.set_length_unit(LengthUnit::Feet);
        Ok(())
    }

    fn d(&mut self) -> Result<()> {
        self.equals()?;
        self.units.d_unit = self.one_of_words(LENGTH_UNITS)?;
        Ok(())
    }

    fn s(&mut self) -> Result<()> {
        self.equals()?;
        self.units.s_unit = self.one_of_words(LENGTH_UNITS)?;
        Ok(())
    }

    fn a(&mut self) -> Result<()> {
        self.equals()?;
        self.units.a_unit = self.one_of_words(AZM_UNITS)?;
        Ok(())
    }

    fn ab(&mut self) -> Result<()> {
        self.equals()?;
        self.units.ab_unit = self.one_of_words(AZM_UNITS)?;
        Ok(())
    }

    fn a_ab(&mut self) -> Result<()> {
        self.equals()?;
        let unit = self.one_of_words(AZM_UNITS)?;
        self.units.a_unit = unit;
        self.units.ab_unit = unit;
        Ok(())
    }

    fn v(&mut self) -> Result<()> {
        self.equals()?;
        self.units.v_unit = self.one_of_words(INC_UNITS)?;
        Ok(())
    }

    fn vb(&mut self) -> Result<()> {
        self.equals()?;
        self.units.vb_unit = self.one_of_words(INC_UNITS)?;
        Ok(())
    }

    fn v_vb(&mut self) -> Result<()> {
        self.equals()?;
        let unit = self.one_of_words(INC_UNITS)?;
        self.units.v_unit = unit;
        self.units.vb_unit = unit;
        Ok(())
    }

    // ============ Vector Layout ============

    fn ct(&mut self) -> Result<()> {
        self.units.vector_type = VectorType::Ct;
        Ok(())
    }

    /// Bare `RECT` switches to rectangular vectors; `RECT=angle` sets the
    /// rectangular correction.
    fn rect(&mut self) -> Result<()> {
        if self.maybe(|p| p.equals()).is_some() {
            self.units.rect = self.azimuth_offset(self.units.a_unit)?;
        } else {
            self.units.vector_type = VectorType::Rect;
        }
        Ok(())
    }

    fn order(&mut self) -> Result<()> {
        self.equals()?;
        self.one_of(&[
            &|p: &mut Self| p.ct_order(),
            &|p: &mut Self| p.rect_order(),
        ])
    }

    pub fn ct_order(&mut self) -> Result<()> {
        self.units.ct_order = self.element_chars(&CT_ELEMENTS, &REQUIRED_CT_ELEMENTS)?;
        Ok(())
    }

    pub fn rect_order(&mut self) -> Result<()> {
        self.units.rect_order = self.element_chars(&RECT_ELEMENTS, &REQUIRED_RECT_ELEMENTS)?;
        Ok(())
    }

    /// `LRUD=F|T|FB|TB[:order]`
    fn lrud(&mut self) -> Result<()> {
        self.equals()?;
        self.units.lrud_type = self.one_of_words(LRUD_TYPES)?;
        if self.maybe(|p| p.expect_char(':')).is_some() {
            self.lrud_order()?;
        }
        Ok(())
    }

    pub fn lrud_order(&mut self) -> Result<()> {
        let order = self.element_chars(&LRUD_ELEMENTS, &REQUIRED_LRUD_ELEMENTS)?;
        if order.is_empty() {
            return self.fail(&["<LRUD ORDER>"]);
        }
        self.units.lrud_order = order;
        Ok(())
    }

    fn tape(&mut self) -> Result<()> {
        self.equals()?;
        self.units.tape = self.one_of_words(TAPING_METHODS)?.to_vec();
        Ok(())
    }

    // ============ Corrections ============

    fn decl(&mut self) -> Result<()> {
        self.equals()?;
        self.units.decl = self.azimuth_offset(self.units.a_unit)?;
        Ok(())
    }

    fn grid(&mut self) -> Result<()> {
        self.equals()?;
        self.units.grid = self.azimuth_offset(self.units.a_unit)?;
        Ok(())
    }

    fn incd(&mut self) -> Result<()> {
        self.equals()?;
        self.units.incd = self.length(self.units.d_unit)?;
        Ok(())
    }

    fn inch(&mut self) -> Result<()> {
        self.equals()?;
        self.units.inch = self.length(self.units.s_unit)?;
        Ok(())
    }

    fn incs(&mut self) -> Result<()> {
        self.equals()?;
        self.units.incs = self.length(self.units.s_unit)?;
        Ok(())
    }

    fn inca(&mut self) -> Result<()> {
        self.equals()?;
        self.units.inca = self.azimuth_offset(self.units.a_unit)?;
        Ok(())
    }

    fn incab(&mut self) -> Result<()> {
        self.equals()?;
        self.units.incab = self.azimuth_offset(self.units.ab_unit)?;
        Ok(())
    }

    fn incv(&mut self) -> Result<()> {
        self.equals()?;
        self.units.incv = self.inclination(self.units.v_unit)?;
        Ok(())
    }

    fn incvb(&mut self) -> Result<()> {
        self.equals()?;
        self.units.incvb = self.inclination(self.units.vb_unit)?;
        Ok(())
    }

    fn typeab(&mut self) -> Result<()> {
        self.units.typeab = self.backsight_type()?;
        Ok(())
    }

    fn typevb(&mut self) -> Result<()> {
        self.units.typevb = self.backsight_type()?;
        Ok(())
    }

    /// `=C|N[,tolerance[,X]]`
    fn backsight_type(&mut self) -> Result<BacksightType> {
        self.equals()?;
        let mut backsight = BacksightType {
            corrected: self.one_of_words(CORRECTED_VALUES)?,
            ..BacksightType::default()
        };
        if let Some(tolerance) = self.maybe(|p| {
            p.expect_char(',')?;
            p.unsigned_double_literal()
        }) {
            backsight.tolerance = tolerance;
            backsight.no_average = self
                .maybe(|p| {
                    p.expect_char(',')?;
                    p.expect_char_ignore_case('x')
                })
                .is_some();
        }
        Ok(backsight)
    }

    // ============ Names ============

    fn case(&mut self) -> Result<()> {
        self.equals()?;
        self.units.case_type = self.one_of_words(CASE_TYPES)?;
        Ok(())
    }

    fn prefix1(&mut self) -> Result<()> {
        self.prefix_option(0)
    }

    fn prefix2(&mut self) -> Result<()> {
        self.prefix_option(1)
    }

    fn prefix3(&mut self) -> Result<()> {
        self.prefix_option(2)
    }

    fn prefix_option(&mut self, index: usize) -> Result<()> {
        let prefix = match self.maybe(|p| p.equals()) {
            Some(()) => self.option_text()?,
            None => None,
        };
        self.units.set_prefix(index, prefix);
        Ok(())
    }

    fn flag(&mut self) -> Result<()> {
        self.units.flag = match self.maybe(|p| p.equals()) {
            Some(()) => self.option_text()?,
            None => None,
        };
        Ok(())
    }

    // ============ Variance Scaling ============

    fn uvh(&mut self) -> Result<()> {
        self.equals()?;
        self.units.uvh = self.unsigned_double_literal()?;
        Ok(())
    }

    fn uvv(&mut self) -> Result<()> {
        self.equals()?;
        self.units.uvv = self.unsigned_double_literal()?;
        Ok(())
    }

    fn uv(&mut self) -> Result<()> {
        self.equals()?;
        let scale = self.unsigned_double_literal()?;
        self.units.uvh = scale;
        self.units.uvv = scale;
        Ok(())
    }
}
