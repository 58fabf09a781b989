//! `#` directive lines other than `#UNITS`.

use time::{Date, Month};

use crate::error::{Result, WallsError};
use crate::line::{LineParser, Segment};

use super::parser::WallsParser;
use super::tables::{Directive, DIRECTIVES, ISO_DATE, PREFIX, US_DATE1, US_DATE2};
use super::types::{FixedStation, WallsEvent};
use super::units::RectElement;

impl WallsParser {
    /// A line starting with `#`.
    ///
    /// A directive that fails leaves the units, the units stack and the
    /// macro table as they were before the line.
    pub(super) fn directive_line(&mut self) -> Result<()> {
        self.expect_char('#')?;
        let directive = match self.one_of_words(DIRECTIVES) {
            Ok(directive) => directive,
            Err(WallsError::UnexpectedInput { segment, .. }) => {
                return Err(WallsError::UnknownDirective {
                    name: segment.value().to_string(),
                    segment,
                })
            }
            Err(err) => return Err(err),
        };

        let units = self.units.clone();
        let stack = self.stack.clone();
        let macros = self.macros.clone();
        let result = match directive {
            Directive::Units => self.units_line(),
            Directive::Date => self.date_line(),
            Directive::Flag => self.flag_line(),
            Directive::Segment => self.segment_line(),
            Directive::Prefix(index) => self.prefix_line(index),
            Directive::Note => self.note_line(),
            Directive::Symbol => self.symbol_line(),
            Directive::Fix => self.fix_line(),
        };
        if result.is_err() {
            self.units = units;
            self.stack = stack;
            self.macros = macros;
        }
        result
    }

    // ============ Segments and Prefixes ============

    /// The path argument of `#SEGMENT`.
    pub fn segment_directive(&mut self) -> Result<Segment> {
        self.maybe_whitespace();
        self.until_comment()
    }

    pub fn segment_line(&mut self) -> Result<()> {
        let path = self.segment_directive()?;
        self.units.segment = self.units.resolve_segment(path.value());
        self.emit(WallsEvent::SegmentChanged {
            segment: self.units.segment.clone(),
        });
        self.end_of_directive()
    }

    /// `#PREFIX`, `#PREFIX2` or `#PREFIX3`; `index` is zero-based.
    pub fn prefix_line(&mut self, index: usize) -> Result<()> {
        self.maybe_whitespace();
        let prefix = self.expect_regex(&PREFIX, "<PREFIX>")?;
        self.units.set_prefix(index, Some(prefix.value().to_string()));
        self.emit(WallsEvent::UnitsChanged {
            units: self.units.clone(),
        });
        self.end_of_directive()
    }

    // ============ Notes, Flags and Symbols ============

    /// `#NOTE station text`
    pub fn note_line(&mut self) -> Result<()> {
        self.whitespace()?;
        let station = self.station_name()?;
        self.whitespace()?;
        let note = self.quoted_text_or_until_comment()?;
        self.emit(WallsEvent::Note { station, note });
        self.end_of_directive()
    }

    /// `#FLAG [stations] [/name]`
    ///
    /// Without stations the flag becomes the default for following vectors.
    pub fn flag_line(&mut self) -> Result<()> {
        let mut stations = Vec::new();
        while let Some(station) = self.maybe(|p| {
            p.station_separator()?;
            p.station_name()
        }) {
            stations.push(station);
        }
        self.maybe_whitespace();
        let flag = match self.peek_char() {
            Some('/') => Some(self.slash_prefixed_flag()?),
            _ => None,
        };
        if stations.is_empty() {
            self.units.flag = flag;
            self.emit(WallsEvent::UnitsChanged {
                units: self.units.clone(),
            });
        } else {
            self.emit(WallsEvent::FlaggedStations { flag, stations });
        }
        self.end_of_directive()
    }

    /// `/` followed by a flag name.
    pub fn slash_prefixed_flag(&mut self) -> Result<String> {
        self.expect_char('/')?;
        self.quoted_text_or_until_comment()
    }

    fn station_separator(&mut self) -> Result<()> {
        let start = self.index();
        while let Some(c) = self.peek_char().filter(|&c| c.is_whitespace() || c == ',') {
            self.advance(c.len_utf8());
        }
        if self.index() == start {
            return self.fail(&["<WHITESPACE>", ","]);
        }
        Ok(())
    }

    /// Symbol definitions only affect plotting and are skipped.
    pub fn symbol_line(&mut self) -> Result<()> {
        self.remaining();
        Ok(())
    }

    // ============ Dates ============

    pub fn date_line(&mut self) -> Result<()> {
        self.whitespace()?;
        let date = self.date_directive()?;
        self.emit(WallsEvent::Date { date });
        self.end_of_directive()
    }

    /// A date in any of the accepted layouts.
    pub fn date_directive(&mut self) -> Result<Date> {
        self.one_of(&[
            &|p: &mut Self| p.iso_date(),
            &|p: &mut Self| p.us_date1(),
            &|p: &mut Self| p.us_date2(),
        ])
    }

    /// `YYYY-MM-DD`
    pub fn iso_date(&mut self) -> Result<Date> {
        let text = self.expect_regex(&ISO_DATE, "<DATE>")?;
        let [year, month, day] = date_fields(&text)?;
        calendar_date(year, month, day, text)
    }

    /// `MM-DD-YYYY` or `MM/DD/YYYY`
    pub fn us_date1(&mut self) -> Result<Date> {
        let text = self.expect_regex(&US_DATE1, "<DATE>")?;
        let [month, day, year] = date_fields(&text)?;
        calendar_date(year, month, day, text)
    }

    /// `MM-DD-YY` or `MM/DD/YY`, in the twentieth century.
    pub fn us_date2(&mut self) -> Result<Date> {
        let text = self.expect_regex(&US_DATE2, "<DATE>")?;
        let [month, day, year] = date_fields(&text)?;
        calendar_date(year + 1900, month, day, text)
    }

    // ============ Fixed Stations ============

    /// `#FIX station east north up [(variance)] [/note]`
    ///
    /// Coordinates follow the rectangular order in effect; east and north
    /// may instead be given as longitude and latitude.
    pub fn fix_line(&mut self) -> Result<()> {
        self.whitespace()?;
        let name = self.station_name()?;
        let units = self.units.clone();
        let mut fixed = FixedStation {
            source: self.line().clone(),
            name,
            east: None,
            north: None,
            up: None,
            longitude: None,
            latitude: None,
            horizontal_variance: None,
            vertical_variance: None,
            note: None,
            segment: units.segment.clone(),
            comment: None,
            units,
        };
        let d_unit = self.units.d_unit;
        for element in self.units.rect_order.clone() {
            self.whitespace()?;
            match element {
                RectElement::E => {
                    if matches!(self.peek_char(), Some('e' | 'E' | 'w' | 'W')) {
                        fixed.longitude = Some(self.longitude()?);
                    } else {
                        fixed.east = Some(self.length(d_unit)?);
                    }
                }
                RectElement::N => {
                    if matches!(self.peek_char(), Some('n' | 'N' | 's' | 'S')) {
                        fixed.latitude = Some(self.latitude()?);
                    } else {
                        fixed.north = Some(self.length(d_unit)?);
                    }
                }
                RectElement::U => fixed.up = Some(self.length(d_unit)?),
            }
        }
        self.maybe_whitespace();
        if self.peek_char() == Some('(') {
            let (horizontal, vertical) = self.variance_overrides()?;
            fixed.horizontal_variance = horizontal;
            fixed.vertical_variance = vertical;
            self.maybe_whitespace();
        }
        if self.peek_char() == Some('/') {
            self.expect_char('/')?;
            fixed.note = Some(self.quoted_text_or_until_comment()?);
            self.maybe_whitespace();
        }
        if self.peek_char() == Some('#') {
            fixed.segment = self.inline_segment()?;
        }
        fixed.comment = self.inline_comment_or_end_of_line()?;
        self.emit(WallsEvent::FixedStation(Box::new(fixed)));
        Ok(())
    }
}

/// The three numbers of a matched date, in the order written.
fn date_fields(text: &Segment) -> Result<[i32; 3]> {
    let mut fields = [0; 3];
    let mut parts = text.value().split(['-', '/']);
    for field in fields.iter_mut() {
        *field = parts
            .next()
            .and_then(|part| part.parse().ok())
            .ok_or_else(|| invalid_date(text))?;
    }
    Ok(fields)
}

fn calendar_date(year: i32, month: i32, day: i32, text: Segment) -> Result<Date> {
    let month = u8::try_from(month)
        .ok()
        .and_then(|month| Month::try_from(month).ok())
        .ok_or_else(|| invalid_date(&text))?;
    let day = u8::try_from(day).map_err(|_| invalid_date(&text))?;
    Date::from_calendar_date(year, month, day).map_err(|_| invalid_date(&text))
}

fn invalid_date(text: &Segment) -> WallsError {
    WallsError::InvalidDate {
        text: text.value().to_string(),
        segment: text.clone(),
    }
}
