//! The Walls line grammar: dispatch, comments, macros and text fields.
//!
//! [`WallsParser`] is fed one physical line at a time. Each line is parsed
//! completely or not at all: events are buffered while the line is parsed
//! and only delivered to the visitor once the whole line has succeeded,
//! and a failed directive line leaves the units, the units stack and the
//! macro table exactly as they were.
//!
//! The productions themselves are spread over sibling modules:
//! numeric readings in `measurements`, `#` directives in `directives`,
//! `#UNITS` options in `units_options` and data lines in `vector`.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::{Result, WallsError};
use crate::line::{LineParser, LineState, Segment};

use super::config::ParserConfig;
use super::tables::{ESCAPED_CHARS, NONWHITESPACE, STATION, UNTIL_COMMENT};
use super::types::WallsEvent;
use super::units::WallsUnits;
use super::visitor::WallsVisitor;

/// Parser for the lines of one Walls survey file.
#[derive(Debug)]
pub struct WallsParser {
    state: LineState,
    pub(super) config: ParserConfig,
    pub(super) units: WallsUnits,
    pub(super) stack: Vec<WallsUnits>,
    pub(super) macros: HashMap<String, String>,
    in_block_comment: bool,
    events: Vec<WallsEvent>,
}

impl LineParser for WallsParser {
    fn state(&self) -> &LineState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut LineState {
        &mut self.state
    }
}

impl Default for WallsParser {
    fn default() -> Self {
        Self::new()
    }
}

impl WallsParser {
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            state: LineState::default(),
            config,
            units: WallsUnits::default(),
            stack: Vec::new(),
            macros: HashMap::new(),
            in_block_comment: false,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// The units currently in effect.
    pub fn units(&self) -> &WallsUnits {
        &self.units
    }

    /// Number of outstanding `#UNITS SAVE`s.
    pub fn units_stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn macros(&self) -> &HashMap<String, String> {
        &self.macros
    }

    pub fn in_block_comment(&self) -> bool {
        self.in_block_comment
    }

    /// Parse every line of `text`, continuing past lines that fail.
    ///
    /// Returns the errors of the failed lines in order.
    pub fn parse_text(&mut self, text: &str, visitor: &mut dyn WallsVisitor) -> Vec<WallsError> {
        let source = self.config.source_name.clone();
        text.lines()
            .enumerate()
            .filter_map(|(n, line)| {
                let line = Segment::new(line, source.as_deref(), n, 0);
                self.parse_line(line, visitor).err()
            })
            .collect()
    }

    /// Parse one physical line and report what it contained to `visitor`.
    pub fn parse_line(&mut self, line: Segment, visitor: &mut dyn WallsVisitor) -> Result<()> {
        self.state.reset(line);
        self.events.clear();
        match self.line_production() {
            Ok(()) => {
                for event in self.events.drain(..) {
                    event.dispatch(visitor);
                }
                Ok(())
            }
            Err(err) => {
                self.events.clear();
                Err(err)
            }
        }
    }

    /// Position the parser at the start of `line` without parsing it.
    #[cfg(test)]
    pub(super) fn begin_line(&mut self, line: Segment) {
        self.state.reset(line);
    }

    pub(super) fn emit(&mut self, event: WallsEvent) {
        self.events.push(event);
    }

    fn line_production(&mut self) -> Result<()> {
        if self.in_block_comment {
            return self.one_of(&[
                &|p: &mut Self| p.end_block_comment_line(),
                &|p: &mut Self| p.inside_block_comment_line(),
            ]);
        }
        self.maybe_whitespace();
        if self.is_at_end() {
            return Ok(());
        }
        if self.peek_char() == Some(';') {
            return self.comment_line();
        }
        if self.rest().starts_with("#[") || self.rest().starts_with("/*") {
            return self.begin_block_comment_line();
        }
        self.replace_macros()?;
        if self.peek_char() == Some('#') {
            self.directive_line()
        } else {
            self.vector_line()
        }
    }

    // ============ Comments ============

    fn comment_line(&mut self) -> Result<()> {
        let comment = self.inline_comment()?;
        self.emit(WallsEvent::Comment { comment });
        Ok(())
    }

    pub fn begin_block_comment_line(&mut self) -> Result<()> {
        self.maybe_whitespace();
        self.one_of(&[
            &|p: &mut Self| p.expect_str("#["),
            &|p: &mut Self| p.expect_str("/*"),
        ])?;
        let comment = self.remaining().trim();
        if !comment.is_empty() {
            self.emit(WallsEvent::Comment {
                comment: comment.value().to_string(),
            });
        }
        self.in_block_comment = true;
        Ok(())
    }

    pub fn end_block_comment_line(&mut self) -> Result<()> {
        self.maybe_whitespace();
        self.one_of(&[
            &|p: &mut Self| p.expect_str("#]"),
            &|p: &mut Self| p.expect_str("*/"),
        ])?;
        self.remaining();
        self.in_block_comment = false;
        Ok(())
    }

    pub fn inside_block_comment_line(&mut self) -> Result<()> {
        let comment = self.remaining();
        self.emit(WallsEvent::Comment {
            comment: comment.value().to_string(),
        });
        Ok(())
    }

    /// `;` and the rest of the line.
    pub fn inline_comment(&mut self) -> Result<String> {
        self.expect_char(';')?;
        Ok(self.remaining().value().to_string())
    }

    /// Optional whitespace, then either a comment or the end of the line.
    pub fn inline_comment_or_end_of_line(&mut self) -> Result<Option<String>> {
        self.maybe_whitespace();
        self.one_of(&[
            &|p: &mut Self| p.inline_comment().map(Some),
            &|p: &mut Self| p.end_of_line().map(|_| None),
        ])
    }

    /// Like [`WallsParser::inline_comment_or_end_of_line`], emitting the
    /// comment as its own event.
    pub(super) fn end_of_directive(&mut self) -> Result<()> {
        if let Some(comment) = self.inline_comment_or_end_of_line()? {
            self.emit(WallsEvent::Comment { comment });
        }
        Ok(())
    }

    // ============ Macros ============

    /// Substitute `$(name)` references in the rest of the line.
    ///
    /// Quoted text and anything after a `;` are left untouched.
    pub fn replace_macros(&mut self) -> Result<()> {
        let start = self.index();
        let mut replaced = String::new();
        let mut any = false;
        while let Some(c) = self.peek_char() {
            match c {
                '"' => {
                    let quoted = self.move_past_end_quote();
                    replaced.push_str(quoted.value());
                }
                ';' => {
                    replaced.push_str(self.remaining().value());
                }
                '$' if self.rest()[1..].starts_with('(') => {
                    let value = self.replace_macro()?;
                    replaced.push_str(&value);
                    any = true;
                }
                _ => {
                    self.advance(c.len_utf8());
                    replaced.push(c);
                }
            }
        }
        if any {
            let text = format!("{}{}", &self.line().value()[..start], replaced);
            let line = self.line().with_text(text);
            self.state.reset(line);
        }
        self.set_index(start);
        Ok(())
    }

    /// Skip a quoted run (honoring backslash escapes), returning it verbatim.
    pub fn move_past_end_quote(&mut self) -> Segment {
        let start = self.index();
        self.advance(1);
        let mut escaped = false;
        while let Some(c) = self.peek_char() {
            self.advance(c.len_utf8());
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => break,
                _ => {}
            }
        }
        self.since(start)
    }

    /// Expand one `$(name)` reference.
    pub fn replace_macro(&mut self) -> Result<String> {
        self.expect_str("$(")?;
        let start = self.index();
        loop {
            match self.peek_char() {
                Some(')') => {
                    let name = self.since(start);
                    self.advance(1);
                    return match self.macros.get(name.value()) {
                        Some(value) => Ok(value.clone()),
                        None => Err(WallsError::UnknownMacro {
                            name: name.value().to_string(),
                            segment: name,
                        }),
                    };
                }
                Some(c) if !c.is_whitespace() => {
                    self.advance(c.len_utf8());
                }
                Some(_) => return self.fail(&["<MACRO NAME>", ")"]),
                None => return self.fail(&[")"]),
            }
        }
    }

    // ============ Text ============

    /// One character accepted by `predicate`, expanding `\` escapes.
    pub fn escaped_char<F>(&mut self, predicate: F, expected: &[&str]) -> Result<char>
    where
        F: Fn(char) -> bool,
    {
        let c = self.expect_char_if(predicate, expected)?;
        if c == '\\' {
            self.one_of_map(&ESCAPED_CHARS)
        } else {
            Ok(c)
        }
    }

    /// As many escaped characters as `predicate` accepts.
    pub fn escaped_text<F>(&mut self, predicate: F, expected: &[&str]) -> String
    where
        F: Fn(char) -> bool,
    {
        let mut text = String::new();
        while let Some(c) = self.maybe(|p| p.escaped_char(&predicate, expected)) {
            text.push(c);
        }
        text
    }

    /// A double-quoted string with backslash escapes.
    pub fn quoted_text(&mut self) -> Result<String> {
        let start = self.index();
        self.expect_char('"')?;
        let text = self.escaped_text(|c| c != '"', &["<QUOTED TEXT>"]);
        if !self.rest().contains('"') {
            self.remaining();
            return Err(WallsError::UnterminatedQuote {
                segment: self.since(start),
            });
        }
        self.expect_char('"')?;
        Ok(text)
    }

    /// Quoted text if the next character is `"`, otherwise a bare word.
    pub fn quoted_text_or_nonwhitespace(&mut self) -> Result<String> {
        if self.peek_char() == Some('"') {
            return self.quoted_text();
        }
        let word = self.expect_regex(&NONWHITESPACE, "<TEXT>")?;
        Ok(word.value().to_string())
    }

    /// Quoted text, or everything up to a comment with surrounding
    /// whitespace removed.
    pub fn quoted_text_or_until_comment(&mut self) -> Result<String> {
        if self.peek_char() == Some('"') {
            return self.quoted_text();
        }
        let text = self.escaped_text(|c| c != ';', &["<TEXT>"]);
        Ok(text.trim().to_string())
    }

    /// Everything up to a comment or the end of the line, trimmed.
    pub fn until_comment(&mut self) -> Result<Segment> {
        let text = self.expect_regex(&UNTIL_COMMENT, "<TEXT>")?;
        Ok(text.trim())
    }

    // ============ Stations ============

    /// A station name as written, before prefixes are applied.
    pub fn station(&mut self) -> Result<Segment> {
        let name = self.expect_regex(&STATION, "<STATION NAME>")?;
        match self.peek_char() {
            Some(c) if is_station_char(c) => Err(WallsError::out_of_range(
                "station name length",
                self.line().sub(name.start(), self.index() + c.len_utf8()),
            )),
            _ => Ok(name),
        }
    }

    /// A station name with the current case mode and prefixes applied.
    pub fn station_name(&mut self) -> Result<String> {
        let name = self.station()?;
        Ok(self.units.process_station_name(name.value()))
    }

    // ============ Element Orders ============

    /// Read a permutation of element codes such as `DAV` or `LRUD`.
    ///
    /// Each code may appear once, in either case. Reading stops at the first
    /// character that is not an unused code; a code that was already used
    /// fails with [`WallsError::DuplicateElementCode`], and any element of
    /// `required` not seen fails with [`WallsError::MissingRequiredElement`].
    pub fn element_chars<T>(
        &mut self,
        elements: &HashMap<char, T>,
        required: &HashSet<T>,
    ) -> Result<Vec<T>>
    where
        T: Copy + Eq + Hash + Debug,
    {
        let start = self.index();
        let mut remaining = elements.clone();
        let mut missing = required.clone();
        let mut result = Vec::new();
        while !remaining.is_empty() {
            let Some(c) = self.peek_char() else { break };
            let Some(element) = self.maybe(|p| p.one_of_map(&remaining)) else {
                break;
            };
            result.push(element);
            remaining.remove(&c.to_ascii_lowercase());
            remaining.remove(&c.to_ascii_uppercase());
            missing.remove(&element);
        }
        if let Some(code) = self.peek_char().filter(|c| elements.contains_key(c)) {
            return Err(WallsError::DuplicateElementCode {
                code,
                segment: self.here(),
            });
        }
        if !missing.is_empty() {
            let mut missing: Vec<String> = missing.iter().map(|e| format!("{:?}", e)).collect();
            missing.sort();
            let end = self.index().max(start + self.here().len());
            return Err(WallsError::MissingRequiredElement {
                missing,
                segment: self.line().sub(start, end),
            });
        }
        Ok(result)
    }
}

fn is_station_char(c: char) -> bool {
    !(c.is_whitespace() || matches!(c, ':' | ';' | ',' | '#' | '/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walls::tables::{CT_ELEMENTS, LRUD_ELEMENTS, REQUIRED_CT_ELEMENTS};
    use crate::walls::units::{CtElement, LrudElement};
    use crate::walls::visitor::EventCollector;

    fn parser_on(text: &str) -> WallsParser {
        let mut parser = WallsParser::new();
        parser.state.reset(Segment::new(text, None, 0, 0));
        parser
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Tag {
        A,
        B,
        C,
    }

    fn tags() -> HashMap<char, Tag> {
        [
            ('a', Tag::A),
            ('A', Tag::A),
            ('b', Tag::B),
            ('B', Tag::B),
            ('c', Tag::C),
            ('C', Tag::C),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_element_chars_missing_required() {
        let required: HashSet<Tag> = [Tag::A, Tag::B].into_iter().collect();
        let mut p = parser_on("bc");
        match p.element_chars(&tags(), &required) {
            Err(WallsError::MissingRequiredElement { missing, .. }) => {
                assert_eq!(missing, vec!["A"]);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_element_chars_either_case_in_input_order() {
        let required: HashSet<Tag> = [Tag::A, Tag::B].into_iter().collect();
        let mut p = parser_on("bA rest");
        assert_eq!(p.element_chars(&tags(), &required).unwrap(), vec![Tag::B, Tag::A]);
        assert_eq!(p.rest(), " rest");

        let mut p = parser_on("Ab");
        assert_eq!(p.element_chars(&tags(), &required).unwrap(), vec![Tag::A, Tag::B]);
    }

    #[test]
    fn test_element_chars_duplicate() {
        let mut p = parser_on("DAd");
        match p.element_chars(&CT_ELEMENTS, &REQUIRED_CT_ELEMENTS) {
            Err(WallsError::DuplicateElementCode { code, segment }) => {
                assert_eq!(code, 'd');
                assert_eq!(segment.start(), 2);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_element_chars_nothing_required() {
        let mut p = parser_on("UD");
        let order = p.element_chars(&LRUD_ELEMENTS, &HashSet::new()).unwrap();
        assert_eq!(order, vec![LrudElement::U, LrudElement::D]);

        let mut p = parser_on("x");
        assert!(p.element_chars(&LRUD_ELEMENTS, &HashSet::new()).unwrap().is_empty());

        let mut p = parser_on("va");
        assert!(matches!(
            p.element_chars(&CT_ELEMENTS, &REQUIRED_CT_ELEMENTS),
            Err(WallsError::MissingRequiredElement { .. })
        ));
        let mut p = parser_on("avd");
        assert_eq!(
            p.element_chars(&CT_ELEMENTS, &REQUIRED_CT_ELEMENTS).unwrap(),
            vec![CtElement::A, CtElement::V, CtElement::D]
        );
    }

    #[test]
    fn test_quoted_text_escapes() {
        let mut p = parser_on(r#""a \"b\"\tc" rest"#);
        assert_eq!(p.quoted_text().unwrap(), "a \"b\"\tc");
        assert_eq!(p.rest(), " rest");
    }

    #[test]
    fn test_quoted_text_unterminated() {
        let mut p = parser_on(r#""never closed"#);
        assert!(matches!(
            p.quoted_text(),
            Err(WallsError::UnterminatedQuote { .. })
        ));
    }

    #[test]
    fn test_quoted_text_unterminated_after_backslash() {
        let mut p = parser_on(r#""C:\"#);
        match p.quoted_text() {
            Err(WallsError::UnterminatedQuote { segment }) => assert_eq!(segment.value(), r#""C:\"#),
            other => panic!("unexpected result {:?}", other),
        }
        let mut p = parser_on(r#""ends in \""#);
        assert!(matches!(
            p.quoted_text(),
            Err(WallsError::UnterminatedQuote { .. })
        ));
    }

    #[test]
    fn test_quoted_text_or_nonwhitespace() {
        let mut p = parser_on("plain words");
        assert_eq!(p.quoted_text_or_nonwhitespace().unwrap(), "plain");
        let mut p = parser_on("\"two words\" x");
        assert_eq!(p.quoted_text_or_nonwhitespace().unwrap(), "two words");
        let mut p = parser_on("\"open");
        assert!(p.quoted_text_or_nonwhitespace().is_err());
    }

    #[test]
    fn test_replace_macros() {
        let mut p = parser_on("A$(n) A$(m) 10 \"$(n)\" ; $(n)");
        p.macros.insert("n".into(), "1".into());
        p.macros.insert("m".into(), "2".into());
        p.replace_macros().unwrap();
        assert_eq!(p.line().value(), "A1 A2 10 \"$(n)\" ; $(n)");
        assert_eq!(p.index(), 0);
    }

    #[test]
    fn test_replace_undefined_macro() {
        let mut p = parser_on("A1 $(nope) 10");
        match p.replace_macros() {
            Err(WallsError::UnknownMacro { name, segment }) => {
                assert_eq!(name, "nope");
                assert_eq!(segment.start(), 5);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_block_comments_span_lines() {
        let mut parser = WallsParser::new();
        let mut events = EventCollector::new();
        let errors = parser.parse_text("#[ start\nA1 A2 not data\n#]\n; after", &mut events);
        assert!(errors.is_empty(), "{:?}", errors);
        assert!(!parser.in_block_comment());
        let comments: Vec<_> = events
            .events
            .iter()
            .filter_map(|e| match e {
                WallsEvent::Comment { comment } => Some(comment.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(comments, vec!["start", "A1 A2 not data", " after"]);
    }

    #[test]
    fn test_c_style_block_comment() {
        let mut parser = WallsParser::new();
        let mut events = EventCollector::new();
        let errors = parser.parse_text("/*\nnot data\n*/\n", &mut events);
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(events.events.len(), 1);
    }

    #[test]
    fn test_station_too_long() {
        let mut p = parser_on("ABCDEFGHI B1");
        assert!(matches!(
            p.station(),
            Err(WallsError::ValueOutOfRange { .. })
        ));
        let mut p = parser_on("X:ABCDEFGH B1");
        assert_eq!(p.station().unwrap().value(), "X:ABCDEFGH");
    }
}
