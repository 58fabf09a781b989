//! Backtracking combinators over a single line of text.
//!
//! A [`LineParser`] owns a cursor into one [`Segment`]. Productions are
//! plain methods returning [`Result`]; the combinators here compose them:
//!
//! - [`LineParser::maybe`] runs a production and rewinds the cursor if it fails
//! - [`LineParser::one_of`] tries alternatives in order and reports the failure
//!   that got furthest when none match
//! - [`LineParser::one_of_map`] / [`LineParser::one_of_words`] turn a single
//!   character or keyword into a value from a lookup table
//!
//! Grammars implement the trait for their own parser type so that their
//! productions can be passed to the combinators as `&mut Self` closures.

use std::collections::HashMap;

use regex::Regex;

use crate::error::{Result, WallsError};

use super::Segment;

/// Cursor state for the line currently being parsed.
#[derive(Debug, Clone)]
pub struct LineState {
    line: Segment,
    i: usize,
}

impl LineState {
    /// Start parsing `line` from its first character.
    pub fn new(line: Segment) -> Self {
        Self { line, i: 0 }
    }

    /// Replace the line and rewind the cursor.
    pub fn reset(&mut self, line: Segment) {
        self.line = line;
        self.i = 0;
    }
}

impl Default for LineState {
    fn default() -> Self {
        Self::new(Segment::new("", None, 0, 0))
    }
}

/// Parsing primitives shared by every line grammar.
pub trait LineParser {
    /// The cursor state.
    fn state(&self) -> &LineState;

    /// Mutable access to the cursor state.
    fn state_mut(&mut self) -> &mut LineState;

    /// The whole line being parsed.
    fn line(&self) -> &Segment {
        &self.state().line
    }

    /// Current byte offset of the cursor.
    fn index(&self) -> usize {
        self.state().i
    }

    /// Move the cursor; only ever used to rewind to a saved index.
    fn set_index(&mut self, i: usize) {
        self.state_mut().i = i;
    }

    /// Unconsumed text.
    fn rest(&self) -> &str {
        &self.line().value()[self.index()..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn is_at_end(&self) -> bool {
        self.index() >= self.line().len()
    }

    /// The character under the cursor as a segment (empty at end of line).
    fn here(&self) -> Segment {
        let i = self.index();
        let width = self.peek_char().map_or(0, char::len_utf8);
        self.line().sub(i, i + width)
    }

    /// Fail at the cursor, listing what would have been accepted.
    fn fail<T>(&self, expected: &[&str]) -> Result<T> {
        Err(WallsError::unexpected(self.here(), expected.iter().copied()))
    }

    /// Consume `len` bytes and return them as a segment.
    fn advance(&mut self, len: usize) -> Segment {
        let start = self.index();
        let consumed = self.line().sub(start, start + len);
        self.set_index(start + len);
        consumed
    }

    /// The segment from `start` up to the cursor.
    fn since(&self, start: usize) -> Segment {
        self.line().sub(start, self.index())
    }

    fn expect_char(&mut self, expected: char) -> Result<char> {
        match self.peek_char() {
            Some(c) if c == expected => {
                self.advance(c.len_utf8());
                Ok(c)
            }
            _ => self.fail(&[&expected.to_string()]),
        }
    }

    fn expect_char_ignore_case(&mut self, expected: char) -> Result<char> {
        match self.peek_char() {
            Some(c) if c.eq_ignore_ascii_case(&expected) => {
                self.advance(c.len_utf8());
                Ok(c)
            }
            _ => self.fail(&[&expected.to_string()]),
        }
    }

    /// Consume one character accepted by `predicate`.
    fn expect_char_if<F>(&mut self, predicate: F, expected: &[&str]) -> Result<char>
    where
        F: Fn(char) -> bool,
    {
        match self.peek_char() {
            Some(c) if predicate(c) => {
                self.advance(c.len_utf8());
                Ok(c)
            }
            _ => self.fail(expected),
        }
    }

    fn expect_str(&mut self, expected: &str) -> Result<Segment> {
        if self.rest().starts_with(expected) {
            Ok(self.advance(expected.len()))
        } else {
            self.fail(&[expected])
        }
    }

    fn expect_str_ignore_case(&mut self, expected: &str) -> Result<Segment> {
        let matches = self
            .rest()
            .get(..expected.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(expected));
        if matches {
            Ok(self.advance(expected.len()))
        } else {
            self.fail(&[expected])
        }
    }

    /// Consume a match of `pattern`, which must be anchored with `^`.
    fn expect_regex(&mut self, pattern: &Regex, expected: &str) -> Result<Segment> {
        match pattern.find(self.rest()) {
            Some(m) if m.start() == 0 => Ok(self.advance(m.end())),
            _ => self.fail(&[expected]),
        }
    }

    /// Run `production`; on failure rewind the cursor and return `None`.
    fn maybe<T, F>(&mut self, production: F) -> Option<T>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let start = self.index();
        match production(&mut *self) {
            Ok(value) => Some(value),
            Err(_) => {
                self.set_index(start);
                None
            }
        }
    }

    /// Try each alternative in order and return the first success.
    ///
    /// If all fail, the error that got furthest into the line is returned;
    /// expected items of failures at the same position are merged.
    fn one_of<T>(&mut self, alternatives: &[&dyn Fn(&mut Self) -> Result<T>]) -> Result<T>
    where
        Self: Sized,
    {
        let start = self.index();
        let mut furthest: Option<WallsError> = None;
        for alternative in alternatives {
            match alternative(&mut *self) {
                Ok(value) => return Ok(value),
                Err(err) => {
                    self.set_index(start);
                    furthest = Some(match furthest {
                        None => err,
                        Some(prev) if err.position() > prev.position() => err,
                        Some(prev) if err.position() == prev.position() => prev.merge(err),
                        Some(prev) => prev,
                    });
                }
            }
        }
        match furthest {
            Some(err) => Err(err),
            None => self.fail(&[]),
        }
    }

    /// Consume one character and map it through `map`.
    fn one_of_map<V: Clone>(&mut self, map: &HashMap<char, V>) -> Result<V> {
        if let Some(c) = self.peek_char() {
            if let Some(value) = map.get(&c) {
                self.advance(c.len_utf8());
                return Ok(value.clone());
            }
        }
        let mut keys: Vec<String> = map.keys().map(char::to_string).collect();
        keys.sort();
        Err(WallsError::unexpected(self.here(), keys))
    }

    /// Like [`LineParser::one_of_map`], but falls back to `default` without
    /// consuming anything when the next character is not in `map`.
    fn one_of_map_or<V: Clone>(&mut self, map: &HashMap<char, V>, default: V) -> V {
        match self.peek_char().and_then(|c| map.get(&c).map(|v| (c, v.clone()))) {
            Some((c, value)) => {
                self.advance(c.len_utf8());
                value
            }
            None => default,
        }
    }

    /// Read a keyword and look it up case-insensitively in `words`.
    ///
    /// A keyword is a run of letters, digits, `_` and `/`.
    fn one_of_words<V: Clone>(&mut self, words: &[(&str, V)]) -> Result<V> {
        let len = self
            .rest()
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '/'))
            .unwrap_or_else(|| self.rest().len());
        let word = &self.rest()[..len];
        if let Some((_, value)) = words.iter().find(|(w, _)| w.eq_ignore_ascii_case(word)) {
            let value = value.clone();
            self.advance(len);
            return Ok(value);
        }
        let start = self.index();
        let segment = self.line().sub(start, start + len.max(self.here().len()));
        Err(WallsError::unexpected(segment, words.iter().map(|(w, _)| *w)))
    }

    /// One or more whitespace characters.
    fn whitespace(&mut self) -> Result<Segment> {
        let len = self.rest().len() - self.rest().trim_start().len();
        if len == 0 {
            return self.fail(&["<WHITESPACE>"]);
        }
        Ok(self.advance(len))
    }

    /// Zero or more whitespace characters.
    fn maybe_whitespace(&mut self) -> Segment {
        let len = self.rest().len() - self.rest().trim_start().len();
        self.advance(len)
    }

    fn end_of_line(&mut self) -> Result<()> {
        if self.is_at_end() {
            Ok(())
        } else {
            self.fail(&["<END OF LINE>"])
        }
    }

    /// Consume and return the rest of the line.
    fn remaining(&mut self) -> Segment {
        let len = self.rest().len();
        self.advance(len)
    }
}

impl LineParser for LineState {
    fn state(&self) -> &LineState {
        self
    }

    fn state_mut(&mut self) -> &mut LineState {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser(text: &str) -> LineState {
        LineState::new(Segment::new(text, None, 0, 0))
    }

    #[test]
    fn test_expect_advances() {
        let mut p = parser("#units meters");
        assert_eq!(p.expect_char('#').unwrap(), '#');
        assert_eq!(p.expect_str_ignore_case("UNITS").unwrap().value(), "units");
        assert!(p.whitespace().is_ok());
        assert_eq!(p.remaining().value(), "meters");
        assert!(p.end_of_line().is_ok());
    }

    #[test]
    fn test_expect_failure_reports_position() {
        let mut p = parser("abc");
        p.expect_str("ab").unwrap();
        match p.expect_char('x') {
            Err(WallsError::UnexpectedInput { expected, segment }) => {
                assert_eq!(expected, vec!["x"]);
                assert_eq!(segment.start(), 2);
                assert_eq!(segment.value(), "c");
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_maybe_rewinds() {
        let mut p = parser("abd");
        let result = p.maybe(|p| {
            p.expect_str("ab")?;
            p.expect_char('c')
        });
        assert_eq!(result, None);
        assert_eq!(p.index(), 0);
        assert_eq!(p.maybe(|p| p.expect_str("abd")).map(|s| s.len()), Some(3));
    }

    #[test]
    fn test_one_of_takes_first_success() {
        let mut p = parser("feet");
        let result = p.one_of(&[
            &|p: &mut LineState| p.expect_str("f").map(|_| 1),
            &|p: &mut LineState| p.expect_str("feet").map(|_| 2),
        ]);
        assert_eq!(result.unwrap(), 1);
        assert_eq!(p.rest(), "eet");
    }

    #[test]
    fn test_one_of_reports_furthest_failure() {
        let mut p = parser("abz");
        let err = p
            .one_of(&[
                &|p: &mut LineState| p.expect_str("x"),
                &|p: &mut LineState| {
                    p.expect_str("ab")?;
                    p.expect_str("c")
                },
                &|p: &mut LineState| {
                    p.expect_str("ab")?;
                    p.expect_str("d")
                },
            ])
            .unwrap_err();
        assert_eq!(err.position(), 2);
        match err {
            WallsError::UnexpectedInput { expected, .. } => assert_eq!(expected, vec!["c", "d"]),
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(p.index(), 0);
    }

    #[test]
    fn test_one_of_map() {
        let map: HashMap<char, u8> = [('n', 0), ('N', 0), ('e', 1), ('E', 1)].into_iter().collect();
        let mut p = parser("Ex");
        assert_eq!(p.one_of_map(&map).unwrap(), 1);
        match p.one_of_map(&map) {
            Err(WallsError::UnexpectedInput { expected, .. }) => {
                assert_eq!(expected, vec!["E", "N", "e", "n"]);
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(p.one_of_map_or(&map, 9), 9);
        assert_eq!(p.rest(), "x");
    }

    #[test]
    fn test_one_of_words_is_case_insensitive() {
        let words = [("meters", 1), ("feet", 2)];
        let mut p = parser("FEET rest");
        assert_eq!(p.one_of_words(&words).unwrap(), 2);
        assert_eq!(p.rest(), " rest");

        let mut p = parser("yards");
        let err = p.one_of_words(&words).unwrap_err();
        match err {
            WallsError::UnexpectedInput { expected, segment } => {
                assert_eq!(expected, vec!["meters", "feet"]);
                assert_eq!(segment.value(), "yards");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_expect_regex_is_anchored() {
        let digits = Regex::new(r"^[0-9]+").unwrap();
        let mut p = parser("x12");
        assert!(p.expect_regex(&digits, "<NUMBER>").is_err());
        p.expect_char('x').unwrap();
        assert_eq!(p.expect_regex(&digits, "<NUMBER>").unwrap().value(), "12");
    }
}
