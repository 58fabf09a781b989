//! Located slices of source text.

use std::fmt;
use std::sync::Arc;

/// An immutable view over part of one line of source text.
///
/// A segment remembers which file and line it came from and the column
/// at which it starts, so that any sub-range cut from it during parsing
/// can still be reported at its exact location.
///
/// Line and column are stored zero-based and displayed one-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    text: Arc<str>,
    source: Option<Arc<str>>,
    start: usize,
    end: usize,
    line: usize,
    column: usize,
}

impl Segment {
    /// Create a segment covering all of `text`.
    pub fn new(text: impl Into<Arc<str>>, source: Option<&str>, line: usize, column: usize) -> Self {
        let text = text.into();
        Self {
            end: text.len(),
            text,
            source: source.map(Arc::from),
            start: 0,
            line,
            column,
        }
    }

    /// A new segment with different text but the same provenance.
    ///
    /// Used when a line is rewritten before parsing (macro expansion).
    pub fn with_text(&self, text: impl Into<Arc<str>>) -> Self {
        let text = text.into();
        Self {
            end: text.len(),
            text,
            source: self.source.clone(),
            start: 0,
            line: self.line,
            column: self.column,
        }
    }

    /// The text this segment covers.
    pub fn value(&self) -> &str {
        &self.text[self.start..self.end]
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Name of the file (or other source) the text came from.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Zero-based line number.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Zero-based column of the first character.
    pub fn column(&self) -> usize {
        self.column
    }

    /// Byte offset of this segment within its line.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset just past the end of this segment within its line.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Cut a sub-range; `start` and `end` are byte offsets relative to this segment.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds or not on character boundaries.
    pub fn sub(&self, start: usize, end: usize) -> Segment {
        assert!(start <= end && end <= self.len(), "segment range out of bounds");
        let skipped = self.value()[..start].chars().count();
        Segment {
            text: Arc::clone(&self.text),
            source: self.source.clone(),
            start: self.start + start,
            end: self.start + end,
            line: self.line,
            column: self.column + skipped,
        }
    }

    /// Everything from `start` to the end of this segment.
    pub fn sub_from(&self, start: usize) -> Segment {
        self.sub(start, self.len())
    }

    /// This segment without leading and trailing whitespace.
    pub fn trim(&self) -> Segment {
        let value = self.value();
        let leading = value.len() - value.trim_start().len();
        let trailing = value.trim_end().len();
        if trailing <= leading {
            return self.sub(leading, leading);
        }
        self.sub(leading, trailing)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "{}:", source)?;
        }
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_tracks_column() {
        let line = Segment::new("  A1 B1 10.5", Some("a.srv"), 2, 0);
        let to = line.sub(5, 7);
        assert_eq!(to.value(), "B1");
        assert_eq!(to.column(), 5);
        assert_eq!(to.line(), 2);
        assert_eq!(to.start(), 5);

        let number = to.sub_from(0).sub(1, 2);
        assert_eq!(number.value(), "1");
        assert_eq!(number.column(), 6);
    }

    #[test]
    fn test_sub_counts_characters_not_bytes() {
        let line = Segment::new("\u{e9}\u{e9} x", None, 0, 3);
        let x = line.sub(5, 6);
        assert_eq!(x.value(), "x");
        assert_eq!(x.column(), 3 + 3);
    }

    #[test]
    fn test_trim() {
        let line = Segment::new("   note text  ", None, 0, 0);
        assert_eq!(line.trim().value(), "note text");
        assert_eq!(line.trim().column(), 3);
        assert!(Segment::new("   ", None, 0, 0).trim().is_empty());
    }

    #[test]
    fn test_display() {
        let line = Segment::new("x", None, 9, 4);
        assert_eq!(line.to_string(), "10:5");
    }
}
