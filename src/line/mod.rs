//! Line-oriented parsing runtime.
//!
//! This module provides the grammar-independent pieces: [`Segment`], a
//! located slice of source text, and the [`LineParser`] combinators that
//! consume one line at a time with backtracking.

mod parser;
mod segment;

pub use parser::{LineParser, LineState};
pub use segment::Segment;
