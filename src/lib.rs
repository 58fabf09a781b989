//! # Walls Core
//!
//! A parser for cave survey data in the Walls `.srv` format.
//!
//! This library provides:
//! - A small backtracking combinator runtime for line-oriented grammars
//! - Unit-tagged lengths and angles with conversion between units
//! - The full Walls line grammar: `#UNITS` options, directives, macros,
//!   compass-and-tape and rectangular vectors, LRUDs and variance overrides
//! - A visitor interface that reports every parsed construct in order
//!
//! ## Architecture
//!
//! - [`line`] - Located text segments and the parsing combinators
//! - [`unit`] - Length and angle units, cardinal directions
//! - [`walls`] - The Walls grammar, unit context and output model
//! - [`error`] - Error type with source locations
//!
//! ## Usage
//!
//! ```
//! use walls_core::walls::{self, EventCollector};
//!
//! let mut events = EventCollector::new();
//! let errors = walls::parse("#units feet\nA1 A2 10 N45E -5\n", &mut events);
//! assert!(errors.is_empty());
//! assert_eq!(events.vectors().count(), 1);
//! ```
//!
//! ### Native CLI
//!
//! ```bash
//! walls cave.srv > events.jsonl
//! ```
//!
//! ## Error Handling
//!
//! Parsing never stops at a bad line. Each line either parses completely
//! and is reported to the visitor, or fails with a [`WallsError`] pointing
//! at `file:line:column` and leaves the parser state as it was before the
//! line.

pub mod error;
pub mod line;
pub mod unit;
pub mod walls;

// Re-export main types for convenience
pub use error::{Result, WallsError};
pub use line::Segment;
pub use walls::{ParserConfig, WallsParser, WallsUnits, WallsVisitor};
