//! Parser for Walls `.srv` survey files.
//!
//! Walls survey data is line-oriented. Each line is a comment, a `#`
//! directive or a data line; numeric readings are interpreted in the unit
//! context set up by earlier `#UNITS` lines.
//!
//! # Grammar Overview
//!
//! ```text
//! line        = blank | comment | block_comment | directive | vector | lrud_line
//! comment     = ';' { any_char }
//! block       = ('#[' | '/*') ... ('#]' | '*/')      spanning whole lines
//! directive   = '#' keyword arguments [comment]
//! vector      = station station measurements [variance] [lruds] [inline_segment] [comment]
//! lrud_line   = station lruds [comment]
//!
//! keyword     = "units" | "date" | "flag" | "segment" | "prefix[123]"
//!             | "note" | "symbol" | "fix"        (case-insensitive, abbreviable)
//! station     = [prefix ':' ]{0,3} name          name is 1-8 characters
//! ct          = distance azimuth ['/' azimuth] [inclination ['/' inclination]]
//! rect        = east north [up]
//! variance    = '(' [override] [',' [override]] ')'
//! override    = '?' | '*' | length | 'R' length
//! lruds       = '<' values [azimuth] ['C'] '>' | '*' values [azimuth] ['C'] '*'
//!
//! length      = number ['m' | 'f' | 'i' number] | 'i' number
//! angle       = number [unit letter] | deg ':' [min] [':' sec]
//! azimuth     = angle | N|S [angle E|W] | E|W [angle N|S]
//! ```
//!
//! Any single reading may be written `--` when it was not taken, and
//! `$(name)` is replaced by the value of a macro defined with
//! `#UNITS $name=value` before the line is parsed.
//!
//! # Example
//!
//! ```text
//! #UNITS FEET ORDER=DAV
//! #SEGMENT /Main Cave/Entrance Series
//! #DATE 2001-07-04
//! A1  A2  12.5  N45E  -5   <2,3,4,1>   ; breakdown
//! A2  A3  8i6   250   +12  (R2)
//! ```

mod config;
mod directives;
mod measurements;
mod parser;
mod tables;
mod types;
mod units;
mod units_options;
mod variance;
mod vector;
mod visitor;

pub use config::{ParserConfig, DEFAULT_MAX_UNITS_STACK_DEPTH};
pub use parser::WallsParser;
pub use types::{FixedStation, Lrud, Vector, WallsEvent};
pub use units::{
    BacksightType, CaseType, CtElement, LrudElement, LrudType, RectElement, TapingMethodElement,
    VectorType, WallsUnits,
};
pub use variance::VarianceOverride;
pub use visitor::{EventCollector, WallsVisitor};

use crate::error::WallsError;

/// Parse survey text with the default configuration.
///
/// Returns the errors of lines that could not be parsed; every other line
/// has been reported to `visitor`.
pub fn parse(text: &str, visitor: &mut dyn WallsVisitor) -> Vec<WallsError> {
    parse_with_config(text, ParserConfig::default(), visitor)
}

pub fn parse_with_config(
    text: &str,
    config: ParserConfig,
    visitor: &mut dyn WallsVisitor,
) -> Vec<WallsError> {
    WallsParser::with_config(config).parse_text(text, visitor)
}

/// Parse a survey file.
///
/// The file path becomes the source name in error locations unless
/// `config` already names one.
pub fn parse_file(
    path: &std::path::Path,
    config: ParserConfig,
    visitor: &mut dyn WallsVisitor,
) -> crate::error::Result<Vec<WallsError>> {
    let content = std::fs::read_to_string(path).map_err(|e| WallsError::FileRead {
        path: path.display().to_string(),
        source: e,
    })?;
    let config = match config.source_name {
        Some(_) => config,
        None => config.with_source_name(path.display().to_string()),
    };
    Ok(parse_with_config(&content, config, visitor))
}
