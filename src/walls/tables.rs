//! Static lookup tables and token patterns for the Walls grammar.
//!
//! All tables are built once on first use and shared read-only by every
//! parser instance.

use std::collections::HashMap;
use std::hash::Hash;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::unit::{AngleUnit, CardinalDirection, LengthUnit};

use super::units::{CaseType, CtElement, LrudElement, LrudType, RectElement, TapingMethodElement};

/// Map both cases of each letter to its value.
fn both_cases<V: Clone>(entries: &[(char, V)]) -> HashMap<char, V> {
    entries
        .iter()
        .flat_map(|(c, v)| [(c.to_ascii_lowercase(), v.clone()), (c.to_ascii_uppercase(), v.clone())])
        .collect()
}

fn set_of<T: Eq + Hash + Copy>(items: &[T]) -> std::collections::HashSet<T> {
    items.iter().copied().collect()
}

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {:?}: {}", pattern, e))
}

pub(crate) const LENGTH_UNITS: &[(&str, LengthUnit)] = &[
    ("meters", LengthUnit::Meters),
    ("meter", LengthUnit::Meters),
    ("m", LengthUnit::Meters),
    ("feet", LengthUnit::Feet),
    ("foot", LengthUnit::Feet),
    ("ft", LengthUnit::Feet),
    ("f", LengthUnit::Feet),
];

pub(crate) const AZM_UNITS: &[(&str, AngleUnit)] = &[
    ("degrees", AngleUnit::Degrees),
    ("degree", AngleUnit::Degrees),
    ("deg", AngleUnit::Degrees),
    ("d", AngleUnit::Degrees),
    ("mills", AngleUnit::Mils),
    ("mils", AngleUnit::Mils),
    ("mil", AngleUnit::Mils),
    ("m", AngleUnit::Mils),
    ("grads", AngleUnit::Gradians),
    ("grad", AngleUnit::Gradians),
    ("g", AngleUnit::Gradians),
];

pub(crate) const INC_UNITS: &[(&str, AngleUnit)] = &[
    ("degrees", AngleUnit::Degrees),
    ("degree", AngleUnit::Degrees),
    ("deg", AngleUnit::Degrees),
    ("d", AngleUnit::Degrees),
    ("mills", AngleUnit::Mils),
    ("mils", AngleUnit::Mils),
    ("mil", AngleUnit::Mils),
    ("m", AngleUnit::Mils),
    ("grads", AngleUnit::Gradians),
    ("grad", AngleUnit::Gradians),
    ("g", AngleUnit::Gradians),
    ("percent", AngleUnit::PercentGrade),
    ("p", AngleUnit::PercentGrade),
];

pub(crate) const CORRECTED_VALUES: &[(&str, bool)] = &[
    ("corrected", true),
    ("c", true),
    ("normal", false),
    ("n", false),
];

pub(crate) const CASE_TYPES: &[(&str, CaseType)] = &[
    ("upper", CaseType::Upper),
    ("u", CaseType::Upper),
    ("lower", CaseType::Lower),
    ("l", CaseType::Lower),
    ("mixed", CaseType::Mixed),
    ("m", CaseType::Mixed),
];

pub(crate) const LRUD_TYPES: &[(&str, LrudType)] = &[
    ("from", LrudType::From),
    ("f", LrudType::From),
    ("to", LrudType::To),
    ("t", LrudType::To),
    ("fb", LrudType::FB),
    ("tb", LrudType::TB),
];

pub(crate) const TAPING_METHODS: &[(&str, &[TapingMethodElement])] = {
    use TapingMethodElement::*;
    &[
        ("it", &[InstrumentHeight, TargetHeight]),
        ("is", &[InstrumentHeight, Station]),
        ("st", &[Station, TargetHeight]),
        ("ss", &[Station, Station]),
    ]
};

pub(crate) static LENGTH_UNIT_SUFFIXES: Lazy<HashMap<char, LengthUnit>> = Lazy::new(|| {
    both_cases(&[
        ('m', LengthUnit::Meters),
        ('f', LengthUnit::Feet),
        ('i', LengthUnit::Inches),
    ])
});

pub(crate) static AZM_UNIT_SUFFIXES: Lazy<HashMap<char, AngleUnit>> = Lazy::new(|| {
    both_cases(&[
        ('d', AngleUnit::Degrees),
        ('g', AngleUnit::Gradians),
        ('m', AngleUnit::Mils),
    ])
});

pub(crate) static INC_UNIT_SUFFIXES: Lazy<HashMap<char, AngleUnit>> = Lazy::new(|| {
    both_cases(&[
        ('d', AngleUnit::Degrees),
        ('g', AngleUnit::Gradians),
        ('m', AngleUnit::Mils),
        ('p', AngleUnit::PercentGrade),
    ])
});

pub(crate) static CARDINAL_DIRECTIONS: Lazy<HashMap<char, CardinalDirection>> = Lazy::new(|| {
    both_cases(&[
        ('n', CardinalDirection::North),
        ('s', CardinalDirection::South),
        ('e', CardinalDirection::East),
        ('w', CardinalDirection::West),
    ])
});

pub(crate) static NORTH_SOUTH: Lazy<HashMap<char, CardinalDirection>> = Lazy::new(|| {
    both_cases(&[
        ('n', CardinalDirection::North),
        ('s', CardinalDirection::South),
    ])
});

pub(crate) static EAST_WEST: Lazy<HashMap<char, CardinalDirection>> = Lazy::new(|| {
    both_cases(&[
        ('e', CardinalDirection::East),
        ('w', CardinalDirection::West),
    ])
});

pub(crate) static ESCAPED_CHARS: Lazy<HashMap<char, char>> = Lazy::new(|| {
    [
        ('r', '\r'),
        ('n', '\n'),
        ('f', '\u{c}'),
        ('t', '\t'),
        ('"', '"'),
        ('\\', '\\'),
    ]
    .into_iter()
    .collect()
});

pub(crate) static CT_ELEMENTS: Lazy<HashMap<char, CtElement>> = Lazy::new(|| {
    both_cases(&[('d', CtElement::D), ('a', CtElement::A), ('v', CtElement::V)])
});

pub(crate) static REQUIRED_CT_ELEMENTS: Lazy<std::collections::HashSet<CtElement>> =
    Lazy::new(|| set_of(&[CtElement::D, CtElement::A]));

pub(crate) static RECT_ELEMENTS: Lazy<HashMap<char, RectElement>> = Lazy::new(|| {
    both_cases(&[('e', RectElement::E), ('n', RectElement::N), ('u', RectElement::U)])
});

pub(crate) static REQUIRED_RECT_ELEMENTS: Lazy<std::collections::HashSet<RectElement>> =
    Lazy::new(|| set_of(&[RectElement::E, RectElement::N]));

pub(crate) static LRUD_ELEMENTS: Lazy<HashMap<char, LrudElement>> = Lazy::new(|| {
    both_cases(&[
        ('l', LrudElement::L),
        ('r', LrudElement::R),
        ('u', LrudElement::U),
        ('d', LrudElement::D),
    ])
});

pub(crate) static REQUIRED_LRUD_ELEMENTS: Lazy<std::collections::HashSet<LrudElement>> =
    Lazy::new(|| set_of::<LrudElement>(&[]));

/// A run of digits and dots; validated as a number after matching.
pub(crate) static NUMBER_TOKEN: Lazy<Regex> = Lazy::new(|| regex(r"^[0-9.]+"));

/// Up to three `prefix:` levels followed by a name of at most 8 characters.
pub(crate) static STATION: Lazy<Regex> = Lazy::new(|| regex(r"^([^:;,#/\s]*:){0,3}[^:;,#/\s]{1,8}"));

pub(crate) static MACRO_NAME: Lazy<Regex> = Lazy::new(|| regex(r#"^[^\s"=;,()]+"#));

/// A station prefix: any station characters, possibly none.
pub(crate) static PREFIX: Lazy<Regex> = Lazy::new(|| regex(r"^[^:;,#/\s]*"));

/// An unquoted option value.
pub(crate) static NONWHITESPACE: Lazy<Regex> = Lazy::new(|| regex(r"^[^\s;,]+"));

pub(crate) static UNTIL_COMMENT: Lazy<Regex> = Lazy::new(|| regex(r"^[^;]*"));

/// Two or more dashes mark a reading that was not taken.
pub(crate) static OMITTED: Lazy<Regex> = Lazy::new(|| regex(r"^--+"));

pub(crate) static ISO_DATE: Lazy<Regex> = Lazy::new(|| regex(r"^[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}"));

pub(crate) static US_DATE1: Lazy<Regex> =
    Lazy::new(|| regex(r"^([0-9]{1,2}-[0-9]{1,2}-|[0-9]{1,2}/[0-9]{1,2}/)[0-9]{4}"));

pub(crate) static US_DATE2: Lazy<Regex> =
    Lazy::new(|| regex(r"^([0-9]{1,2}-[0-9]{1,2}-|[0-9]{1,2}/[0-9]{1,2}/)[0-9]{2}"));

/// Directive keywords after `#`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Directive {
    Units,
    Date,
    Flag,
    Segment,
    Prefix(usize),
    Note,
    Symbol,
    Fix,
}

pub(crate) const DIRECTIVES: &[(&str, Directive)] = &[
    ("units", Directive::Units),
    ("u", Directive::Units),
    ("date", Directive::Date),
    ("d", Directive::Date),
    ("flag", Directive::Flag),
    ("f", Directive::Flag),
    ("segment", Directive::Segment),
    ("seg", Directive::Segment),
    ("s", Directive::Segment),
    ("prefix", Directive::Prefix(0)),
    ("prefix1", Directive::Prefix(0)),
    ("prefix2", Directive::Prefix(1)),
    ("prefix3", Directive::Prefix(2)),
    ("note", Directive::Note),
    ("n", Directive::Note),
    ("symbol", Directive::Symbol),
    ("sym", Directive::Symbol),
    ("fix", Directive::Fix),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_tables_cover_both_cases() {
        assert_eq!(LENGTH_UNIT_SUFFIXES.get(&'F'), Some(&LengthUnit::Feet));
        assert_eq!(LENGTH_UNIT_SUFFIXES.get(&'i'), Some(&LengthUnit::Inches));
        assert_eq!(INC_UNIT_SUFFIXES.get(&'P'), Some(&AngleUnit::PercentGrade));
        assert!(AZM_UNIT_SUFFIXES.get(&'p').is_none());
    }

    #[test]
    fn test_station_pattern() {
        let m = STATION.find("A:B:C:D12345678 rest").map(|m| m.as_str());
        assert_eq!(m, Some("A:B:C:D1234567"));
        assert_eq!(STATION.find("B1;comment").map(|m| m.as_str()), Some("B1"));
        assert!(STATION.find("#seg").is_none());
    }
}
