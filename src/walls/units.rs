//! The unit and convention context that `#UNITS` directives change.

use serde::Serialize;

use crate::unit::{AngleUnit, LengthUnit, UAngle, ULength};

/// How a shot's measurements are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VectorType {
    /// Compass and tape: distance, azimuth, inclination
    Ct,
    /// Rectangular: east, north, up offsets
    Rect,
}

/// Compass-and-tape measurement codes for `ORDER=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CtElement {
    /// Distance
    D,
    /// Azimuth
    A,
    /// Vertical angle (inclination)
    V,
}

/// Rectangular measurement codes for `ORDER=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RectElement {
    /// East
    E,
    /// North
    N,
    /// Up
    U,
}

/// Wall distance codes for `LRUD=...:order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LrudElement {
    L,
    R,
    U,
    D,
}

/// Which station a shot's LRUDs were taken at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LrudType {
    From,
    To,
    /// From station, perpendicular to the shot bisector
    FB,
    /// To station, perpendicular to the shot bisector
    TB,
}

/// Case transformation applied to station names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CaseType {
    Upper,
    Lower,
    Mixed,
}

impl CaseType {
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::Upper => text.to_uppercase(),
            Self::Lower => text.to_lowercase(),
            Self::Mixed => text.to_string(),
        }
    }
}

/// The points a taped distance was measured between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TapingMethodElement {
    InstrumentHeight,
    TargetHeight,
    Station,
}

/// How backsights relate to frontsights (`TYPEAB=` / `TYPEVB=`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BacksightType {
    /// Backsights were already corrected to read like frontsights
    pub corrected: bool,
    /// Allowed frontsight/backsight disagreement, in degrees
    pub tolerance: f64,
    /// Use the frontsight alone instead of averaging
    pub no_average: bool,
}

impl Default for BacksightType {
    fn default() -> Self {
        Self {
            corrected: false,
            tolerance: 2.0,
            no_average: false,
        }
    }
}

/// The currently active unit and convention settings.
///
/// Every numeric literal on a data line is read in the context of one of
/// these. `#UNITS SAVE`/`RESTORE` push and pop copies of it; `#UNITS RESET`
/// replaces it with [`WallsUnits::default`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WallsUnits {
    pub vector_type: VectorType,
    pub ct_order: Vec<CtElement>,
    pub rect_order: Vec<RectElement>,
    /// Distance unit
    pub d_unit: LengthUnit,
    /// LRUD and instrument/target height unit
    pub s_unit: LengthUnit,
    /// Frontsight azimuth unit
    pub a_unit: AngleUnit,
    /// Backsight azimuth unit
    pub ab_unit: AngleUnit,
    /// Frontsight inclination unit
    pub v_unit: AngleUnit,
    /// Backsight inclination unit
    pub vb_unit: AngleUnit,
    pub decl: UAngle,
    pub grid: UAngle,
    pub rect: UAngle,
    pub incd: ULength,
    pub inch: ULength,
    pub incs: ULength,
    pub inca: UAngle,
    pub incab: UAngle,
    pub incv: UAngle,
    pub incvb: UAngle,
    pub typeab: BacksightType,
    pub typevb: BacksightType,
    pub case_type: CaseType,
    pub lrud_type: LrudType,
    pub lrud_order: Vec<LrudElement>,
    pub tape: Vec<TapingMethodElement>,
    /// Station prefixes; index 0 is `PREFIX1`, the level closest to the name
    pub prefix: [Option<String>; 3],
    /// Horizontal variance scale factor
    pub uvh: f64,
    /// Vertical variance scale factor
    pub uvv: f64,
    pub flag: Option<String>,
    /// Current `#SEGMENT` path, outermost first
    pub segment: Vec<String>,
}

impl Default for WallsUnits {
    fn default() -> Self {
        let zero_length = ULength::new(0.0, LengthUnit::Meters);
        let zero_angle = UAngle::new(0.0, AngleUnit::Degrees);
        Self {
            vector_type: VectorType::Ct,
            ct_order: vec![CtElement::D, CtElement::A, CtElement::V],
            rect_order: vec![RectElement::E, RectElement::N, RectElement::U],
            d_unit: LengthUnit::Meters,
            s_unit: LengthUnit::Meters,
            a_unit: AngleUnit::Degrees,
            ab_unit: AngleUnit::Degrees,
            v_unit: AngleUnit::Degrees,
            vb_unit: AngleUnit::Degrees,
            decl: zero_angle,
            grid: zero_angle,
            rect: zero_angle,
            incd: zero_length,
            inch: zero_length,
            incs: zero_length,
            inca: zero_angle,
            incab: zero_angle,
            incv: zero_angle,
            incvb: zero_angle,
            typeab: BacksightType::default(),
            typevb: BacksightType::default(),
            case_type: CaseType::Mixed,
            lrud_type: LrudType::From,
            lrud_order: vec![LrudElement::L, LrudElement::R, LrudElement::U, LrudElement::D],
            tape: vec![
                TapingMethodElement::InstrumentHeight,
                TapingMethodElement::TargetHeight,
            ],
            prefix: [None, None, None],
            uvh: 1.0,
            uvv: 1.0,
            flag: None,
            segment: Vec::new(),
        }
    }
}

impl WallsUnits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the distance and LRUD units together (`METERS` / `FEET`).
    pub fn set_length_unit(&mut self, unit: LengthUnit) {
        self.d_unit = unit;
        self.s_unit = unit;
    }

    /// Set prefix level `index` (0-based); empty text clears it.
    pub fn set_prefix(&mut self, index: usize, prefix: Option<String>) {
        if let Some(slot) = self.prefix.get_mut(index) {
            *slot = prefix.filter(|p| !p.is_empty());
        }
    }

    /// Apply the case mode and prefixes to a station name as written.
    ///
    /// Each `:` in `name` supplies one prefix level explicitly, replacing
    /// the innermost configured levels; the remaining outer levels are
    /// prepended, empty ones included so every name keeps its level
    /// structure. Leading colons are dropped.
    pub fn process_station_name(&self, name: &str) -> String {
        let name = self.case_type.apply(name);
        let explicit = name.matches(':').count();
        let mut result = name;
        for prefix in self.prefix.iter().skip(explicit) {
            let prefix = prefix.as_deref().unwrap_or_default();
            result = format!("{}:{}", self.case_type.apply(prefix), result);
        }
        result.trim_start_matches(':').to_string()
    }

    /// Resolve a `#SEGMENT` path against the current segment.
    ///
    /// A leading `/` starts from the root, `..` goes up one level and `.`
    /// stays put.
    pub fn resolve_segment(&self, path: &str) -> Vec<String> {
        let mut segment = if path.starts_with('/') || path.starts_with('\\') {
            Vec::new()
        } else {
            self.segment.clone()
        };
        for part in path.split(['/', '\\']).map(str::trim) {
            match part {
                "" | "." => {}
                ".." => {
                    segment.pop();
                }
                part => segment.push(part.to_string()),
            }
        }
        segment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let units = WallsUnits::default();
        assert_eq!(units.vector_type, VectorType::Ct);
        assert_eq!(units.d_unit, LengthUnit::Meters);
        assert_eq!(units.ct_order, vec![CtElement::D, CtElement::A, CtElement::V]);
        assert_eq!(units.lrud_type, LrudType::From);
        assert_eq!(units.uvh, 1.0);
    }

    #[test]
    fn test_station_prefixes() {
        let mut units = WallsUnits::default();
        assert_eq!(units.process_station_name("A1"), "A1");

        units.set_prefix(0, Some("P1".into()));
        units.set_prefix(1, Some("P2".into()));
        assert_eq!(units.process_station_name("A1"), "P2:P1:A1");
        assert_eq!(units.process_station_name("X:A1"), "P2:X:A1");
        assert_eq!(units.process_station_name(":A1"), "P2::A1");
        assert_eq!(units.process_station_name("Y:X:A1"), "Y:X:A1");

        units.set_prefix(1, Some(String::new()));
        assert_eq!(units.process_station_name("A1"), "P1:A1");

        units.set_prefix(0, None);
        units.set_prefix(1, Some("P2".into()));
        assert_eq!(units.process_station_name("A1"), "P2::A1");
    }

    #[test]
    fn test_station_case() {
        let mut units = WallsUnits::default();
        units.case_type = CaseType::Upper;
        units.set_prefix(0, Some("cave".into()));
        assert_eq!(units.process_station_name("a1"), "CAVE:A1");
    }

    #[test]
    fn test_resolve_segment() {
        let mut units = WallsUnits::default();
        units.segment = units.resolve_segment("/North/Upper");
        assert_eq!(units.segment, vec!["North", "Upper"]);
        assert_eq!(units.resolve_segment("../Lower"), vec!["North", "Lower"]);
        assert_eq!(units.resolve_segment("Side"), vec!["North", "Upper", "Side"]);
        assert_eq!(units.resolve_segment("/"), Vec::<String>::new());
    }
}
