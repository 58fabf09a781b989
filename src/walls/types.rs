//! Values produced by parsing survey data lines.

use serde::Serialize;
use time::Date;

use crate::line::Segment;
use crate::unit::{UAngle, ULength};

use super::units::WallsUnits;
use super::variance::VarianceOverride;

/// Wall distances taken at a station.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Lrud {
    pub left: Option<ULength>,
    pub right: Option<ULength>,
    pub up: Option<ULength>,
    pub down: Option<ULength>,
    /// Direction the reader was facing, if not along the shot
    pub facing_azimuth: Option<UAngle>,
    /// `C` flag: LRUDs are normal to the shot rather than its bisector
    pub c_flag: bool,
}

/// One measured shot between two stations.
///
/// Only the fields that apply to the vector type in effect are filled:
/// distance/azimuth/inclination for compass-and-tape shots, east/north/up
/// for rectangular ones. Readings written as `--` are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vector {
    #[serde(skip)]
    pub source: Segment,
    pub from: String,
    pub to: String,
    pub distance: Option<ULength>,
    pub frontsight_azimuth: Option<UAngle>,
    pub backsight_azimuth: Option<UAngle>,
    pub frontsight_inclination: Option<UAngle>,
    pub backsight_inclination: Option<UAngle>,
    pub instrument_height: Option<ULength>,
    pub target_height: Option<ULength>,
    pub east: Option<ULength>,
    pub north: Option<ULength>,
    pub up: Option<ULength>,
    pub horizontal_variance: Option<VarianceOverride>,
    pub vertical_variance: Option<VarianceOverride>,
    pub lruds: Option<Lrud>,
    pub segment: Vec<String>,
    pub comment: Option<String>,
    /// Units in effect when the shot was read
    pub units: WallsUnits,
}

impl Vector {
    pub(crate) fn new(source: Segment, from: String, to: String, units: &WallsUnits) -> Self {
        Self {
            source,
            from,
            to,
            distance: None,
            frontsight_azimuth: None,
            backsight_azimuth: None,
            frontsight_inclination: None,
            backsight_inclination: None,
            instrument_height: None,
            target_height: None,
            east: None,
            north: None,
            up: None,
            horizontal_variance: None,
            vertical_variance: None,
            lruds: None,
            segment: units.segment.clone(),
            comment: None,
            units: units.clone(),
        }
    }
}

/// A `#FIX` directive: a station with known coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixedStation {
    #[serde(skip)]
    pub source: Segment,
    pub name: String,
    pub east: Option<ULength>,
    pub north: Option<ULength>,
    pub up: Option<ULength>,
    pub longitude: Option<UAngle>,
    pub latitude: Option<UAngle>,
    pub horizontal_variance: Option<VarianceOverride>,
    pub vertical_variance: Option<VarianceOverride>,
    pub note: Option<String>,
    pub segment: Vec<String>,
    pub comment: Option<String>,
    pub units: WallsUnits,
}

/// Everything the parser reports, in the order it was read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WallsEvent {
    UnitsChanged { units: WallsUnits },
    Vector(Box<Vector>),
    Lruds { station: String, lruds: Lrud },
    FixedStation(Box<FixedStation>),
    Note { station: String, note: String },
    FlaggedStations { flag: Option<String>, stations: Vec<String> },
    Date { date: Date },
    SegmentChanged { segment: Vec<String> },
    Comment { comment: String },
}
