//! Consumer interface for parse results.

use time::Date;

use super::types::{FixedStation, Lrud, Vector, WallsEvent};
use super::units::WallsUnits;

/// Receives the constructs the parser recognizes.
///
/// Every method has an empty default so consumers only implement what
/// they care about. Calls are made only for lines that parsed
/// successfully, in source order.
pub trait WallsVisitor {
    /// A `#UNITS` line changed the active units.
    fn units_changed(&mut self, _units: &WallsUnits) {}

    fn vector(&mut self, _vector: &Vector) {}

    /// A line holding only a station and its LRUDs.
    fn lruds(&mut self, _station: &str, _lruds: &Lrud) {}

    fn fixed_station(&mut self, _station: &FixedStation) {}

    fn note(&mut self, _station: &str, _note: &str) {}

    /// `#FLAG` with a station list. `flag` is `None` when no `/name` was given.
    fn flagged_stations(&mut self, _flag: Option<&str>, _stations: &[String]) {}

    fn date(&mut self, _date: Date) {}

    fn segment_changed(&mut self, _segment: &[String]) {}

    /// A full-line, inline or block comment.
    fn comment(&mut self, _comment: &str) {}
}

impl WallsEvent {
    /// Deliver this event to `visitor`.
    pub fn dispatch(&self, visitor: &mut dyn WallsVisitor) {
        match self {
            Self::UnitsChanged { units } => visitor.units_changed(units),
            Self::Vector(vector) => visitor.vector(vector),
            Self::Lruds { station, lruds } => visitor.lruds(station, lruds),
            Self::FixedStation(station) => visitor.fixed_station(station),
            Self::Note { station, note } => visitor.note(station, note),
            Self::FlaggedStations { flag, stations } => {
                visitor.flagged_stations(flag.as_deref(), stations)
            }
            Self::Date { date } => visitor.date(*date),
            Self::SegmentChanged { segment } => visitor.segment_changed(segment),
            Self::Comment { comment } => visitor.comment(comment),
        }
    }
}

/// A visitor that records every event.
#[derive(Debug, Default)]
pub struct EventCollector {
    pub events: Vec<WallsEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded vectors, in order.
    pub fn vectors(&self) -> impl Iterator<Item = &Vector> {
        self.events.iter().filter_map(|event| match event {
            WallsEvent::Vector(vector) => Some(vector.as_ref()),
            _ => None,
        })
    }
}

impl WallsVisitor for EventCollector {
    fn units_changed(&mut self, units: &WallsUnits) {
        self.events.push(WallsEvent::UnitsChanged {
            units: units.clone(),
        });
    }

    fn vector(&mut self, vector: &Vector) {
        self.events.push(WallsEvent::Vector(Box::new(vector.clone())));
    }

    fn lruds(&mut self, station: &str, lruds: &Lrud) {
        self.events.push(WallsEvent::Lruds {
            station: station.to_string(),
            lruds: lruds.clone(),
        });
    }

    fn fixed_station(&mut self, station: &FixedStation) {
        self.events
            .push(WallsEvent::FixedStation(Box::new(station.clone())));
    }

    fn note(&mut self, station: &str, note: &str) {
        self.events.push(WallsEvent::Note {
            station: station.to_string(),
            note: note.to_string(),
        });
    }

    fn flagged_stations(&mut self, flag: Option<&str>, stations: &[String]) {
        self.events.push(WallsEvent::FlaggedStations {
            flag: flag.map(str::to_string),
            stations: stations.to_vec(),
        });
    }

    fn date(&mut self, date: Date) {
        self.events.push(WallsEvent::Date { date });
    }

    fn segment_changed(&mut self, segment: &[String]) {
        self.events.push(WallsEvent::SegmentChanged {
            segment: segment.to_vec(),
        });
    }

    fn comment(&mut self, comment: &str) {
        self.events.push(WallsEvent::Comment {
            comment: comment.to_string(),
        });
    }
}
