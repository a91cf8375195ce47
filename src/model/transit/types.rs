use geo::Point;

use crate::loading::gtfs::FeedInfo;
use crate::{PatternId, StopId, Time};

/// Transit stop vertex.
#[derive(Debug, Clone)]
pub struct Stop {
    /// Feed identifier of the stop
    pub stop_id: String,
    pub name: String,
    /// Stop coordinates
    pub geometry: Point<f64>,
}

/// Trips of one route sharing an ordered stop sequence.
///
/// Stop ids live in `TransitData::pattern_stops` starting at `stops_start`;
/// stop times live in `TransitData::stop_times` starting at `times_start`,
/// laid out trip-major (`num_trips` blocks of `num_stops` entries).
#[derive(Debug, Clone)]
pub struct TripPattern {
    pub route_id: String,
    pub num_trips: usize,
    pub num_stops: usize,
    pub stops_start: usize,
    pub times_start: usize,
}

/// Arrival and departure at one stop of one trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopTime {
    pub arrival: Time,
    pub departure: Time,
}

/// Scheduled movement between two consecutive stops of a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HopEdge {
    pub pattern: PatternId,
    pub from: StopId,
    pub to: StopId,
    pub departure: Time,
    pub arrival: Time,
}

/// Metadata for feeds
#[derive(Debug, Clone)]
pub struct FeedMeta {
    pub feed_info: FeedInfo,
}
