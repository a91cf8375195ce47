//! Transit data structure and methods to work with it

use geo::Point;

use super::types::{FeedMeta, HopEdge, Stop, StopTime, TripPattern};
use crate::{PatternId, StopId};

/// Flat transit pattern model produced by the pattern builder.
#[derive(Debug, Default)]
pub struct TransitData {
    /// All stops
    pub stops: Vec<Stop>,
    /// All trip patterns
    pub patterns: Vec<TripPattern>,
    /// Stop sequence for each pattern
    pub pattern_stops: Vec<StopId>,
    /// Schedule for each pattern, trip-major
    pub stop_times: Vec<StopTime>,
    /// Metadata for feeds
    pub feeds_meta: Vec<FeedMeta>,
}

impl TransitData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop sequence of the given pattern.
    pub fn pattern_stop_ids(&self, pattern: PatternId) -> Option<&[StopId]> {
        let p = self.patterns.get(pattern)?;
        self.pattern_stops.get(p.stops_start..p.stops_start + p.num_stops)
    }

    /// `StopTime` slice for one trip of one pattern.
    pub fn trip_times(&self, pattern: PatternId, trip: usize) -> Option<&[StopTime]> {
        let p = self.patterns.get(pattern)?;
        if trip >= p.num_trips {
            return None;
        }
        let start = p.times_start + trip * p.num_stops;
        self.stop_times.get(start..start + p.num_stops)
    }

    /// Number of time-expanded hop edges across all patterns.
    pub fn hop_edge_count(&self) -> usize {
        self.patterns
            .iter()
            .map(|p| p.num_trips * p.num_stops.saturating_sub(1))
            .sum()
    }

    /// Iterate all time-expanded hop edges.
    pub fn hop_edges(&self) -> impl Iterator<Item = HopEdge> + '_ {
        self.patterns.iter().enumerate().flat_map(move |(pid, pattern)| {
            let stops = &self.pattern_stops[pattern.stops_start..pattern.stops_start + pattern.num_stops];
            (0..pattern.num_trips).flat_map(move |trip| {
                let start = pattern.times_start + trip * pattern.num_stops;
                let times = &self.stop_times[start..start + pattern.num_stops];
                (0..pattern.num_stops.saturating_sub(1)).map(move |i| HopEdge {
                    pattern: pid,
                    from: stops[i],
                    to: stops[i + 1],
                    departure: times[i].departure,
                    arrival: times[i + 1].arrival,
                })
            })
        })
    }

    /// Get the location of a transit stop by dense index.
    pub fn stop_location(&self, stop: StopId) -> Option<Point<f64>> {
        self.stops.get(stop).map(|s| s.geometry)
    }

    /// Resolve a feed stop identifier to its dense index.
    pub fn stop_index(&self, stop_id: &str) -> Option<StopId> {
        self.stops.iter().position(|s| s.stop_id == stop_id)
    }
}
