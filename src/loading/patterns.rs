//! Trip pattern construction: groups trips sharing a route and ordered
//! stop sequence, laying their schedules out flat per pattern.

use geo::Point;
use hashbrown::HashMap;
use itertools::Itertools;
use log::{info, warn};

use crate::loading::gtfs::{FeedContext, FeedStopTime};
use crate::model::{FeedMeta, MultimodalGraph, Stop, StopTime, TransitData, TripPattern};
use crate::{Error, StopId};

/// Build trip patterns and their time-expanded hop edges into the graph.
///
/// # Errors
///
/// [`Error::DataIntegrity`] when a stop time references a stop or trip
/// the feed does not define.
pub(crate) fn build_patterns(graph: &mut MultimodalGraph, feed: &FeedContext) -> Result<(), Error> {
    let stops: Vec<Stop> = feed
        .stops
        .iter()
        .map(|s| Stop {
            stop_id: s.stop_id.clone(),
            name: s.stop_name.clone(),
            geometry: Point::new(s.stop_lon, s.stop_lat),
        })
        .collect();

    let stop_index: HashMap<&str, StopId> = feed
        .stops
        .iter()
        .enumerate()
        .map(|(idx, s)| (s.stop_id.as_str(), idx))
        .collect();
    let trip_route: HashMap<&str, &str> = feed
        .trips
        .iter()
        .map(|t| (t.trip_id.as_str(), t.route_id.as_str()))
        .collect();

    let mut by_trip: HashMap<&str, Vec<&FeedStopTime>> = HashMap::new();
    for stop_time in &feed.stop_times {
        by_trip
            .entry(stop_time.trip_id.as_str())
            .or_default()
            .push(stop_time);
    }

    // Pattern key: route plus ordered stop sequence. Trips are visited in
    // id order so the resulting layout is deterministic.
    let mut pattern_trips: HashMap<(&str, Vec<StopId>), Vec<Vec<StopTime>>> = HashMap::new();
    let mut skipped = 0usize;
    for (trip_id, mut stop_list) in by_trip.into_iter().sorted_by_key(|(trip_id, _)| *trip_id) {
        stop_list.sort_by_key(|s| s.stop_sequence);
        if stop_list.len() < 2 {
            skipped += 1;
            warn!("Trip `{trip_id}` has fewer than two stop times, no hop edges added");
            continue;
        }

        let route_id = trip_route.get(trip_id).copied().ok_or_else(|| {
            Error::DataIntegrity(format!("stop time references unknown trip `{trip_id}`"))
        })?;

        let mut sequence = Vec::with_capacity(stop_list.len());
        let mut times = Vec::with_capacity(stop_list.len());
        for stop_time in stop_list {
            let stop = *stop_index.get(stop_time.stop_id.as_str()).ok_or_else(|| {
                Error::DataIntegrity(format!(
                    "trip `{trip_id}` references unknown stop `{}`",
                    stop_time.stop_id
                ))
            })?;
            sequence.push(stop);
            times.push(StopTime {
                arrival: stop_time.arrival_time,
                departure: stop_time.departure_time,
            });
        }

        pattern_trips
            .entry((route_id, sequence))
            .or_default()
            .push(times);
    }

    let mut patterns = Vec::with_capacity(pattern_trips.len());
    let mut pattern_stops = Vec::new();
    let mut stop_times = Vec::new();
    for ((route_id, sequence), mut trips) in pattern_trips.into_iter().sorted_by(|a, b| a.0.cmp(&b.0))
    {
        trips.sort_by_key(|times| times[0].departure);

        patterns.push(TripPattern {
            route_id: route_id.to_string(),
            num_trips: trips.len(),
            num_stops: sequence.len(),
            stops_start: pattern_stops.len(),
            times_start: stop_times.len(),
        });
        pattern_stops.extend(sequence);
        for times in trips {
            stop_times.extend(times);
        }
    }

    if skipped > 0 {
        warn!("{skipped} trips skipped during pattern construction");
    }
    info!(
        "Built {} patterns over {} stops ({} hop edges)",
        patterns.len(),
        stops.len(),
        patterns
            .iter()
            .map(|p: &TripPattern| p.num_trips * p.num_stops.saturating_sub(1))
            .sum::<usize>()
    );

    graph.transit = TransitData {
        stops,
        patterns,
        pattern_stops,
        stop_times,
        feeds_meta: feed
            .feed_infos
            .iter()
            .cloned()
            .map(|feed_info| FeedMeta { feed_info })
            .collect(),
    };
    Ok(())
}
