//! Feed reading and referential integrity validation.

use std::path::Path;

use hashbrown::HashSet;
use log::info;

use super::de::deserialize_gtfs_file;
use super::raw_types::{
    FeedCalendar, FeedCalendarDate, FeedInfo, FeedRoute, FeedStop, FeedStopTime, FeedTrip,
};
use crate::Error;

/// In-memory transit feed, validated for internal consistency.
#[derive(Debug, Default)]
pub struct FeedContext {
    pub stops: Vec<FeedStop>,
    pub routes: Vec<FeedRoute>,
    pub trips: Vec<FeedTrip>,
    pub stop_times: Vec<FeedStopTime>,
    pub calendar: Vec<FeedCalendar>,
    pub calendar_dates: Vec<FeedCalendarDate>,
    pub feed_infos: Vec<FeedInfo>,
}

/// Read a GTFS directory into a validated [`FeedContext`].
///
/// `stops.txt`, `routes.txt`, `trips.txt` and `stop_times.txt` are
/// required; `calendar.txt`, `calendar_dates.txt` and `feed_info.txt`
/// are optional.
///
/// # Errors
///
/// [`Error::NotFound`] for a missing directory or required file,
/// [`Error::Parse`] for malformed csv, [`Error::DataIntegrity`] for
/// cross-reference violations.
pub fn read_feed(path: &Path) -> Result<FeedContext, Error> {
    if !path.is_dir() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    let context = FeedContext {
        stops: read_required(path, "stops.txt")?,
        routes: read_required(path, "routes.txt")?,
        trips: read_required(path, "trips.txt")?,
        stop_times: read_required(path, "stop_times.txt")?,
        calendar: read_optional(path, "calendar.txt")?,
        calendar_dates: read_optional(path, "calendar_dates.txt")?,
        feed_infos: read_optional(path, "feed_info.txt")?,
    };
    context.validate()?;

    info!(
        "Read feed {}: {} stops, {} routes, {} trips, {} stop times",
        path.display(),
        context.stops.len(),
        context.routes.len(),
        context.trips.len(),
        context.stop_times.len()
    );
    Ok(context)
}

fn read_required<T>(dir: &Path, name: &str) -> Result<Vec<T>, Error>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let path = dir.join(name);
    if !path.is_file() {
        return Err(Error::NotFound(path));
    }
    deserialize_gtfs_file(&path)
}

fn read_optional<T>(dir: &Path, name: &str) -> Result<Vec<T>, Error>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let path = dir.join(name);
    if !path.is_file() {
        return Ok(Vec::new());
    }
    deserialize_gtfs_file(&path)
}

impl FeedContext {
    /// Check referential integrity between trips, stops and calendars.
    pub fn validate(&self) -> Result<(), Error> {
        let mut stop_ids = HashSet::with_capacity(self.stops.len());
        for stop in &self.stops {
            if !stop_ids.insert(stop.stop_id.as_str()) {
                return Err(Error::DataIntegrity(format!(
                    "duplicate stop id `{}`",
                    stop.stop_id
                )));
            }
        }

        let route_ids: HashSet<&str> = self.routes.iter().map(|r| r.route_id.as_str()).collect();
        let service_ids: HashSet<&str> = self
            .calendar
            .iter()
            .map(|c| c.service_id.as_str())
            .chain(self.calendar_dates.iter().map(|d| d.service_id.as_str()))
            .collect();

        let mut trip_ids = HashSet::with_capacity(self.trips.len());
        for trip in &self.trips {
            if !trip_ids.insert(trip.trip_id.as_str()) {
                return Err(Error::DataIntegrity(format!(
                    "duplicate trip id `{}`",
                    trip.trip_id
                )));
            }
            if !route_ids.contains(trip.route_id.as_str()) {
                return Err(Error::DataIntegrity(format!(
                    "trip `{}` references unknown route `{}`",
                    trip.trip_id, trip.route_id
                )));
            }
            if !service_ids.contains(trip.service_id.as_str()) {
                return Err(Error::DataIntegrity(format!(
                    "trip `{}` references unknown service `{}`",
                    trip.trip_id, trip.service_id
                )));
            }
        }

        for stop_time in &self.stop_times {
            if !trip_ids.contains(stop_time.trip_id.as_str()) {
                return Err(Error::DataIntegrity(format!(
                    "stop time references unknown trip `{}`",
                    stop_time.trip_id
                )));
            }
            if !stop_ids.contains(stop_time.stop_id.as_str()) {
                return Err(Error::DataIntegrity(format!(
                    "trip `{}` references unknown stop `{}`",
                    stop_time.trip_id, stop_time.stop_id
                )));
            }
        }

        Ok(())
    }
}
