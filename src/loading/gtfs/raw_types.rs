use serde::Deserialize;

use super::de::{deserialize_gtfs_date, deserialize_gtfs_time};
use crate::Time;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FeedStop {
    pub stop_id: String,
    pub stop_code: String,
    pub stop_name: String,
    pub stop_lat: f64,
    pub stop_lon: f64,
    pub location_type: String,
    pub parent_station: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FeedRoute {
    pub route_id: String,
    pub agency_id: String,
    pub route_short_name: String,
    pub route_long_name: String,
    pub route_type: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FeedTrip {
    pub route_id: String,
    pub service_id: String,
    pub trip_id: String,
    pub trip_headsign: String,
    pub direction_id: String,
    pub block_id: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FeedStopTime {
    pub trip_id: String,
    #[serde(deserialize_with = "deserialize_gtfs_time")]
    pub arrival_time: Time,
    #[serde(deserialize_with = "deserialize_gtfs_time")]
    pub departure_time: Time,
    pub stop_id: String,
    pub stop_sequence: u32,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FeedCalendar {
    pub service_id: String,
    pub monday: u8,
    pub tuesday: u8,
    pub wednesday: u8,
    pub thursday: u8,
    pub friday: u8,
    pub saturday: u8,
    pub sunday: u8,
    #[serde(deserialize_with = "deserialize_gtfs_date")]
    pub start_date: Option<chrono::NaiveDate>,
    #[serde(deserialize_with = "deserialize_gtfs_date")]
    pub end_date: Option<chrono::NaiveDate>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FeedCalendarDate {
    pub service_id: String,
    #[serde(deserialize_with = "deserialize_gtfs_date")]
    pub date: Option<chrono::NaiveDate>,
    pub exception_type: u8,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
#[allow(clippy::struct_field_names)]
pub struct FeedInfo {
    pub feed_publisher_name: String,
    pub feed_publisher_url: String,
    pub feed_lang: String,
    #[serde(deserialize_with = "deserialize_gtfs_date")]
    pub feed_start_date: Option<chrono::NaiveDate>,
    #[serde(deserialize_with = "deserialize_gtfs_date")]
    pub feed_end_date: Option<chrono::NaiveDate>,
    pub feed_version: String,
}
