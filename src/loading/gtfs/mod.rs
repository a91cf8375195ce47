//! Reading and validating raw GTFS data

mod de;
mod raw_types;
mod reader;

pub use raw_types::{
    FeedCalendar, FeedCalendarDate, FeedInfo, FeedRoute, FeedStop, FeedStopTime, FeedTrip,
};
pub use reader::{FeedContext, read_feed};
