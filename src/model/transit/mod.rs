//! Transit pattern data model

pub mod data;
pub mod types;

pub use data::TransitData;
pub use types::{FeedMeta, HopEdge, Stop, StopTime, TripPattern};
