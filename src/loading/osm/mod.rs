//! OSM pbf processing

mod processor;

pub use processor::{DEFAULT_WALKING_SPEED, WayPropertySet};
pub(crate) use processor::create_street_graph;
