//! This module is responsible for loading data from various sources
//! (GTFS, OSM) and orchestrating the multimodal graph build.

mod builder;
mod cache;
mod calendar;
pub mod gtfs;
mod inputs;
mod linker;
pub mod osm;
mod patterns;
mod stages;
mod transfers;

pub use builder::{BuildArtifact, GraphBuilder};
pub use inputs::BuildInputs;
pub use linker::DEFAULT_SNAP_TOLERANCE_M;
pub use stages::{
    DefaultPatternBuilder, DefaultServiceCalendar, FeedReader, GtfsFeedReader, NearestNodeLinker,
    OsmStreetImporter, PatternBuilder, RTreeIndexer, RadiusTransferGenerator, ServiceCalendar,
    SpatialIndexer, StopLinker, StreetImporter, TransferGenerator,
};
