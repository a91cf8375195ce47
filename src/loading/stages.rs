//! Collaborator seams of the build pipeline.
//!
//! Every stage is a trait so callers can substitute implementations
//! (test stubs, alternative importers) while [`GraphBuilder::new`] wires
//! the defaults below.
//!
//! [`GraphBuilder::new`]: super::GraphBuilder::new

use std::path::Path;

use crate::Error;
use crate::index::SpatialIndex;
use crate::loading::gtfs::{self, FeedContext};
use crate::loading::osm::{self, WayPropertySet};
use crate::loading::{calendar, linker, patterns, transfers};
use crate::model::{MultimodalGraph, ServiceContext};

/// Parses a transit feed from a path into a validated in-memory form.
pub trait FeedReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<FeedContext, Error>;
}

/// Attaches street vertices and edges from a street network extract.
pub trait StreetImporter: Send + Sync {
    fn import(&self, graph: &mut MultimodalGraph, path: &Path) -> Result<(), Error>;
}

/// Converts validated feed data into trip patterns and hop edges.
pub trait PatternBuilder: Send + Sync {
    fn build(&self, graph: &mut MultimodalGraph, feed: &FeedContext) -> Result<(), Error>;
}

/// Snaps transit stops onto the street network.
pub trait StopLinker: Send + Sync {
    fn link(&self, graph: &mut MultimodalGraph) -> Result<(), Error>;
}

/// Computes direct transfer edges between nearby stops.
pub trait TransferGenerator: Send + Sync {
    fn generate(&self, graph: &mut MultimodalGraph, radius_m: u32) -> Result<(), Error>;
}

/// Derives service calendar data from the feed.
pub trait ServiceCalendar: Send + Sync {
    fn compute(&self, feed: &FeedContext) -> Result<ServiceContext, Error>;
}

/// Builds the query index over the finished graph.
pub trait SpatialIndexer: Send + Sync {
    fn index(&self, graph: &mut MultimodalGraph) -> Result<(), Error>;
}

/// Reads a GTFS directory of csv files.
#[derive(Debug, Default)]
pub struct GtfsFeedReader;

impl FeedReader for GtfsFeedReader {
    fn read(&self, path: &Path) -> Result<FeedContext, Error> {
        gtfs::read_feed(path)
    }
}

/// Imports an `.osm.pbf` extract, applying way-property rules.
#[derive(Debug, Default)]
pub struct OsmStreetImporter {
    pub properties: WayPropertySet,
}

impl StreetImporter for OsmStreetImporter {
    fn import(&self, graph: &mut MultimodalGraph, path: &Path) -> Result<(), Error> {
        graph.streets = osm::create_street_graph(path, &self.properties)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct DefaultPatternBuilder;

impl PatternBuilder for DefaultPatternBuilder {
    fn build(&self, graph: &mut MultimodalGraph, feed: &FeedContext) -> Result<(), Error> {
        patterns::build_patterns(graph, feed)
    }
}

/// Links each stop to its nearest street node within a tolerance.
#[derive(Debug)]
pub struct NearestNodeLinker {
    pub tolerance_m: f64,
}

impl Default for NearestNodeLinker {
    fn default() -> Self {
        Self {
            tolerance_m: linker::DEFAULT_SNAP_TOLERANCE_M,
        }
    }
}

impl StopLinker for NearestNodeLinker {
    fn link(&self, graph: &mut MultimodalGraph) -> Result<(), Error> {
        linker::link_stops(graph, self.tolerance_m);
        Ok(())
    }
}

/// Straight-line transfers with an inclusive radius boundary.
#[derive(Debug, Default)]
pub struct RadiusTransferGenerator;

impl TransferGenerator for RadiusTransferGenerator {
    fn generate(&self, graph: &mut MultimodalGraph, radius_m: u32) -> Result<(), Error> {
        transfers::generate_transfers(graph, f64::from(radius_m));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct DefaultServiceCalendar;

impl ServiceCalendar for DefaultServiceCalendar {
    fn compute(&self, feed: &FeedContext) -> Result<ServiceContext, Error> {
        calendar::compute_service_context(feed)
    }
}

/// R-tree index over all street nodes and transit stops.
#[derive(Debug, Default)]
pub struct RTreeIndexer;

impl SpatialIndexer for RTreeIndexer {
    fn index(&self, graph: &mut MultimodalGraph) -> Result<(), Error> {
        let index = SpatialIndex::build(graph);
        graph.set_spatial_index(index);
        Ok(())
    }
}
