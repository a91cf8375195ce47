//! Graph build orchestration: a fixed-order pipeline with memoized results.

use std::path::PathBuf;
use std::sync::Arc;

use log::{error, info};

use super::cache::BuildCache;
use super::gtfs::FeedContext;
use super::inputs::{BuildInputs, Fingerprint};
use super::stages::{
    DefaultPatternBuilder, DefaultServiceCalendar, FeedReader, GtfsFeedReader, NearestNodeLinker,
    OsmStreetImporter, PatternBuilder, RTreeIndexer, RadiusTransferGenerator, ServiceCalendar,
    SpatialIndexer, StopLinker, StreetImporter, TransferGenerator,
};
use crate::Error;
use crate::model::MultimodalGraph;

/// The cached outcome of one successful build: the finished graph plus
/// the feed context it was derived from.
#[derive(Debug)]
pub struct BuildArtifact {
    graph: Arc<MultimodalGraph>,
    feed: Option<Arc<FeedContext>>,
}

impl BuildArtifact {
    pub(crate) fn new(graph: MultimodalGraph, feed: Option<FeedContext>) -> Self {
        Self {
            graph: Arc::new(graph),
            feed: feed.map(Arc::new),
        }
    }

    pub fn graph(&self) -> &Arc<MultimodalGraph> {
        &self.graph
    }

    /// Feed context the graph was built from, when transit data was read.
    pub fn feed(&self) -> Option<&Arc<FeedContext>> {
        self.feed.as_ref()
    }
}

/// Sequences data ingestion, pattern construction, linking, transfer
/// generation and indexing into one deterministic pipeline, memoizing
/// completed graphs per input fingerprint.
///
/// Collaborators are held behind trait objects and default to the
/// GTFS/OSM/R-tree implementations; substitute them with the `with_*`
/// methods.
pub struct GraphBuilder {
    feed_reader: Box<dyn FeedReader>,
    street_importer: Box<dyn StreetImporter>,
    pattern_builder: Box<dyn PatternBuilder>,
    stop_linker: Box<dyn StopLinker>,
    transfer_generator: Box<dyn TransferGenerator>,
    service_calendar: Box<dyn ServiceCalendar>,
    spatial_indexer: Box<dyn SpatialIndexer>,
    cache: BuildCache,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            feed_reader: Box::new(GtfsFeedReader),
            street_importer: Box::new(OsmStreetImporter::default()),
            pattern_builder: Box::new(DefaultPatternBuilder),
            stop_linker: Box::new(NearestNodeLinker::default()),
            transfer_generator: Box::new(RadiusTransferGenerator),
            service_calendar: Box::new(DefaultServiceCalendar),
            spatial_indexer: Box::new(RTreeIndexer),
            cache: BuildCache::new(),
        }
    }

    #[must_use]
    pub fn with_feed_reader(mut self, reader: impl FeedReader + 'static) -> Self {
        self.feed_reader = Box::new(reader);
        self
    }

    #[must_use]
    pub fn with_street_importer(mut self, importer: impl StreetImporter + 'static) -> Self {
        self.street_importer = Box::new(importer);
        self
    }

    #[must_use]
    pub fn with_pattern_builder(mut self, builder: impl PatternBuilder + 'static) -> Self {
        self.pattern_builder = Box::new(builder);
        self
    }

    #[must_use]
    pub fn with_stop_linker(mut self, linker: impl StopLinker + 'static) -> Self {
        self.stop_linker = Box::new(linker);
        self
    }

    #[must_use]
    pub fn with_transfer_generator(mut self, generator: impl TransferGenerator + 'static) -> Self {
        self.transfer_generator = Box::new(generator);
        self
    }

    #[must_use]
    pub fn with_service_calendar(mut self, calendar: impl ServiceCalendar + 'static) -> Self {
        self.service_calendar = Box::new(calendar);
        self
    }

    #[must_use]
    pub fn with_spatial_indexer(mut self, indexer: impl SpatialIndexer + 'static) -> Self {
        self.spatial_indexer = Box::new(indexer);
        self
    }

    /// Return the graph for `inputs`, building it first if needed.
    ///
    /// Each distinct input fingerprint is built at most once per builder;
    /// concurrent callers for one key share a single physical build.
    ///
    /// # Errors
    ///
    /// [`Error::BuildAborted`] wrapping the first failing stage. Nothing
    /// is cached on failure, so retrying the same inputs is safe and
    /// redoes all stages.
    pub fn build(&self, inputs: &BuildInputs) -> Result<Arc<BuildArtifact>, Error> {
        let key = inputs.fingerprint();
        self.cache.get_or_build(&key, || {
            self.run_pipeline(&key).inspect_err(|e| {
                error!("Graph build failed: {e}");
            })
        })
    }

    /// Build from a transit feed alone: feed read, pattern construction,
    /// service calendar, and stop linking against the empty street graph.
    pub fn build_transit_only(
        &self,
        feed: impl Into<PathBuf>,
    ) -> Result<Arc<MultimodalGraph>, Error> {
        let inputs = BuildInputs::transit_only(feed);
        Ok(Arc::clone(self.build(&inputs)?.graph()))
    }

    /// Run the full pipeline over a street extract and a transit feed.
    pub fn build_combined(
        &self,
        extract: impl Into<PathBuf>,
        feed: impl Into<PathBuf>,
        transfer_radius_m: u32,
    ) -> Result<Arc<MultimodalGraph>, Error> {
        let inputs =
            BuildInputs::combined(extract, feed).with_transfer_radius(transfer_radius_m);
        Ok(Arc::clone(self.build(&inputs)?.graph()))
    }

    /// Cached artifact for `inputs`, if a build already completed.
    pub fn cached(&self, inputs: &BuildInputs) -> Option<Arc<BuildArtifact>> {
        self.cache.lookup(&inputs.fingerprint())
    }

    /// Number of completed builds held in the cache.
    pub fn cached_builds(&self) -> usize {
        self.cache.len()
    }

    /// Drop completed cache entries; in-flight builds are unaffected.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    fn run_pipeline(&self, key: &Fingerprint) -> Result<BuildArtifact, Error> {
        let mut graph = MultimodalGraph::new();

        if let Some(street) = &key.street {
            info!("Importing street network: {}", street.display());
            stage("street import", self.street_importer.import(&mut graph, street))?;
        }

        let mut feed = None;
        if let Some(transit) = &key.transit {
            info!("Reading transit feed: {}", transit.display());
            let context = stage("feed read", self.feed_reader.read(transit))?;
            stage("pattern build", self.pattern_builder.build(&mut graph, &context))?;
            graph.has_transit = graph.hop_edge_count() > 0;

            stage("stop linking", self.stop_linker.link(&mut graph))?;

            let service = stage("service calendar", self.service_calendar.compute(&context))?;
            graph.attach_service(service);
            feed = Some(context);
        }

        if let Some(radius_m) = key.transfer_radius_m {
            stage(
                "transfer generation",
                self.transfer_generator.generate(&mut graph, radius_m),
            )?;
        }

        graph.flex_service = key.flex_service;

        stage("spatial index", self.spatial_indexer.index(&mut graph))?;

        info!(
            "Graph complete: {} street edges, {} hop edges, {} linking edges, {} transfers",
            graph.streets.edge_count(),
            graph.hop_edge_count(),
            graph.linking.len(),
            graph.transfers.len()
        );

        // CSV and pbf ingestion allocate heavily and glibc does not always
        // return freed memory to the system; release the heap tail here.
        //
        // # Safety
        //
        // Safe on linux with the glibc implementation, which is what the
        // cfg attribute checks.
        #[cfg(all(target_os = "linux", target_env = "gnu"))]
        unsafe {
            if libc::malloc_trim(0) == 0 {
                log::debug!("malloc_trim released no memory");
            }
        }

        Ok(BuildArtifact::new(graph, feed))
    }
}

fn stage<T>(name: &'static str, result: Result<T, Error>) -> Result<T, Error> {
    result.map_err(|source| Error::BuildAborted {
        stage: name,
        source: Box::new(source),
    })
}
