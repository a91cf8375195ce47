//! End-to-end tests of the graph build pipeline against a toy transit
//! feed and an in-memory street grid.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::NaiveDate;
use geo::{Distance, Haversine, LineString, Point};
use petgraph::graph::NodeIndex;
use ferrograph::index::GraphVertex;
use ferrograph::loading::gtfs::FeedContext;
use ferrograph::loading::{FeedReader, GtfsFeedReader, StreetImporter};
use ferrograph::model::{MultimodalGraph, StreetEdge, StreetNode};
use ferrograph::{BuildInputs, Error, GraphBuilder};

fn toy_gtfs() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/toy_gtfs")
}

fn bad_gtfs() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/bad_gtfs")
}

/// Street importer producing a rectangular walking grid, ignoring the
/// extract path. Covers the toy feed's stops (lat 0.0..=0.01, lon 0.0).
struct GridStreetImporter {
    origin: (f64, f64),
    rows: usize,
    cols: usize,
    spacing_deg: f64,
}

impl GridStreetImporter {
    fn covering_toy_stops() -> Self {
        Self {
            origin: (-0.001, -0.001),
            rows: 7,
            cols: 3,
            spacing_deg: 0.002,
        }
    }
}

impl StreetImporter for GridStreetImporter {
    fn import(&self, graph: &mut MultimodalGraph, _path: &Path) -> Result<(), Error> {
        let mut indices = Vec::with_capacity(self.rows * self.cols);
        for row in 0..self.rows {
            for col in 0..self.cols {
                let lon = self.origin.0 + col as f64 * self.spacing_deg;
                let lat = self.origin.1 + row as f64 * self.spacing_deg;
                let node = graph.streets.add_node(StreetNode {
                    id: (row * self.cols + col) as i64,
                    geometry: Point::new(lon, lat),
                });
                indices.push(node);
            }
        }
        for row in 0..self.rows {
            for col in 0..self.cols {
                let here = indices[row * self.cols + col];
                let mut connect = |other: NodeIndex| {
                    let a = graph.streets.graph[here].geometry;
                    let b: Point<f64> = graph.streets.graph[other].geometry;
                    let length_m = Haversine.distance(a, b);
                    graph.streets.add_edge(
                        here,
                        other,
                        StreetEdge {
                            weight: (length_m / 1.39).round() as u32,
                            length_m,
                            geometry: LineString::from(vec![a, b]),
                        },
                    );
                };
                if col + 1 < self.cols {
                    connect(indices[row * self.cols + col + 1]);
                }
                if row + 1 < self.rows {
                    connect(indices[(row + 1) * self.cols + col]);
                }
            }
        }
        Ok(())
    }
}

/// Importer standing in for an intentionally empty street extract.
struct EmptyStreetImporter;

impl StreetImporter for EmptyStreetImporter {
    fn import(&self, _graph: &mut MultimodalGraph, _path: &Path) -> Result<(), Error> {
        Ok(())
    }
}

/// Wraps the real GTFS reader and counts physical reads, optionally
/// slowing them down to widen concurrency windows.
struct CountingFeedReader {
    calls: Arc<AtomicUsize>,
    delay: Duration,
}

impl CountingFeedReader {
    fn new(calls: Arc<AtomicUsize>) -> Self {
        Self {
            calls,
            delay: Duration::ZERO,
        }
    }

    fn slow(calls: Arc<AtomicUsize>) -> Self {
        Self {
            calls,
            delay: Duration::from_millis(50),
        }
    }
}

impl FeedReader for CountingFeedReader {
    fn read(&self, path: &Path) -> Result<FeedContext, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        GtfsFeedReader.read(path)
    }
}

fn combined_inputs() -> BuildInputs {
    BuildInputs::combined("grid.osm.pbf", toy_gtfs()).with_transfer_radius(2000)
}

#[test]
fn combined_build_links_stops_and_generates_transfers() {
    let builder = GraphBuilder::new().with_street_importer(GridStreetImporter::covering_toy_stops());

    let graph = builder
        .build_combined("grid.osm.pbf", toy_gtfs(), 2000)
        .unwrap();

    assert!(graph.has_transit);
    assert_eq!(graph.transit.stops.len(), 3);
    assert_eq!(graph.linking.len(), 3);
    // Two trips over one 3-stop pattern: four hop edges.
    assert_eq!(graph.hop_edge_count(), 4);
    assert_eq!(graph.transit.patterns.len(), 1);

    // All three stop pairs lie within 2000 m.
    let pairs: Vec<_> = graph.transfers.iter().map(|t| (t.from, t.to)).collect();
    assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 2)]);

    assert!(graph.spatial_index().is_some());
    assert_eq!(
        graph.transit_validity,
        Some((
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
        ))
    );
}

#[test]
fn repeated_builds_return_the_cached_graph() {
    let calls = Arc::new(AtomicUsize::new(0));
    let builder = GraphBuilder::new()
        .with_feed_reader(CountingFeedReader::new(Arc::clone(&calls)))
        .with_street_importer(GridStreetImporter::covering_toy_stops());
    let inputs = combined_inputs();

    let first = builder.build(&inputs).unwrap();
    let second = builder.build(&inputs).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(first.graph(), second.graph()));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(builder.cached_builds(), 1);
    assert!(builder.cached(&inputs).is_some());
}

#[test]
fn empty_street_extract_yields_zero_linking_edges() {
    let builder = GraphBuilder::new().with_street_importer(EmptyStreetImporter);

    let graph = builder
        .build_combined("empty.osm.pbf", toy_gtfs(), 2000)
        .unwrap();

    assert!(graph.linking.is_empty());
    assert!(graph.has_transit);
    assert_eq!(graph.transfers.len(), 3);
}

#[test]
fn failed_build_leaves_no_residue_for_a_retry() {
    let builder = GraphBuilder::new();

    let error = builder.build_transit_only(bad_gtfs()).unwrap_err();
    assert_eq!(error.stage(), Some("feed read"));
    assert!(matches!(error.root_cause(), Error::DataIntegrity(_)));
    assert_eq!(builder.cached_builds(), 0);

    let graph = builder.build_transit_only(toy_gtfs()).unwrap();
    assert_eq!(graph.transit.stops.len(), 3);
    assert!(graph.transit.stop_index("Z").is_none());
    assert_eq!(builder.cached_builds(), 1);
}

#[test]
fn street_only_build_has_no_transit() {
    let builder = GraphBuilder::new().with_street_importer(GridStreetImporter::covering_toy_stops());

    let artifact = builder
        .build(&BuildInputs::street_only("grid.osm.pbf"))
        .unwrap();
    let graph = artifact.graph();

    assert!(!graph.has_transit);
    assert!(graph.transit.stops.is_empty());
    assert!(graph.linking.is_empty());
    assert!(graph.service.is_none());
    assert!(artifact.feed().is_none());
    assert!(graph.spatial_index().is_some());
    assert!(graph.streets.edge_count() > 0);
}

#[test]
fn transit_only_build_runs_linker_against_empty_streets() {
    let builder = GraphBuilder::new();
    let inputs = BuildInputs::transit_only(toy_gtfs());

    let artifact = builder.build(&inputs).unwrap();
    let graph = artifact.graph();

    assert!(graph.has_transit);
    assert!(graph.linking.is_empty());
    assert!(graph.transfers.is_empty());
    assert!(graph.service.is_some());
    assert!(artifact.feed().is_some());

    // The service calendar carries the July 4th removal exception.
    let service = graph.service.as_ref().unwrap();
    assert!(!service.runs_on("S1", NaiveDate::from_ymd_opt(2025, 7, 4).unwrap()));
    assert!(service.runs_on("S1", NaiveDate::from_ymd_opt(2025, 7, 3).unwrap()));
}

#[test]
fn concurrent_callers_share_one_physical_build() {
    let calls = Arc::new(AtomicUsize::new(0));
    let builder = Arc::new(
        GraphBuilder::new()
            .with_feed_reader(CountingFeedReader::slow(Arc::clone(&calls)))
            .with_street_importer(GridStreetImporter::covering_toy_stops()),
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let builder = Arc::clone(&builder);
            std::thread::spawn(move || builder.build(&combined_inputs()).unwrap())
        })
        .collect();

    let artifacts: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(
        artifacts
            .windows(2)
            .all(|pair| Arc::ptr_eq(&pair[0], &pair[1]))
    );
}

#[test]
fn distinct_options_are_distinct_builds() {
    let calls = Arc::new(AtomicUsize::new(0));
    let builder = GraphBuilder::new()
        .with_feed_reader(CountingFeedReader::new(Arc::clone(&calls)))
        .with_street_importer(GridStreetImporter::covering_toy_stops());

    let narrow = builder
        .build(&combined_inputs().with_transfer_radius(600))
        .unwrap();
    let wide = builder.build(&combined_inputs()).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(builder.cached_builds(), 2);
    // 600 m only reaches adjacent stops; 2000 m covers all pairs.
    assert_eq!(narrow.graph().transfers.len(), 2);
    assert_eq!(wide.graph().transfers.len(), 3);
}

#[test]
fn flex_service_option_is_applied_to_the_graph() {
    let builder = GraphBuilder::new();
    let graph = builder
        .build(&BuildInputs::transit_only(toy_gtfs()).with_flex_service())
        .unwrap();
    assert!(graph.graph().flex_service);

    let plain = builder.build(&BuildInputs::transit_only(toy_gtfs())).unwrap();
    assert!(!plain.graph().flex_service);
    assert_eq!(builder.cached_builds(), 2);
}

#[test]
fn missing_street_extract_aborts_the_build() {
    let builder = GraphBuilder::new();
    let error = builder
        .build_combined("/no/such/extract.osm.pbf", toy_gtfs(), 2000)
        .unwrap_err();

    assert_eq!(error.stage(), Some("street import"));
    assert!(matches!(error.root_cause(), Error::NotFound(_)));
    assert_eq!(builder.cached_builds(), 0);
}

#[test]
fn spatial_index_resolves_stops_and_street_nodes() {
    let builder = GraphBuilder::new().with_street_importer(GridStreetImporter::covering_toy_stops());
    let graph = builder
        .build_combined("grid.osm.pbf", toy_gtfs(), 2000)
        .unwrap();
    let index = graph.spatial_index().unwrap();

    // Stop A sits exactly at (0, 0); the nearest grid node is ~111 m away.
    let (vertex, distance) = index.nearest_vertex(Point::new(0.0, 0.0)).unwrap();
    assert_eq!(vertex, GraphVertex::Stop(0));
    assert!(distance < 1.0);

    let nearby = index.vertices_within(Point::new(0.0, 0.0), 200.0);
    assert!(nearby.contains(&GraphVertex::Stop(0)));
    assert!(
        nearby
            .iter()
            .any(|v| matches!(v, GraphVertex::Street(_)))
    );

    let snapped = index.snap(Point::new(0.0, 0.0), 50.0).unwrap();
    assert_eq!(snapped, GraphVertex::Stop(0));
    assert!(matches!(
        index.snap(Point::new(10.0, 10.0), 50.0),
        Err(Error::Linking(_))
    ));
}
