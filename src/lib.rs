//! Ferrograph builds a single multimodal routable graph from heterogeneous
//! geospatial sources: a scheduled-transit feed (GTFS) and a street network
//! extract (OSM pbf).
//!
//! The entry point is [`GraphBuilder`], which sequences feed reading, trip
//! pattern construction, street import, stop linking, transfer generation,
//! service calendar derivation and spatial indexing into one deterministic
//! pipeline. Completed graphs are memoized per input fingerprint, so each
//! distinct input combination is built at most once per process.
//!
//! ```no_run
//! use ferrograph::{BuildInputs, GraphBuilder};
//!
//! let builder = GraphBuilder::new();
//! let inputs = BuildInputs::combined("city.osm.pbf", "gtfs/").with_transfer_radius(2000);
//! let artifact = builder.build(&inputs)?;
//! assert!(artifact.graph().has_transit);
//! # Ok::<(), ferrograph::Error>(())
//! ```

pub mod error;
pub mod index;
pub mod loading;
pub mod model;
pub mod prelude;

pub use error::Error;
pub use index::{GraphVertex, SpatialIndex};
pub use loading::{BuildArtifact, BuildInputs, GraphBuilder};
pub use model::{MultimodalGraph, ServiceContext, StreetGraph, TransitData};

/// Seconds since midnight of the service day.
pub type Time = u32;

/// Dense index of a transit stop within [`TransitData::stops`].
pub type StopId = usize;

/// Dense index of a trip pattern within [`TransitData::patterns`].
pub type PatternId = usize;
