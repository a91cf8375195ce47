// Re-export key components
pub use crate::error::Error;
pub use crate::index::{GraphVertex, SpatialIndex};
pub use crate::loading::{
    BuildArtifact, BuildInputs, DEFAULT_SNAP_TOLERANCE_M, GraphBuilder, gtfs::FeedContext,
    osm::WayPropertySet,
};
pub use crate::model::{
    LinkingEdge, MultimodalGraph, ServiceContext, StreetGraph, TransferEdge, TransitData,
};

// Core types for the street network
pub use crate::model::{StreetEdge, StreetNode};

// Core types for transit patterns
pub use crate::{PatternId, StopId, Time};
