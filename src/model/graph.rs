//! Aggregate build result: street network, transit patterns and the edges
//! stitching them together.

use chrono::NaiveDate;
use petgraph::graph::NodeIndex;

use super::service::ServiceContext;
use super::streets::StreetGraph;
use super::transit::TransitData;
use crate::StopId;
use crate::index::SpatialIndex;

/// A transit stop snapped onto its nearest street vertex.
#[derive(Debug, Clone, Copy)]
pub struct LinkingEdge {
    pub stop: StopId,
    pub node: NodeIndex,
    pub distance_m: f64,
}

/// Direct walking transfer between two stops.
/// Stored once per unordered pair, `from < to`.
#[derive(Debug, Clone, Copy)]
pub struct TransferEdge {
    pub from: StopId,
    pub to: StopId,
    pub distance_m: f64,
}

/// The mutable aggregate result of a graph build.
///
/// Owned by the build pipeline until completion, then shared read-mostly
/// behind an `Arc`. Structural edges are final once the spatial index is
/// set; service metadata may still be refreshed.
#[derive(Debug, Default)]
pub struct MultimodalGraph {
    pub streets: StreetGraph,
    pub transit: TransitData,
    pub linking: Vec<LinkingEdge>,
    pub transfers: Vec<TransferEdge>,
    pub service: Option<ServiceContext>,
    pub transit_validity: Option<(NaiveDate, NaiveDate)>,
    /// True iff at least one pattern/hop edge was added
    pub has_transit: bool,
    /// Feed contains flexible/on-demand service
    pub flex_service: bool,
    spatial_index: Option<SpatialIndex>,
}

impl MultimodalGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach derived calendar data and refresh the validity window.
    pub fn attach_service(&mut self, context: ServiceContext) {
        self.transit_validity = context.validity();
        self.service = Some(context);
    }

    /// Recompute the transit validity window from the attached service data.
    pub fn update_transit_validity(&mut self) {
        self.transit_validity = self.service.as_ref().and_then(ServiceContext::validity);
    }

    pub fn hop_edge_count(&self) -> usize {
        self.transit.hop_edge_count()
    }

    pub fn spatial_index(&self) -> Option<&SpatialIndex> {
        self.spatial_index.as_ref()
    }

    pub(crate) fn set_spatial_index(&mut self, index: SpatialIndex) {
        self.spatial_index = Some(index);
    }
}
