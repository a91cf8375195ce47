//! Spatial index over the finished graph.
//!
//! Built as the last pipeline stage, after all structural mutation is
//! complete. Supports nearest-vertex and radius queries against street
//! nodes and transit stops alike.

use geo::{Distance, Haversine, Point};
use petgraph::graph::NodeIndex;
use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::model::MultimodalGraph;
use crate::{Error, StopId};

/// A graph vertex addressable from spatial queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphVertex {
    Street(NodeIndex),
    Stop(StopId),
}

#[derive(Debug, Clone)]
struct IndexedVertex {
    position: [f64; 2],
    vertex: GraphVertex,
}

impl RTreeObject for IndexedVertex {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for IndexedVertex {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        dx * dx + dy * dy
    }
}

// Conservative meters-per-degree used to size bounding envelopes before the
// exact geodesic check. Understating the conversion only widens the box.
const METERS_PER_DEGREE: f64 = 111_000.0;

pub(crate) fn degree_envelope(point: Point<f64>, radius_m: f64) -> AABB<[f64; 2]> {
    let dlat = radius_m / METERS_PER_DEGREE;
    let cos_lat = point.y().to_radians().cos().abs().max(1e-6);
    let dlon = radius_m / (METERS_PER_DEGREE * cos_lat);
    AABB::from_corners(
        [point.x() - dlon, point.y() - dlat],
        [point.x() + dlon, point.y() + dlat],
    )
}

/// Nearest-vertex lookup structure over all graph vertices.
#[derive(Debug)]
pub struct SpatialIndex {
    rtree: RTree<IndexedVertex>,
}

impl SpatialIndex {
    pub(crate) fn build(graph: &MultimodalGraph) -> Self {
        let mut items = Vec::with_capacity(graph.streets.node_count() + graph.transit.stops.len());
        for node in graph.streets.graph.node_indices() {
            let geometry = graph.streets.graph[node].geometry;
            items.push(IndexedVertex {
                position: [geometry.x(), geometry.y()],
                vertex: GraphVertex::Street(node),
            });
        }
        for (stop_id, stop) in graph.transit.stops.iter().enumerate() {
            items.push(IndexedVertex {
                position: [stop.geometry.x(), stop.geometry.y()],
                vertex: GraphVertex::Stop(stop_id),
            });
        }
        Self {
            rtree: RTree::bulk_load(items),
        }
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }

    /// Nearest graph vertex with its Haversine distance in meters.
    pub fn nearest_vertex(&self, point: Point<f64>) -> Option<(GraphVertex, f64)> {
        let nearest = self.rtree.nearest_neighbor(&[point.x(), point.y()])?;
        let vertex_point = Point::new(nearest.position[0], nearest.position[1]);
        Some((nearest.vertex, Haversine.distance(point, vertex_point)))
    }

    /// Nearest graph vertex within `tolerance_m` of `point`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Linking`] if no vertex lies within tolerance.
    pub fn snap(&self, point: Point<f64>, tolerance_m: f64) -> Result<GraphVertex, Error> {
        match self.nearest_vertex(point) {
            Some((vertex, distance)) if distance <= tolerance_m => Ok(vertex),
            _ => Err(Error::Linking(format!(
                "no graph vertex within {tolerance_m} m of ({}, {})",
                point.x(),
                point.y()
            ))),
        }
    }

    /// All graph vertices within `radius_m` of `point`.
    pub fn vertices_within(&self, point: Point<f64>, radius_m: f64) -> Vec<GraphVertex> {
        self.rtree
            .locate_in_envelope(&degree_envelope(point, radius_m))
            .filter(|item| {
                let vertex_point = Point::new(item.position[0], item.position[1]);
                Haversine.distance(point, vertex_point) <= radius_m
            })
            .map(|item| item.vertex)
            .collect()
    }
}
