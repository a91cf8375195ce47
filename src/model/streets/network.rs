//! Street graph container with a node R-tree for nearest-vertex lookups.

use geo::{Distance, Haversine, Point};
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use rstar::{AABB, PointDistance, RTree, RTreeObject};

use super::components::{StreetEdge, StreetNode};

/// Street node position stored in the R-tree, keyed back to the graph.
#[derive(Debug, Clone)]
pub struct IndexedPoint {
    pub position: [f64; 2],
    pub node: NodeIndex,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Undirected pedestrian street network.
///
/// The R-tree is maintained incrementally as nodes are added, so
/// nearest-node queries are available to the stop linker before the
/// graph-wide spatial index exists.
#[derive(Debug, Default)]
pub struct StreetGraph {
    pub graph: UnGraph<StreetNode, StreetEdge>,
    rtree: RTree<IndexedPoint>,
}

impl StreetGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: StreetNode) -> NodeIndex {
        let position = [node.geometry.x(), node.geometry.y()];
        let index = self.graph.add_node(node);
        self.rtree.insert(IndexedPoint {
            position,
            node: index,
        });
        index
    }

    pub fn add_edge(&mut self, a: NodeIndex, b: NodeIndex, edge: StreetEdge) -> EdgeIndex {
        self.graph.add_edge(a, b, edge)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// A graph without edges carries no traversable street data.
    pub fn is_empty(&self) -> bool {
        self.graph.edge_count() == 0
    }

    /// Nearest street node to `point`, with its Haversine distance in meters.
    ///
    /// Candidate selection is planar over lon/lat, which is adequate at
    /// city extract scale; the reported distance is geodesic.
    pub fn nearest_node(&self, point: &Point<f64>) -> Option<(NodeIndex, f64)> {
        let nearest = self.rtree.nearest_neighbor(&[point.x(), point.y()])?;
        let node_point = Point::new(nearest.position[0], nearest.position[1]);
        Some((nearest.node, Haversine.distance(*point, node_point)))
    }
}
