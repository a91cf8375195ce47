//! Street network components - nodes and edges

use geo::{LineString, Point};

use crate::Time;

/// Street graph node
#[derive(Debug, Clone)]
pub struct StreetNode {
    /// OSM ID of the node
    pub id: i64,
    /// Node coordinates
    pub geometry: Point<f64>,
}

/// Street graph edge (street segment)
#[derive(Debug, Clone)]
pub struct StreetEdge {
    /// Pedestrian crossing time in seconds
    pub weight: Time,
    /// Segment length in meters
    pub length_m: f64,
    /// Optional geometry for visualization
    pub geometry: LineString<f64>,
}

impl StreetEdge {
    pub fn walking_time(&self) -> Time {
        self.weight
    }
}
