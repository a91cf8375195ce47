//! Street graph construction from an OSM pbf extract.

use std::path::Path;

use geo::{Coord, Distance, Haversine, LineString, Point};
use hashbrown::HashMap;
use log::{info, warn};
use osmpbf::{Element, ElementReader};
use petgraph::graph::NodeIndex;

use crate::model::{StreetEdge, StreetGraph, StreetNode};
use crate::{Error, Time};

/// Default pedestrian speed in m/s
pub const DEFAULT_WALKING_SPEED: f64 = 1.39;

/// Way-property rules: foot traversal permission and walking speed.
#[derive(Debug, Clone)]
pub struct WayPropertySet {
    pub walking_speed: f64,
}

impl Default for WayPropertySet {
    fn default() -> Self {
        Self {
            walking_speed: DEFAULT_WALKING_SPEED,
        }
    }
}

impl WayPropertySet {
    /// Whether a tagged way is traversable on foot.
    ///
    /// An explicit `foot` tag wins over the `highway` class; `access=no`
    /// or `access=private` closes a way unless `foot` reopens it.
    pub fn walkable(&self, tags: &HashMap<String, String>) -> bool {
        let Some(highway) = tags.get("highway") else {
            return false;
        };

        match tags.get("foot").map(String::as_str) {
            Some("no") => return false,
            Some("yes" | "designated" | "permissive") => return true,
            _ => {}
        }
        if matches!(tags.get("access").map(String::as_str), Some("no" | "private")) {
            return false;
        }

        !matches!(
            highway.as_str(),
            "motorway" | "motorway_link" | "trunk" | "trunk_link" | "construction" | "proposed" | "raceway"
        )
    }
}

/// Read an `.osm.pbf` extract and build the pedestrian street graph.
///
/// Single pass over the file: node blocks precede way blocks in pbf
/// extracts, so coordinates are known by the time ways arrive.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn create_street_graph(
    path: &Path,
    properties: &WayPropertySet,
) -> Result<StreetGraph, Error> {
    if !path.is_file() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    let reader = ElementReader::from_path(path)
        .map_err(|e| Error::Parse(format!("{}: {e}", path.display())))?;

    let mut coords: HashMap<i64, Coord<f64>> = HashMap::new();
    let mut ways: Vec<Vec<i64>> = Vec::new();

    reader
        .for_each(|element| match element {
            Element::Node(node) => {
                coords.insert(
                    node.id(),
                    Coord {
                        x: node.lon(),
                        y: node.lat(),
                    },
                );
            }
            Element::DenseNode(node) => {
                coords.insert(
                    node.id(),
                    Coord {
                        x: node.lon(),
                        y: node.lat(),
                    },
                );
            }
            Element::Way(way) => {
                let tags: HashMap<String, String> = way
                    .tags()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();
                if properties.walkable(&tags) {
                    ways.push(way.refs().collect());
                }
            }
            Element::Relation(_) => {}
        })
        .map_err(|e| Error::Parse(format!("{}: {e}", path.display())))?;

    let mut graph = StreetGraph::new();
    let mut node_indices: HashMap<i64, NodeIndex> = HashMap::new();
    let mut unresolved = 0usize;

    for refs in &ways {
        for pair in refs.windows(2) {
            let (Some(&from), Some(&to)) = (coords.get(&pair[0]), coords.get(&pair[1])) else {
                unresolved += 1;
                continue;
            };

            let a = street_node(&mut graph, &mut node_indices, pair[0], from);
            let b = street_node(&mut graph, &mut node_indices, pair[1], to);

            let length_m = Haversine.distance(Point::from(from), Point::from(to));
            let weight = (length_m / properties.walking_speed).round().max(1.0) as Time;
            graph.add_edge(
                a,
                b,
                StreetEdge {
                    weight,
                    length_m,
                    geometry: LineString::from(vec![from, to]),
                },
            );
        }
    }

    if unresolved > 0 {
        warn!("{unresolved} way segments reference missing nodes and were skipped");
    }
    info!(
        "Street graph: {} nodes, {} edges from {} walkable ways",
        graph.node_count(),
        graph.edge_count(),
        ways.len()
    );
    Ok(graph)
}

fn street_node(
    graph: &mut StreetGraph,
    node_indices: &mut HashMap<i64, NodeIndex>,
    id: i64,
    coord: Coord<f64>,
) -> NodeIndex {
    *node_indices.entry(id).or_insert_with(|| {
        graph.add_node(StreetNode {
            id,
            geometry: Point::from(coord),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn highway_class_controls_default_permission() {
        let props = WayPropertySet::default();
        assert!(props.walkable(&tags(&[("highway", "residential")])));
        assert!(props.walkable(&tags(&[("highway", "footway")])));
        assert!(!props.walkable(&tags(&[("highway", "motorway")])));
        assert!(!props.walkable(&tags(&[("building", "yes")])));
    }

    #[test]
    fn foot_tag_overrides_highway_class() {
        let props = WayPropertySet::default();
        assert!(props.walkable(&tags(&[("highway", "trunk"), ("foot", "yes")])));
        assert!(!props.walkable(&tags(&[("highway", "footway"), ("foot", "no")])));
    }

    #[test]
    fn access_restriction_closes_untagged_ways() {
        let props = WayPropertySet::default();
        assert!(!props.walkable(&tags(&[("highway", "service"), ("access", "private")])));
        assert!(props.walkable(&tags(&[
            ("highway", "service"),
            ("access", "private"),
            ("foot", "yes")
        ])));
    }

    #[test]
    fn missing_pbf_is_not_found() {
        let result = create_street_graph(Path::new("/no/such/extract.osm.pbf"), &WayPropertySet::default());
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
