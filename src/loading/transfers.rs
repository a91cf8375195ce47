//! Direct walking transfers between nearby stops.

use geo::{Distance, Haversine, Point};
use log::info;
use rayon::prelude::*;
use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::StopId;
use crate::index::degree_envelope;
use crate::model::{MultimodalGraph, TransferEdge};

#[derive(Debug, Clone)]
struct IndexedStop {
    position: [f64; 2],
    stop: StopId,
}

impl RTreeObject for IndexedStop {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for IndexedStop {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Generate transfer edges between all stop pairs within `radius_m`
/// straight-line walking distance.
///
/// The boundary is inclusive: a pair exactly at the radius is linked.
/// Each unordered pair is stored once, `from < to`.
pub(crate) fn generate_transfers(graph: &mut MultimodalGraph, radius_m: f64) {
    let stops = &graph.transit.stops;
    if stops.len() < 2 {
        graph.transfers.clear();
        return;
    }

    let rtree = RTree::bulk_load(
        stops
            .iter()
            .enumerate()
            .map(|(stop, s)| IndexedStop {
                position: [s.geometry.x(), s.geometry.y()],
                stop,
            })
            .collect(),
    );

    let mut transfers: Vec<TransferEdge> = (0..stops.len())
        .into_par_iter()
        .flat_map_iter(|from| {
            let origin = stops[from].geometry;
            rtree
                .locate_in_envelope(&degree_envelope(origin, radius_m))
                .filter(move |candidate| candidate.stop > from)
                .filter_map(move |candidate| {
                    let target = Point::new(candidate.position[0], candidate.position[1]);
                    let distance_m = Haversine.distance(origin, target);
                    (distance_m <= radius_m).then_some(TransferEdge {
                        from,
                        to: candidate.stop,
                        distance_m,
                    })
                })
                .collect::<Vec<_>>()
        })
        .collect();
    transfers.par_sort_unstable_by_key(|t| (t.from, t.to));

    info!(
        "Generated {} transfer edges within {radius_m} m between {} stops",
        transfers.len(),
        stops.len()
    );
    graph.transfers = transfers;
}
