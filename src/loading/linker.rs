//! Snapping transit stops onto the street network.

use log::{info, trace, warn};

use crate::model::{LinkingEdge, MultimodalGraph};

/// Default snap tolerance in meters.
pub const DEFAULT_SNAP_TOLERANCE_M: f64 = 500.0;

/// Create linking edges from each transit stop to its nearest street node.
///
/// No-op when the street graph carries no edges or the feed has no stops.
/// A stop with no street node within `tolerance_m` is skipped, not fatal;
/// the walk between street and transit network is simply unavailable there.
pub(crate) fn link_stops(graph: &mut MultimodalGraph, tolerance_m: f64) {
    if graph.streets.is_empty() || graph.transit.stops.is_empty() {
        info!("Skipping stop linking: street or transit data absent");
        graph.linking.clear();
        return;
    }

    let mut linking = Vec::with_capacity(graph.transit.stops.len());
    let mut unlinked = 0usize;
    for (stop_id, stop) in graph.transit.stops.iter().enumerate() {
        match graph.streets.nearest_node(&stop.geometry) {
            Some((node, distance_m)) if distance_m <= tolerance_m => {
                linking.push(LinkingEdge {
                    stop: stop_id,
                    node,
                    distance_m,
                });
            }
            _ => {
                unlinked += 1;
                trace!(
                    "Stop `{}` has no street node within {tolerance_m} m",
                    stop.stop_id
                );
            }
        }
    }

    if unlinked > 0 {
        warn!(
            "{unlinked} of {} stops could not be linked to the street network",
            graph.transit.stops.len()
        );
    }
    info!("Linked {} stops to street nodes", linking.len());
    graph.linking = linking;
}
