//! Data model for the multimodal routable graph.
//!
//! Contains the street network, transit pattern data and the aggregate
//! [`MultimodalGraph`] produced by a build.

pub mod graph;
pub mod service;
pub mod streets;
pub mod transit;

pub use graph::{LinkingEdge, MultimodalGraph, TransferEdge};
pub use service::{ExceptionKind, ServiceContext, ServiceException, ServicePeriod};
pub use streets::{IndexedPoint, StreetEdge, StreetGraph, StreetNode};
pub use transit::{FeedMeta, HopEdge, Stop, StopTime, TransitData, TripPattern};
