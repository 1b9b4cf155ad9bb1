//! legraphe - Image Graph Store
//!
//! *Le Graphe* (The Graph) - Typed property graph of images and the metadata that describes them

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// Deterministic vertex and edge keys.
pub mod keys;
/// In-memory graph store.
pub mod memory;
/// Per-kind vertex and edge counts.
pub mod metrics;
/// Vertex and edge model.
pub mod model;
/// JSON snapshots of a graph.
pub mod snapshot;
/// Read-only store contract.
pub mod store;

pub use memory::{PropertyGraph, Upsert};
pub use metrics::GraphMetrics;
pub use model::{
    Annotation, Author, BestGuess, Edge, EdgeId, EdgeKind, Image, LatLng, Point, Tag, TagType,
    Vertex, VertexId, VertexKind,
};
pub use snapshot::{GraphSnapshot, RestoreReport};
pub use store::{Direction, GraphError, GraphStore, Neighbor, Result};

/// Graph library initialization
pub fn init() {
    let _ = tracing::subscriber::set_default(tracing::subscriber::NoSubscriber::default());
}
