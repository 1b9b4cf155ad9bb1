//! levue - Graph Visualization
//!
//! *La Vue* (The View) - Color-coded subgraphs of seed images, search results and their metadata

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// Node and edge colors.
pub mod palette;
/// Subgraph assembly.
pub mod subgraph;

pub use subgraph::{Error, GraphEdge, Node, Result, Subgraph, SubgraphBuilder};

/// Visualization library initialization
pub fn init() {
    let _ = tracing::subscriber::set_default(tracing::subscriber::NoSubscriber::default());
}
