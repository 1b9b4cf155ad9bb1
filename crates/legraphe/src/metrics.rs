// Graph metrics

use crate::model::{EdgeKind, VertexKind};
use crate::store::{GraphStore, Result};
use serde::{Deserialize, Serialize};

/// Vertex and edge counts of the graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphMetrics {
    /// Image vertices
    pub images: usize,

    /// Author vertices
    pub authors: usize,

    /// Tag vertices
    pub tags: usize,

    /// Best-guess vertices
    pub guesses: usize,

    /// `AuthorOf` + `TagOf` + `BestGuessOf` edges
    pub edges: usize,
}

impl GraphMetrics {
    /// Count every kind in the store
    pub fn collect(store: &dyn GraphStore) -> Result<Self> {
        let mut edges = 0;
        for kind in EdgeKind::ALL {
            edges += store.count_edges(kind)?;
        }

        Ok(Self {
            images: store.count_vertices(VertexKind::Image)?,
            authors: store.count_vertices(VertexKind::Author)?,
            tags: store.count_vertices(VertexKind::Tag)?,
            guesses: store.count_vertices(VertexKind::BestGuess)?,
            edges,
        })
    }
}
