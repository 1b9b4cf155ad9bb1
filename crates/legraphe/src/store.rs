// Read-only graph store contract

use crate::model::{Edge, EdgeKind, Vertex, VertexId, VertexKind};

/// Result type for graph store operations
pub type Result<T> = std::result::Result<T, GraphError>;

/// Graph store errors
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A keyed lookup missed
    #[error("Vertex not found: {0}")]
    NotFound(VertexId),

    /// The underlying store could not serve the query
    #[error("Graph store unavailable: {0}")]
    Unavailable(String),

    /// An edge violated the endpoint rules
    #[error("Invalid edge {edge}: {reason}")]
    InvalidEdge {
        /// Rendered edge identifier
        edge: String,
        /// Violated rule
        reason: String,
    },

    /// An edge score fell outside [0, 1]
    #[error("Invalid score {score} on edge {edge}")]
    InvalidScore {
        /// Rendered edge identifier
        edge: String,
        /// Offending score
        score: f64,
    },

    /// Snapshot could not be read or written
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl GraphError {
    /// Whether this is a keyed lookup miss
    pub fn is_not_found(&self) -> bool {
        matches!(self, GraphError::NotFound(_))
    }
}

/// Traversal direction relative to edge orientation (metadata -> image)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Follow edges from `from` to `to` (metadata to images)
    Outbound,

    /// Follow edges from `to` back to `from` (image to metadata)
    Inbound,
}

/// Vertex reached by a traversal, with the edges that reached it
#[derive(Debug, Clone)]
pub struct Neighbor {
    /// Reached vertex
    pub vertex: Vertex,

    /// Incident edges seen at the first depth the vertex was reached, best score first
    pub edges: Vec<Edge>,

    /// Hop count from the start vertex
    pub depth: usize,
}

impl Neighbor {
    /// Highest scoring incident edge
    pub fn best_edge(&self) -> Option<&Edge> {
        self.edges.first()
    }

    /// Score of the best incident edge
    pub fn score(&self) -> f64 {
        self.best_edge().map(|e| e.score).unwrap_or(0.0)
    }
}

/// Read access to the image graph
///
/// Every method runs as an independent read; implementations must not hold
/// locks between calls so that concurrent ingestion stays possible.
pub trait GraphStore: Send + Sync {
    /// Look up a vertex by kind and key
    fn get_vertex(&self, kind: VertexKind, key: &str) -> Result<Vertex>;

    /// Breadth-first neighbors of `start` up to `depth` hops
    ///
    /// Each vertex is returned once (global unique-vertex semantics) in visit
    /// order, keeping every incident edge seen at its first depth. A missing
    /// start vertex yields [`GraphError::NotFound`].
    fn neighbors(
        &self,
        start: &VertexId,
        kinds: &[EdgeKind],
        direction: Direction,
        depth: usize,
    ) -> Result<Vec<Neighbor>>;

    /// Every vertex of a kind, ordered by key
    fn vertices(&self, kind: VertexKind) -> Result<Vec<Vertex>>;

    /// Every edge of a kind, ordered by key
    fn edges(&self, kind: EdgeKind) -> Result<Vec<Edge>>;

    /// Number of vertices of a kind
    fn count_vertices(&self, kind: VertexKind) -> Result<usize>;

    /// Number of edges of a kind
    fn count_edges(&self, kind: EdgeKind) -> Result<usize>;

    /// One-hop metadata edges into an image, best score first
    fn metadata_edges(&self, image_key: &str, kinds: &[EdgeKind]) -> Result<Vec<(Vertex, Edge)>> {
        let mut rows: Vec<(Vertex, Edge)> = self
            .neighbors(&VertexId::image(image_key), kinds, Direction::Inbound, 1)?
            .into_iter()
            .flat_map(|n| {
                let vertex = n.vertex;
                n.edges.into_iter().map(move |e| (vertex.clone(), e))
            })
            .collect();
        rows.sort_by(|a, b| crate::model::by_score_desc(a.1.score, b.1.score));
        Ok(rows)
    }
}
