// In-memory property graph backed by petgraph

use crate::model::{Edge, EdgeId, EdgeKind, Vertex, VertexId, VertexKind};
use crate::store::{Direction, GraphError, GraphStore, Neighbor, Result};
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Outcome of an idempotent insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upsert<I> {
    /// Identifier of the stored element
    pub id: I,

    /// True when the element was already present and nothing changed
    pub existed: bool,
}

#[derive(Default)]
struct Inner {
    graph: StableGraph<Vertex, Edge>,
    vertex_index: BTreeMap<VertexId, NodeIndex>,
    edge_index: BTreeMap<EdgeId, EdgeIndex>,
}

/// Image graph held in memory
///
/// Reads take the lock once per call and return owned values, so a reader
/// never blocks ingestion for longer than a single lookup.
#[derive(Default)]
pub struct PropertyGraph {
    inner: RwLock<Inner>,
}

impl PropertyGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| GraphError::Unavailable("graph lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| GraphError::Unavailable("graph lock poisoned".to_string()))
    }

    /// Insert a vertex unless one with the same id exists
    pub fn insert_vertex(&self, vertex: impl Into<Vertex>) -> Result<Upsert<VertexId>> {
        let vertex = vertex.into();
        let id = vertex.id();
        let mut inner = self.write()?;

        if inner.vertex_index.contains_key(&id) {
            return Ok(Upsert { id, existed: true });
        }

        let node = inner.graph.add_node(vertex);
        inner.vertex_index.insert(id.clone(), node);
        Ok(Upsert { id, existed: false })
    }

    /// Insert an edge unless one with the same id exists
    ///
    /// Both endpoints must exist, `to` must be an image, `from` must be of the
    /// edge kind's source kind and the score must lie in [0, 1].
    pub fn insert_edge(&self, edge: Edge) -> Result<Upsert<EdgeId>> {
        let invalid = |reason: &str| GraphError::InvalidEdge {
            edge: edge.id.to_string(),
            reason: reason.to_string(),
        };

        if edge.from.kind != edge.kind().source_kind() {
            return Err(invalid("source vertex kind does not match edge kind"));
        }
        if edge.to.kind != VertexKind::Image {
            return Err(invalid("target must be an image"));
        }
        if !(0.0..=1.0).contains(&edge.score) {
            return Err(GraphError::InvalidScore {
                edge: edge.id.to_string(),
                score: edge.score,
            });
        }

        let mut inner = self.write()?;
        if inner.edge_index.contains_key(&edge.id) {
            return Ok(Upsert {
                id: edge.id.clone(),
                existed: true,
            });
        }

        let from = *inner
            .vertex_index
            .get(&edge.from)
            .ok_or_else(|| invalid("source vertex does not exist"))?;
        let to = *inner
            .vertex_index
            .get(&edge.to)
            .ok_or_else(|| invalid("target image does not exist"))?;

        let id = edge.id.clone();
        let index = inner.graph.add_edge(from, to, edge);
        inner.edge_index.insert(id.clone(), index);
        Ok(Upsert { id, existed: false })
    }

    /// Total vertex count across kinds
    pub fn vertex_count(&self) -> Result<usize> {
        Ok(self.read()?.graph.node_count())
    }

    /// Total edge count across kinds
    pub fn edge_count(&self) -> Result<usize> {
        Ok(self.read()?.graph.edge_count())
    }

    /// Clone every vertex and edge, ordered by identifier
    pub(crate) fn dump(&self) -> Result<(Vec<Vertex>, Vec<Edge>)> {
        let inner = self.read()?;
        let vertices = inner
            .vertex_index
            .values()
            .filter_map(|&ix| inner.graph.node_weight(ix).cloned())
            .collect();
        let edges = inner
            .edge_index
            .values()
            .filter_map(|&ix| inner.graph.edge_weight(ix).cloned())
            .collect();
        Ok((vertices, edges))
    }
}

fn kind_range<K: Ord, V>(
    index: &BTreeMap<K, V>,
    start: K,
    matches: impl Fn(&K) -> bool,
) -> impl Iterator<Item = &V> {
    index
        .range(start..)
        .take_while(move |(k, _)| matches(k))
        .map(|(_, v)| v)
}

impl GraphStore for PropertyGraph {
    fn get_vertex(&self, kind: VertexKind, key: &str) -> Result<Vertex> {
        let id = VertexId::new(kind, key);
        let inner = self.read()?;
        inner
            .vertex_index
            .get(&id)
            .and_then(|&ix| inner.graph.node_weight(ix).cloned())
            .ok_or(GraphError::NotFound(id))
    }

    fn neighbors(
        &self,
        start: &VertexId,
        kinds: &[EdgeKind],
        direction: Direction,
        depth: usize,
    ) -> Result<Vec<Neighbor>> {
        let inner = self.read()?;
        let start_ix = *inner
            .vertex_index
            .get(start)
            .ok_or_else(|| GraphError::NotFound(start.clone()))?;

        let petgraph_direction = match direction {
            Direction::Outbound => petgraph::Direction::Outgoing,
            Direction::Inbound => petgraph::Direction::Incoming,
        };

        let mut visited = HashSet::from([start_ix]);
        let mut frontier = vec![start_ix];
        let mut result = Vec::new();

        for level in 1..=depth {
            let mut reached = Vec::new();
            let mut incident: HashMap<NodeIndex, Vec<Edge>> = HashMap::new();

            for &node in &frontier {
                // petgraph yields the newest edge first
                let mut edges: Vec<_> = inner.graph.edges_directed(node, petgraph_direction).collect();
                edges.reverse();

                for edge in edges {
                    if !kinds.contains(&edge.weight().kind()) {
                        continue;
                    }
                    let other = if edge.source() == node {
                        edge.target()
                    } else {
                        edge.source()
                    };
                    if visited.contains(&other) {
                        continue;
                    }
                    incident
                        .entry(other)
                        .or_insert_with(|| {
                            reached.push(other);
                            Vec::new()
                        })
                        .push(edge.weight().clone());
                }
            }

            if reached.is_empty() {
                break;
            }

            for &node in &reached {
                visited.insert(node);
                let mut edges = incident.remove(&node).unwrap_or_default();
                edges.sort_by(|a, b| crate::model::by_score_desc(a.score, b.score));
                if let Some(vertex) = inner.graph.node_weight(node) {
                    result.push(Neighbor {
                        vertex: vertex.clone(),
                        edges,
                        depth: level,
                    });
                }
            }
            frontier = reached;
        }

        debug!(start = %start, depth, found = result.len(), "traversal complete");
        Ok(result)
    }

    fn vertices(&self, kind: VertexKind) -> Result<Vec<Vertex>> {
        let inner = self.read()?;
        Ok(kind_range(&inner.vertex_index, VertexId::new(kind, ""), |id| id.kind == kind)
            .filter_map(|&ix| inner.graph.node_weight(ix).cloned())
            .collect())
    }

    fn edges(&self, kind: EdgeKind) -> Result<Vec<Edge>> {
        let inner = self.read()?;
        let start = EdgeId {
            kind,
            key: String::new(),
        };
        Ok(kind_range(&inner.edge_index, start, |id| id.kind == kind)
            .filter_map(|&ix| inner.graph.edge_weight(ix).cloned())
            .collect())
    }

    fn count_vertices(&self, kind: VertexKind) -> Result<usize> {
        let inner = self.read()?;
        Ok(kind_range(&inner.vertex_index, VertexId::new(kind, ""), |id| id.kind == kind).count())
    }

    fn count_edges(&self, kind: EdgeKind) -> Result<usize> {
        let inner = self.read()?;
        let start = EdgeId {
            kind,
            key: String::new(),
        };
        Ok(kind_range(&inner.edge_index, start, |id| id.kind == kind).count())
    }
}
