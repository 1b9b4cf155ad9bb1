// Visualization subgraph builder
//
// Nodes are deduplicated by identifier. Edges are not: one edge per incident
// metadata edge of every connected image, colored by connection.

use crate::palette::{edge_color, vertex_color, FONT_COLOR, SEED_IMAGE_COLOR};
use legraphe::{Edge, EdgeKind, GraphError, GraphStore, Image, Vertex, VertexId, VertexKind};
use lelexique::FuzzyMatches;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Visualization errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Graph store query failed
    #[error("Graph store unavailable: {0}")]
    Store(#[from] GraphError),
}

/// Result type for visualization operations
pub type Result<T> = std::result::Result<T, Error>;

/// Rendered node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Vertex identifier (`Kind/key`)
    pub id: String,

    /// Display text: metadata text or image key
    pub label: String,

    /// Fill color
    pub color: String,

    /// Label color
    pub font_color: String,

    /// Vertex kind
    pub kind: VertexKind,
}

/// Rendered edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Edge identifier (`Kind/key`)
    pub id: String,

    /// Metadata vertex identifier
    pub from: String,

    /// Image vertex identifier
    pub to: String,

    /// Score, two decimals
    pub label: String,

    /// Stroke color
    pub color: String,
}

impl GraphEdge {
    fn from_edge(edge: &Edge, color: &str) -> Self {
        Self {
            id: edge.id.to_string(),
            from: edge.from.to_string(),
            to: edge.to.to_string(),
            label: format!("{:.2}", edge.score),
            color: color.to_string(),
        }
    }
}

/// Node and edge lists ready for a graph renderer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subgraph {
    /// Metadata nodes first, then image nodes
    pub nodes: Vec<Node>,

    /// Metadata-to-image edges
    pub edges: Vec<GraphEdge>,
}

impl Subgraph {
    /// Number of metadata nodes
    pub fn vertex_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.kind.is_metadata()).count()
    }

    /// Number of image nodes
    pub fn image_count(&self) -> usize {
        self.nodes.len() - self.vertex_count()
    }

    /// True when there is nothing to draw
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Accumulates nodes without duplicates
#[derive(Default)]
struct Canvas {
    metadata: Vec<Node>,
    images: Vec<Node>,
    edges: Vec<GraphEdge>,
    seen: HashSet<String>,
    connections: usize,
}

impl Canvas {
    fn add_metadata(&mut self, vertex: &Vertex) {
        let id = vertex.id().to_string();
        if self.seen.insert(id.clone()) {
            self.metadata.push(Node {
                id,
                label: vertex.text().unwrap_or_default().to_string(),
                color: vertex_color(vertex.kind()).to_string(),
                font_color: FONT_COLOR.to_string(),
                kind: vertex.kind(),
            });
        }
    }

    fn connect(&mut self, image: &Image, color: &str, edges: &[Edge]) {
        let id = VertexId::image(image.key.as_str()).to_string();
        if self.seen.insert(id.clone()) {
            self.images.push(Node {
                id,
                label: image.key.clone(),
                color: color.to_string(),
                font_color: FONT_COLOR.to_string(),
                kind: VertexKind::Image,
            });
        }

        let stroke = edge_color(self.connections);
        self.edges
            .extend(edges.iter().map(|e| GraphEdge::from_edge(e, stroke)));
        self.connections += 1;
    }

    fn finish(self) -> Subgraph {
        let mut nodes = self.metadata;
        nodes.extend(self.images);
        Subgraph {
            nodes,
            edges: self.edges,
        }
    }
}

/// Builds visualization subgraphs from a graph store
pub struct SubgraphBuilder {
    store: Arc<dyn GraphStore>,
}

impl SubgraphBuilder {
    /// Create a builder over an explicit store
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// Metadata edges into an image; a missing image has none
    fn incident(&self, key: &str) -> Result<Vec<(Vertex, Edge)>> {
        match self.store.metadata_edges(key, &EdgeKind::ALL) {
            Ok(rows) => Ok(rows),
            Err(GraphError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Subgraph of seed images, their metadata and related images
    ///
    /// Seed metadata become nodes; related images contribute their node and
    /// edges only.
    pub fn build_subgraph<S: AsRef<str>>(&self, seeds: &[S], related: &[Image]) -> Result<Subgraph> {
        let mut canvas = Canvas::default();

        for seed in seeds {
            let seed = seed.as_ref();
            let image = match self.store.get_vertex(VertexKind::Image, seed) {
                Ok(Vertex::Image(image)) => image,
                Ok(_) | Err(GraphError::NotFound(_)) => continue,
                Err(e) => return Err(e.into()),
            };

            let rows = self.incident(seed)?;
            for (vertex, _) in &rows {
                canvas.add_metadata(vertex);
            }
            let edges: Vec<Edge> = rows.into_iter().map(|(_, e)| e).collect();
            canvas.connect(&image, SEED_IMAGE_COLOR, &edges);
        }

        for image in related {
            let edges: Vec<Edge> = self
                .incident(&image.key)?
                .into_iter()
                .map(|(_, e)| e)
                .collect();
            canvas.connect(image, vertex_color(VertexKind::Image), &edges);
        }

        let subgraph = canvas.finish();
        debug!(
            "Subgraph: {} metadata nodes, {} images, {} edges",
            subgraph.vertex_count(),
            subgraph.image_count(),
            subgraph.edges.len()
        );
        Ok(subgraph)
    }

    /// Subgraph of search results and the metadata that matched the query
    pub fn build_search_subgraph(&self, matched: &FuzzyMatches, results: &[Image]) -> Result<Subgraph> {
        let matched: HashSet<&VertexId> = matched.iter().map(|m| &m.id).collect();
        let mut canvas = Canvas::default();

        let mut connections = Vec::with_capacity(results.len());
        for image in results {
            let rows = self.incident(&image.key)?;
            for (vertex, _) in &rows {
                if matched.contains(&vertex.id()) {
                    canvas.add_metadata(vertex);
                }
            }
            connections.push((image, rows.into_iter().map(|(_, e)| e).collect::<Vec<_>>()));
        }

        for (image, edges) in connections {
            canvas.connect(image, vertex_color(VertexKind::Image), &edges);
        }
        Ok(canvas.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{AUTHOR_COLOR, IMAGE_COLOR, TAG_COLOR};
    use legraphe::{Annotation, Author, Direction, Neighbor, PropertyGraph, Tag};

    /// Store whose every read fails
    struct UnavailableStore;

    impl GraphStore for UnavailableStore {
        fn get_vertex(&self, _kind: VertexKind, _key: &str) -> legraphe::Result<Vertex> {
            Err(GraphError::Unavailable("store offline".into()))
        }

        fn neighbors(
            &self,
            _start: &VertexId,
            _kinds: &[EdgeKind],
            _direction: Direction,
            _depth: usize,
        ) -> legraphe::Result<Vec<Neighbor>> {
            Err(GraphError::Unavailable("store offline".into()))
        }

        fn vertices(&self, _kind: VertexKind) -> legraphe::Result<Vec<Vertex>> {
            Err(GraphError::Unavailable("store offline".into()))
        }

        fn edges(&self, _kind: EdgeKind) -> legraphe::Result<Vec<Edge>> {
            Err(GraphError::Unavailable("store offline".into()))
        }

        fn count_vertices(&self, _kind: VertexKind) -> legraphe::Result<usize> {
            Err(GraphError::Unavailable("store offline".into()))
        }

        fn count_edges(&self, _kind: EdgeKind) -> legraphe::Result<usize> {
            Err(GraphError::Unavailable("store offline".into()))
        }
    }
    use lelexique::FuzzyMatch;

    fn graph() -> PropertyGraph {
        let graph = PropertyGraph::new();
        let author = Author::new("Jane Doe");
        let lake = Tag::new("lake", None);
        graph.insert_vertex(author.clone()).unwrap();
        graph.insert_vertex(lake.clone()).unwrap();
        for key in ["1", "2"] {
            graph.insert_vertex(Image::new(key, "Jane Doe", "u")).unwrap();
            graph.insert_edge(Edge::author_of(&author, key)).unwrap();
            graph
                .insert_edge(Edge::tag_of(&lake, key, 0.876, Annotation::Label))
                .unwrap();
        }
        graph
    }

    #[test]
    fn test_build_subgraph() {
        let graph = Arc::new(graph());
        let related = vec![Image::new("2", "Jane Doe", "u")];
        let subgraph = SubgraphBuilder::new(graph)
            .build_subgraph(&["1"], &related)
            .unwrap();

        assert_eq!(subgraph.vertex_count(), 2);
        assert_eq!(subgraph.image_count(), 2);
        // Shared metadata yields two edges per vertex
        assert_eq!(subgraph.edges.len(), 4);

        let colors: Vec<&str> = subgraph.nodes.iter().map(|n| n.color.as_str()).collect();
        assert_eq!(colors, vec![AUTHOR_COLOR, TAG_COLOR, SEED_IMAGE_COLOR, IMAGE_COLOR]);
        assert_eq!(subgraph.nodes[2].id, "Image/1");
        assert!(subgraph.nodes.iter().all(|n| n.font_color == "white"));

        assert_eq!(subgraph.edges[0].label, "1.00");
        assert_eq!(subgraph.edges[1].label, "0.88");
        assert_eq!(subgraph.edges[0].color, "#241023");
        assert_eq!(subgraph.edges[2].color, "#4464AD");
    }

    #[test]
    fn test_missing_seed_is_skipped() {
        let subgraph = SubgraphBuilder::new(Arc::new(graph()))
            .build_subgraph(&["404"], &[])
            .unwrap();
        assert!(subgraph.is_empty());
    }

    #[test]
    fn test_search_subgraph_keeps_matched_metadata() {
        let graph = graph();
        let lake = Tag::new("lake", None);
        let matched = FuzzyMatches::new(vec![FuzzyMatch {
            id: VertexId::new(VertexKind::Tag, lake.key),
            score: 1.2,
        }]);
        let results = vec![Image::new("1", "Jane Doe", "u"), Image::new("2", "Jane Doe", "u")];

        let subgraph = SubgraphBuilder::new(Arc::new(graph))
            .build_search_subgraph(&matched, &results)
            .unwrap();
        assert_eq!(subgraph.vertex_count(), 1);
        assert_eq!(subgraph.nodes[0].label, "lake");
        assert_eq!(subgraph.image_count(), 2);
        assert_eq!(subgraph.edges.len(), 4);
    }

    #[test]
    fn test_subgraph_serializes() {
        let subgraph = SubgraphBuilder::new(Arc::new(graph()))
            .build_subgraph(&["1"], &[])
            .unwrap();
        let json = serde_json::to_value(&subgraph).unwrap();
        assert_eq!(json["nodes"].as_array().unwrap().len(), 3);
        assert_eq!(json["edges"][0]["from"].as_str().unwrap().split('/').next(), Some("Author"));
    }

    #[test]
    fn test_store_failure_is_an_error() {
        let builder = SubgraphBuilder::new(Arc::new(UnavailableStore));
        assert!(matches!(
            builder.build_subgraph(&["1"], &[]),
            Err(Error::Store(GraphError::Unavailable(_)))
        ));

        let related = vec![Image::new("2", "Jane Doe", "u")];
        let seeds: [&str; 0] = [];
        assert!(builder.build_subgraph(&seeds, &related).is_err());
    }
}
