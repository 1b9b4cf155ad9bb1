// Graph snapshots (JSON dump and restore)

use crate::memory::PropertyGraph;
use crate::model::{Edge, Vertex};
use crate::store::{GraphError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{info, warn};

/// Serialized form of a whole graph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Every vertex
    #[serde(default)]
    pub vertices: Vec<Vertex>,

    /// Every edge
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// Summary of a restore
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreReport {
    /// Vertices newly inserted
    pub vertices_inserted: usize,

    /// Edges newly inserted
    pub edges_inserted: usize,

    /// Vertices or edges already present
    pub duplicates: usize,

    /// Edges rejected by validation
    pub skipped_edges: Vec<String>,
}

impl GraphSnapshot {
    /// Parse a snapshot from a reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader).map_err(|e| GraphError::Snapshot(e.to_string()))
    }

    /// Load a snapshot file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| GraphError::Snapshot(format!("{}: {}", path.display(), e)))?;
        Self::from_reader(BufReader::new(file))
    }

    /// Write the snapshot as pretty JSON
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self).map_err(|e| GraphError::Snapshot(e.to_string()))
    }

    /// Save the snapshot to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| GraphError::Snapshot(format!("{}: {}", path.display(), e)))?;
        let mut writer = BufWriter::new(file);
        self.to_writer(&mut writer)?;
        writer
            .flush()
            .map_err(|e| GraphError::Snapshot(format!("{}: {}", path.display(), e)))
    }

    /// Capture the current contents of a graph
    pub fn capture(graph: &PropertyGraph) -> Result<Self> {
        let (vertices, edges) = graph.dump()?;
        Ok(Self { vertices, edges })
    }

    /// Insert every vertex then every edge into `graph`
    ///
    /// Edges that fail validation are skipped and listed in the report;
    /// an unavailable store aborts the restore.
    pub fn restore_into(&self, graph: &PropertyGraph) -> Result<RestoreReport> {
        let mut report = RestoreReport::default();

        for vertex in &self.vertices {
            if graph.insert_vertex(vertex.clone())?.existed {
                report.duplicates += 1;
            } else {
                report.vertices_inserted += 1;
            }
        }

        for edge in &self.edges {
            match graph.insert_edge(edge.clone()) {
                Ok(upsert) if upsert.existed => report.duplicates += 1,
                Ok(_) => report.edges_inserted += 1,
                Err(e @ GraphError::Unavailable(_)) => return Err(e),
                Err(e) => {
                    warn!("Skipping edge {}: {}", edge.id, e);
                    report.skipped_edges.push(edge.id.to_string());
                }
            }
        }

        info!(
            "Restored {} vertices and {} edges ({} duplicates, {} skipped)",
            report.vertices_inserted,
            report.edges_inserted,
            report.duplicates,
            report.skipped_edges.len()
        );
        Ok(report)
    }

    /// Build a fresh graph from this snapshot
    pub fn into_graph(self) -> Result<(PropertyGraph, RestoreReport)> {
        let graph = PropertyGraph::new();
        let report = self.restore_into(&graph)?;
        Ok((graph, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Annotation, Author, Image, Tag, VertexKind};
    use crate::store::GraphStore;

    fn sample() -> GraphSnapshot {
        let author = Author::new("Jane Doe");
        let tag = Tag::new("lake", None);
        GraphSnapshot {
            vertices: vec![
                Image::new("1", "Jane Doe", "https://picsum.photos/id/1").into(),
                author.clone().into(),
                tag.clone().into(),
            ],
            edges: vec![
                Edge::author_of(&author, "1"),
                Edge::tag_of(&tag, "1", 0.8, Annotation::Label),
                Edge::tag_of(&tag, "missing", 0.8, Annotation::Label),
            ],
        }
    }

    #[test]
    fn test_restore_skips_invalid_edges() {
        let (graph, report) = sample().into_graph().unwrap();
        assert_eq!(report.vertices_inserted, 3);
        assert_eq!(report.edges_inserted, 2);
        assert_eq!(report.skipped_edges.len(), 1);
        assert_eq!(graph.count_vertices(VertexKind::Image).unwrap(), 1);
    }

    #[test]
    fn test_restore_twice_is_idempotent() {
        let snapshot = sample();
        let (graph, _) = snapshot.clone().into_graph().unwrap();
        let second = snapshot.restore_into(&graph).unwrap();
        assert_eq!(second.vertices_inserted, 0);
        assert_eq!(second.edges_inserted, 0);
        assert_eq!(second.duplicates, 5);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");

        let (graph, _) = sample().into_graph().unwrap();
        GraphSnapshot::capture(&graph).unwrap().save(&path).unwrap();

        let loaded = GraphSnapshot::load(&path).unwrap();
        assert_eq!(loaded.vertices.len(), 3);
        assert_eq!(loaded.edges.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let result = GraphSnapshot::load("/definitely/not/here.json");
        assert!(matches!(result, Err(GraphError::Snapshot(_))));
    }
}
