// Integration Tests for LePasserelle
//
// These tests cover end-to-end workflows including:
// - Snapshot persistence and restoration
// - Search, discovery and detail queries through the facade
// - Configuration files
// - Store failures surfacing as errors
// - CLI parsing

use legraphe::{Annotation, Author, BestGuess, Edge, GraphSnapshot, Image, PropertyGraph, Tag};
use lepasserelle::{LeRegard, LeRegardConfig};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Three images by one author: two lakes and a city
fn sample_graph() -> PropertyGraph {
    let graph = PropertyGraph::new();
    let jane = Author::new("Jane Doe");
    let lake = Tag::new("lake", None);
    let city = Tag::new("city", None);
    let caption = BestGuess::new("mountain lake");

    graph.insert_vertex(jane.clone()).unwrap();
    graph.insert_vertex(lake.clone()).unwrap();
    graph.insert_vertex(city.clone()).unwrap();
    graph.insert_vertex(caption.clone()).unwrap();

    for key in ["lake1", "lake2", "city"] {
        graph
            .insert_vertex(Image::new(key, "Jane Doe", format!("https://picsum.photos/id/{}", key)))
            .unwrap();
        graph.insert_edge(Edge::author_of(&jane, key)).unwrap();
    }
    graph
        .insert_edge(Edge::tag_of(&lake, "lake1", 0.9, Annotation::Label))
        .unwrap();
    graph
        .insert_edge(Edge::tag_of(&lake, "lake2", 0.8, Annotation::Label))
        .unwrap();
    graph
        .insert_edge(Edge::tag_of(&city, "city", 0.7, Annotation::Label))
        .unwrap();
    graph
        .insert_edge(Edge::best_guess_of(&caption, "lake1"))
        .unwrap();
    graph
}

fn write_snapshot(dir: &Path) -> PathBuf {
    let path = dir.join("graph.json");
    GraphSnapshot::capture(&sample_graph())
        .unwrap()
        .save(&path)
        .unwrap();
    path
}

fn keys(images: &[Image]) -> Vec<&str> {
    images.iter().map(|i| i.key.as_str()).collect()
}

// ============================================================================
// FACADE WORKFLOW TESTS
// ============================================================================

mod facade_workflow_tests {
    use super::*;

    #[tokio::test]
    async fn test_snapshot_round_trip_through_facade() {
        let dir = TempDir::new().unwrap();
        let path = write_snapshot(dir.path());

        let (leregard, report) = LeRegard::open_snapshot(&path, LeRegardConfig::default()).unwrap();
        assert_eq!(report.vertices_inserted, 7);
        assert_eq!(report.edges_inserted, 7);
        assert!(report.skipped_edges.is_empty());

        let metrics = leregard.metrics().await.unwrap();
        assert_eq!(metrics.images, 3);
        assert_eq!(metrics.authors, 1);
        assert_eq!(metrics.tags, 2);
        assert_eq!(metrics.guesses, 1);
        assert_eq!(metrics.edges, 7);
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = LeRegard::open_snapshot(dir.path().join("nope.json"), LeRegardConfig::default());
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_search_finds_tag_and_caption_matches() {
        let leregard = LeRegard::from_graph(sample_graph(), LeRegardConfig::default()).unwrap();

        let images = leregard.search("lake").await.unwrap();
        let mut found = keys(&images);
        found.sort();
        assert_eq!(found, vec!["lake1", "lake2"]);

        assert!(leregard.search("volcano").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_discover_ranks_by_shared_metadata() {
        let leregard = LeRegard::from_graph(sample_graph(), LeRegardConfig::default()).unwrap();

        let images = leregard.discover(vec!["lake1".to_string()]).await.unwrap();
        // lake2 shares the author and the lake tag, city only the author
        assert_eq!(keys(&images), vec!["lake2", "city"]);

        let unknown = leregard.discover(vec!["missing".to_string()]).await.unwrap();
        assert!(unknown.is_empty());
    }

    #[tokio::test]
    async fn test_image_detail() {
        let leregard = LeRegard::from_graph(sample_graph(), LeRegardConfig::default()).unwrap();

        let detail = leregard.image_detail("lake1").await.unwrap().unwrap();
        assert_eq!(detail.image.key, "lake1");
        assert_eq!(detail.best_guesses, vec!["mountain lake".to_string()]);
        assert_eq!(detail.tags.len(), 1);
        assert_eq!(detail.tags[0].tag, "lake");
        assert_eq!(keys(&detail.similar)[0], "lake2");

        assert!(leregard.image_detail("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_subgraph() {
        let leregard = LeRegard::from_graph(sample_graph(), LeRegardConfig::default()).unwrap();

        let subgraph = leregard.search_subgraph("lake").await.unwrap();
        assert_eq!(subgraph.image_count(), 2);
        assert!(subgraph.vertex_count() >= 1);
        assert!(subgraph.nodes.iter().all(|n| n.id.contains('/')));
    }

    #[tokio::test]
    async fn test_visualize_without_related() {
        let mut config = LeRegardConfig::default();
        config.visualization.include_related = false;
        let leregard = LeRegard::from_graph(sample_graph(), config).unwrap();

        let subgraph = leregard.visualize(vec!["lake1".to_string()]).await.unwrap();
        assert_eq!(subgraph.image_count(), 1);
        // author, lake tag and caption
        assert_eq!(subgraph.vertex_count(), 3);
        assert_eq!(subgraph.edges.len(), 3);
    }

    #[tokio::test]
    async fn test_surprise_uses_confident_labels() {
        let leregard = LeRegard::from_graph(sample_graph(), LeRegardConfig::default()).unwrap();

        for _ in 0..10 {
            let keywords = leregard.surprise().await.unwrap().unwrap();
            assert!(keywords == "lake" || keywords == "city", "unexpected {}", keywords);
        }
    }

    #[tokio::test]
    async fn test_surprise_on_empty_graph() {
        let leregard = LeRegard::from_graph(PropertyGraph::new(), LeRegardConfig::default()).unwrap();
        assert!(leregard.surprise().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_queries() {
        let leregard = LeRegard::from_graph(sample_graph(), LeRegardConfig::default()).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let leregard = leregard.clone();
                tokio::spawn(async move { leregard.search("lake").await.unwrap().len() })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap(), 2);
        }
    }
}

// ============================================================================
// STORE FAILURE TESTS
// ============================================================================

mod store_failure_tests {
    use super::*;
    use legraphe::{
        Direction, EdgeKind, GraphError, GraphStore, Neighbor, Vertex, VertexId, VertexKind,
    };
    use lelexique::LexicalIndex;
    use lepasserelle::LeRegardError;
    use std::sync::Arc;

    struct UnavailableStore;

    fn offline<T>() -> legraphe::Result<T> {
        Err(GraphError::Unavailable("store offline".into()))
    }

    impl GraphStore for UnavailableStore {
        fn get_vertex(&self, _kind: VertexKind, _key: &str) -> legraphe::Result<Vertex> {
            offline()
        }

        fn neighbors(
            &self,
            _start: &VertexId,
            _kinds: &[EdgeKind],
            _direction: Direction,
            _depth: usize,
        ) -> legraphe::Result<Vec<Neighbor>> {
            offline()
        }

        fn vertices(&self, _kind: VertexKind) -> legraphe::Result<Vec<Vertex>> {
            offline()
        }

        fn edges(&self, _kind: EdgeKind) -> legraphe::Result<Vec<Edge>> {
            offline()
        }

        fn count_vertices(&self, _kind: VertexKind) -> legraphe::Result<usize> {
            offline()
        }

        fn count_edges(&self, _kind: EdgeKind) -> legraphe::Result<usize> {
            offline()
        }
    }

    fn offline_facade() -> LeRegard {
        let index = LexicalIndex::from_store(&sample_graph()).unwrap();
        LeRegard::new(Arc::new(UnavailableStore), Arc::new(index), LeRegardConfig::default())
    }

    fn is_unavailable<T: std::fmt::Debug>(result: lepasserelle::Result<T>) -> bool {
        match result {
            Err(e @ LeRegardError::StoreUnavailable { .. }) => !e.is_recoverable(),
            _ => false,
        }
    }

    #[tokio::test]
    async fn test_facade_surfaces_unavailable_store() {
        let leregard = offline_facade();
        assert!(is_unavailable(leregard.search("lake").await));
        assert!(is_unavailable(leregard.discover(vec!["lake1".to_string()]).await));
        assert!(is_unavailable(leregard.image_detail("lake1").await));
        assert!(is_unavailable(leregard.visualize(vec!["lake1".to_string()]).await));
        assert!(is_unavailable(leregard.search_subgraph("lake").await));
        assert!(is_unavailable(leregard.metrics().await));
        assert!(is_unavailable(leregard.surprise().await));
    }

    #[tokio::test]
    async fn test_empty_inputs_never_touch_the_store() {
        let leregard = offline_facade();
        assert!(leregard.search("").await.unwrap().is_empty());
        assert!(leregard.discover(Vec::new()).await.unwrap().is_empty());
    }
}

// ============================================================================
// CONFIGURATION TESTS
// ============================================================================

mod config_tests {
    use super::*;

    #[tokio::test]
    async fn test_config_limits_close_matches() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[search]\nexact_limit = 1\nclose_limit = 0\n").unwrap();

        let config = LeRegardConfig::load_file(&path).unwrap();
        let leregard = LeRegard::from_graph(sample_graph(), config).unwrap();

        let outcome = leregard.search_detailed("lake").await.unwrap();
        assert_eq!(outcome.exact.len(), 1);
        assert!(outcome.close.is_empty());
    }
}

// ============================================================================
// CLI PARSING TESTS
// ============================================================================

mod cli_workflow_tests {
    use super::*;
    use clap::Parser;
    use lepasserelle::cli::{Cli, Commands};

    #[test]
    fn test_cli_info_command_parsing() {
        let cli = Cli::parse_from(["leregard", "info", "lake1", "--snapshot", "/data/graph.json"]);
        assert_eq!(cli.snapshot, Some(PathBuf::from("/data/graph.json")));
        match cli.command {
            Commands::Info { key } => assert_eq!(key, "lake1"),
            _ => panic!("Expected Info command"),
        }
    }

    #[test]
    fn test_cli_config_flag() {
        let cli = Cli::parse_from(["leregard", "-c", "custom.toml", "surprise"]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(cli.command, Commands::Surprise));
    }
}
