// leregard - Query Facade
//
// *Le Regard* (The Gaze) - Unified async API over the graph, index and engines

use crate::config::LeRegardConfig;
use crate::errors::Result;
use ledecouverte::{DiscoveryEngine, ImageDetail};
use legraphe::{GraphMetrics, GraphSnapshot, GraphStore, Image, PropertyGraph, RestoreReport};
use lelexique::{LexicalIndex, TextSearch};
use lerecherche::{SearchEngine, SearchOutcome, SurpriseKeywords};
use levue::{Subgraph, SubgraphBuilder};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// LeRegard - Main query facade
///
/// Holds an explicit store and index context shared by every engine. Each
/// query is a stateless read run on the blocking thread pool, so concurrent
/// calls proceed independently.
///
/// # Example
///
/// ```ignore
/// let leregard = LeRegard::open_snapshot("graph.json", LeRegardConfig::default())?;
/// let images = leregard.search("mountain").await?;
/// ```
#[derive(Clone)]
pub struct LeRegard {
    store: Arc<dyn GraphStore>,
    config: LeRegardConfig,
    search: Arc<SearchEngine>,
    discovery: Arc<DiscoveryEngine>,
    visual: Arc<SubgraphBuilder>,
    surprise: Arc<SurpriseKeywords>,
}

impl LeRegard {
    /// Create a facade over an explicit store and index
    pub fn new(store: Arc<dyn GraphStore>, index: Arc<dyn TextSearch>, config: LeRegardConfig) -> Self {
        Self {
            search: Arc::new(SearchEngine::new(
                store.clone(),
                index,
                config.search.clone(),
            )),
            discovery: Arc::new(DiscoveryEngine::new(store.clone(), config.discovery.clone())),
            visual: Arc::new(SubgraphBuilder::new(store.clone())),
            surprise: Arc::new(SurpriseKeywords::new(store.clone(), config.surprise.clone())),
            store,
            config,
        }
    }

    /// Index an in-memory graph and wrap it
    ///
    /// The facade serves the graph as loaded. To keep ingesting, build the
    /// store and a shared `LexicalIndex` yourself and use [`LeRegard::new`].
    pub fn from_graph(graph: PropertyGraph, config: LeRegardConfig) -> Result<Self> {
        let index = LexicalIndex::from_store(&graph)?;
        Ok(Self::new(Arc::new(graph), Arc::new(index), config))
    }

    /// Restore a snapshot file into a fresh graph and wrap it
    pub fn open_snapshot<P: AsRef<Path>>(path: P, config: LeRegardConfig) -> Result<(Self, RestoreReport)> {
        let path = path.as_ref();
        let (graph, report) = GraphSnapshot::load(path)?.into_graph()?;
        info!(
            "Loaded snapshot {} ({} vertices, {} edges)",
            path.display(),
            report.vertices_inserted,
            report.edges_inserted
        );
        Ok((Self::from_graph(graph, config)?, report))
    }

    /// Active configuration
    pub fn config(&self) -> &LeRegardConfig {
        &self.config
    }

    /// Images matching a keyword: exact matches, then close matches
    pub async fn search(&self, keyword: &str) -> Result<Vec<Image>> {
        Ok(self.search_detailed(keyword).await?.into_images())
    }

    /// Keyword search keeping the two phases apart
    pub async fn search_detailed(&self, keyword: &str) -> Result<SearchOutcome> {
        let engine = self.search.clone();
        let keyword = keyword.to_string();
        let outcome = tokio::task::spawn_blocking(move || engine.search_detailed(&keyword)).await??;
        Ok(outcome)
    }

    /// Images related to a seed set
    pub async fn discover(&self, seeds: Vec<String>) -> Result<Vec<Image>> {
        let engine = self.discovery.clone();
        let images = tokio::task::spawn_blocking(move || engine.discover(&seeds)).await??;
        Ok(images)
    }

    /// Detail view of one image, `None` when it does not exist
    pub async fn image_detail(&self, key: &str) -> Result<Option<ImageDetail>> {
        let engine = self.discovery.clone();
        let key = key.to_string();
        let detail = tokio::task::spawn_blocking(move || engine.image_detail(&key)).await??;
        Ok(detail)
    }

    /// Subgraph of seed images and the given related images
    pub async fn build_subgraph(&self, seeds: Vec<String>, related: Vec<Image>) -> Result<Subgraph> {
        let builder = self.visual.clone();
        let subgraph =
            tokio::task::spawn_blocking(move || builder.build_subgraph(&seeds, &related)).await??;
        Ok(subgraph)
    }

    /// Subgraph of seed images, with their discovery results when enabled
    pub async fn visualize(&self, seeds: Vec<String>) -> Result<Subgraph> {
        let related = if self.config.visualization.include_related {
            self.discover(seeds.clone()).await?
        } else {
            Vec::new()
        };
        self.build_subgraph(seeds, related).await
    }

    /// Subgraph of a keyword's results and the metadata that matched it
    pub async fn search_subgraph(&self, keyword: &str) -> Result<Subgraph> {
        let engine = self.search.clone();
        let builder = self.visual.clone();
        let keyword = keyword.to_string();

        let subgraph = tokio::task::spawn_blocking(move || -> Result<Subgraph> {
            let results = engine.search(&keyword)?;
            let matched = engine.matched_metadata(&keyword)?;
            Ok(builder.build_search_subgraph(&matched, &results)?)
        })
        .await??;
        Ok(subgraph)
    }

    /// Per-kind vertex and edge counts
    pub async fn metrics(&self) -> Result<GraphMetrics> {
        let store = self.store.clone();
        let metrics = tokio::task::spawn_blocking(move || GraphMetrics::collect(store.as_ref())).await??;
        Ok(metrics)
    }

    /// Random keywords built from one image's labels
    pub async fn surprise(&self) -> Result<Option<String>> {
        let surprise = self.surprise.clone();
        let keywords =
            tokio::task::spawn_blocking(move || surprise.pick(&mut rand::thread_rng())).await??;
        Ok(keywords)
    }
}

impl std::fmt::Debug for LeRegard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeRegard")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
