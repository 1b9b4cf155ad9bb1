// Discovery engine
//
// Related images for a seed set, from three sources: shared metadata,
// overlapping object regions and nearby landmarks.

use crate::geodesic::{check_location, haversine_distance};
use crate::geometry::polygons_intersect;
use legraphe::model::by_score_desc;
use legraphe::{
    Direction, Edge, EdgeKind, GraphError, GraphStore, Image, LatLng, Point, Tag, TagType,
    Vertex, VertexKind,
};
use lerecherche::{top_distinct, CollisionCounter, ScoredImage};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Discovery errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Graph store query failed
    #[error("Graph store unavailable: {0}")]
    Store(#[from] GraphError),
}

/// Result type for discovery operations
pub type Result<T> = std::result::Result<T, Error>;

/// Discovery limits and thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Images kept from shared metadata
    pub common_limit: usize,

    /// Rows kept from overlapping objects, before de-duplication
    pub localization_limit: usize,

    /// Candidate object edges must score above this
    pub localization_min_score: f64,

    /// Seed object edges must score above this
    pub seed_object_min_score: f64,

    /// Object tags too generic to localize on
    pub vague_object_tags: Vec<String>,

    /// Landmark distance threshold in meters (exclusive)
    pub landmark_max_distance: f64,

    /// Include overlapping-object matches in the combined result
    pub include_localization: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            common_limit: 6,
            localization_limit: 4,
            localization_min_score: 0.85,
            seed_object_min_score: 0.75,
            vague_object_tags: vec!["Person".into(), "Building".into(), "Lighting".into()],
            landmark_max_distance: 1000.0,
            include_localization: true,
        }
    }
}

/// Candidates from each discovery source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryOutcome {
    /// Images with a landmark near a seed landmark, nearest first
    pub landmark: Vec<Image>,

    /// Images with an object region overlapping a seed object, best edge first
    pub localization: Vec<Image>,

    /// Images sharing the most metadata with the seeds
    pub common: Vec<Image>,
}

impl DiscoveryOutcome {
    /// Landmark, then localization, then common matches, each image once
    pub fn combined(&self, include_localization: bool) -> Vec<Image> {
        let localization: &[Image] = if include_localization {
            &self.localization
        } else {
            &[]
        };

        let mut seen = HashSet::new();
        self.landmark
            .iter()
            .chain(localization)
            .chain(&self.common)
            .filter(|image| seen.insert(image.key.as_str()))
            .cloned()
            .collect()
    }
}

/// Metadata edge of a seed image
struct SeedEdge {
    seed: String,
    vertex: Vertex,
    edge: Edge,
}

/// Related-image discovery over a graph store
pub struct DiscoveryEngine {
    store: Arc<dyn GraphStore>,
    config: DiscoveryConfig,
}

impl DiscoveryEngine {
    /// Create a discovery engine over an explicit store
    pub fn new(store: Arc<dyn GraphStore>, config: DiscoveryConfig) -> Self {
        Self { store, config }
    }

    /// Active configuration
    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub(crate) fn store(&self) -> &dyn GraphStore {
        self.store.as_ref()
    }

    /// Images related to the seeds; seeds never appear
    pub fn discover<S: AsRef<str>>(&self, seeds: &[S]) -> Result<Vec<Image>> {
        Ok(self
            .discover_detailed(seeds)?
            .combined(self.config.include_localization))
    }

    /// Images related to the seeds, per source
    pub fn discover_detailed<S: AsRef<str>>(&self, seeds: &[S]) -> Result<DiscoveryOutcome> {
        let mut seed_keys: Vec<&str> = Vec::new();
        for seed in seeds {
            let seed = seed.as_ref();
            if !seed_keys.contains(&seed) {
                seed_keys.push(seed);
            }
        }
        if seed_keys.is_empty() {
            return Ok(DiscoveryOutcome::default());
        }
        let excluded: HashSet<&str> = seed_keys.iter().copied().collect();

        let seed_edges = self.seed_edges(&seed_keys)?;
        let outcome = DiscoveryOutcome {
            landmark: self.landmark_matches(&seed_edges, &excluded)?,
            localization: self.localization_matches(&seed_edges, &excluded)?,
            common: self.common_matches(&seed_edges, &excluded)?,
        };

        debug!(
            "Discover {:?}: {} landmark, {} localization, {} common",
            seed_keys,
            outcome.landmark.len(),
            outcome.localization.len(),
            outcome.common.len()
        );
        Ok(outcome)
    }

    /// Metadata edges of every seed, per seed best score first; unknown seeds contribute nothing
    fn seed_edges(&self, seeds: &[&str]) -> Result<Vec<SeedEdge>> {
        let mut rows = Vec::new();
        for &seed in seeds {
            let edges = match self.store.metadata_edges(seed, &EdgeKind::ALL) {
                Ok(edges) => edges,
                Err(GraphError::NotFound(_)) => {
                    debug!("Seed image {} not found", seed);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            rows.extend(edges.into_iter().map(|(vertex, edge)| SeedEdge {
                seed: seed.to_string(),
                vertex,
                edge,
            }));
        }
        Ok(rows)
    }

    /// Images and their edges one hop out of a metadata vertex
    fn outbound(&self, vertex: &Vertex) -> Result<Vec<(Image, Vec<Edge>)>> {
        let kind = match vertex.kind().edge_kind() {
            Some(kind) => kind,
            None => return Ok(Vec::new()),
        };

        let neighbors = match self
            .store
            .neighbors(&vertex.id(), &[kind], Direction::Outbound, 1)
        {
            Ok(neighbors) => neighbors,
            Err(GraphError::NotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(neighbors
            .into_iter()
            .filter_map(|n| n.vertex.into_image().map(|image| (image, n.edges)))
            .collect())
    }

    fn common_matches(&self, seed_edges: &[SeedEdge], excluded: &HashSet<&str>) -> Result<Vec<Image>> {
        let mut counter = CollisionCounter::new();
        for (rank, row) in seed_edges.iter().enumerate() {
            let source = format!("{}|{}", row.seed, row.vertex.id());
            for (image, _) in self.outbound(&row.vertex)? {
                if !excluded.contains(image.key.as_str()) {
                    counter.record(&source, rank, image);
                }
            }
        }
        Ok(counter.top(self.config.common_limit))
    }

    fn is_vague(&self, tag: &Tag) -> bool {
        self.config
            .vague_object_tags
            .iter()
            .any(|v| v.eq_ignore_ascii_case(&tag.label))
    }

    fn localization_matches(
        &self,
        seed_edges: &[SeedEdge],
        excluded: &HashSet<&str>,
    ) -> Result<Vec<Image>> {
        let mut rows = Vec::new();

        let seeds = seed_edges.iter().filter(|row| {
            row.edge.tag_type() == Some(TagType::Object)
                && row.edge.score > self.config.seed_object_min_score
                && matches!(&row.vertex, Vertex::Tag(tag) if !self.is_vague(tag))
        });

        for row in seeds {
            let seed_polygon: &[Point] = match row.edge.polygon() {
                Some(polygon) => polygon,
                None => continue,
            };

            for (image, edges) in self.outbound(&row.vertex)? {
                if excluded.contains(image.key.as_str()) {
                    continue;
                }
                for edge in edges {
                    if edge.tag_type() != Some(TagType::Object)
                        || edge.score <= self.config.localization_min_score
                    {
                        continue;
                    }
                    let polygon = match edge.polygon() {
                        Some(polygon) => polygon,
                        None => continue,
                    };
                    match polygons_intersect(seed_polygon, polygon) {
                        Ok(true) => rows.push(ScoredImage {
                            image: image.clone(),
                            score: edge.score,
                        }),
                        Ok(false) => {}
                        Err(e) => warn!("Skipping object edge {}: {}", edge.id, e),
                    }
                }
            }
        }

        Ok(top_distinct(rows, self.config.localization_limit))
    }

    fn landmark_matches(
        &self,
        seed_edges: &[SeedEdge],
        excluded: &HashSet<&str>,
    ) -> Result<Vec<Image>> {
        let seed_locations: Vec<LatLng> = seed_edges
            .iter()
            .filter_map(|row| {
                let location = row.edge.location()?;
                match check_location(location) {
                    Ok(location) => Some(location),
                    Err(e) => {
                        warn!("Skipping seed landmark edge {}: {}", row.edge.id, e);
                        None
                    }
                }
            })
            .collect();
        if seed_locations.is_empty() {
            return Ok(Vec::new());
        }

        let mut nearest: HashMap<String, f64> = HashMap::new();
        for edge in self.store.edges(EdgeKind::TagOf)? {
            let location = match edge.location() {
                Some(location) => location,
                None => continue,
            };
            if excluded.contains(edge.to.key.as_str()) {
                continue;
            }
            let location = match check_location(location) {
                Ok(location) => location,
                Err(e) => {
                    warn!("Skipping landmark edge {}: {}", edge.id, e);
                    continue;
                }
            };

            for &seed in &seed_locations {
                let distance = haversine_distance(seed, location);
                if distance < self.config.landmark_max_distance {
                    let best = nearest.entry(edge.to.key.clone()).or_insert(distance);
                    *best = best.min(distance);
                }
            }
        }

        let mut ranked: Vec<(String, f64)> = nearest.into_iter().collect();
        ranked.sort_by(|a, b| by_score_desc(b.1, a.1).then_with(|| a.0.cmp(&b.0)));

        let mut images = Vec::with_capacity(ranked.len());
        for (key, _) in ranked {
            match self.store.get_vertex(VertexKind::Image, &key) {
                Ok(vertex) => images.extend(vertex.into_image()),
                Err(GraphError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(images)
    }
}
