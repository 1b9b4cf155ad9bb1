// Random keyword suggestions ("surprise me")

use crate::search::Result;
use legraphe::{EdgeKind, GraphStore, Vertex, VertexKind};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Labels too generic to make an interesting query
pub const IGNORED_WORDS: &[&str] = &[
    "atmosphere",
    "cloud",
    "image",
    "stock.xchng",
    "sky",
    "wallpaper",
    "photograph",
    "person",
];

/// Surprise keyword settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurpriseConfig {
    /// Upper bound on labels per suggestion
    pub max_tags: usize,

    /// Lowest `TagOf` score a label may have
    pub min_score: f64,

    /// Labels never suggested (compared lower-cased)
    pub ignored_words: Vec<String>,
}

impl Default for SurpriseConfig {
    fn default() -> Self {
        Self {
            max_tags: 3,
            min_score: 0.60,
            ignored_words: IGNORED_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

/// Suggests a query built from the labels of a random image
pub struct SurpriseKeywords {
    store: Arc<dyn GraphStore>,
    config: SurpriseConfig,
}

impl SurpriseKeywords {
    /// Create a suggester over a store
    pub fn new(store: Arc<dyn GraphStore>, config: SurpriseConfig) -> Self {
        Self { store, config }
    }

    /// Labels of one random image joined by spaces
    ///
    /// Returns `None` when the graph has no image or the picked image has no
    /// suitable label.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> Result<Option<String>> {
        let images = self.store.vertices(VertexKind::Image)?;
        let image = match images.choose(rng) {
            Some(image) => image,
            None => return Ok(None),
        };

        let mut labels: Vec<String> = Vec::new();
        for (vertex, edge) in self.store.metadata_edges(image.key(), &[EdgeKind::TagOf])? {
            if edge.score < self.config.min_score {
                continue;
            }
            if let Vertex::Tag(tag) = vertex {
                let lower = tag.label.to_lowercase();
                if !self.config.ignored_words.iter().any(|w| w.eq_ignore_ascii_case(&lower))
                    && !labels.contains(&tag.label)
                {
                    labels.push(tag.label);
                }
            }
        }

        if labels.is_empty() || self.config.max_tags == 0 {
            debug!("No surprise labels on image {}", image.key());
            return Ok(None);
        }

        let wanted = rng.gen_range(1..=self.config.max_tags);
        let picked: Vec<&str> = labels
            .choose_multiple(rng, wanted.min(labels.len()))
            .map(String::as_str)
            .collect();
        Ok(Some(picked.join(" ")))
    }
}
