// Keyword search engine

use crate::ranking::{top_distinct, CollisionCounter, ScoredImage};
use legraphe::{Direction, EdgeKind, GraphError, GraphStore, Image, VertexId};
use lelexique::{Bm25Params, FieldBoosts, FuzzyMatches, IndexError, TextSearch};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Search errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Graph store query failed
    #[error("Graph store unavailable: {0}")]
    Store(#[from] GraphError),

    /// Text index query failed
    #[error("Text index unavailable: {0}")]
    Index(#[from] IndexError),
}

/// Result type for search operations
pub type Result<T> = std::result::Result<T, Error>;

/// Search limits and scoring parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Rows kept from the exact phase, before de-duplication
    pub exact_limit: usize,

    /// Images kept from the fuzzy phase
    pub close_limit: usize,

    /// Fuzzy-matched documents traversed
    pub fuzzy_document_limit: usize,

    /// Per-field BM25 multipliers
    pub boosts: FieldBoosts,

    /// BM25 parameters
    pub bm25: Bm25Params,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exact_limit: 10,
            close_limit: 5,
            fuzzy_document_limit: 25,
            boosts: FieldBoosts::default(),
            bm25: Bm25Params::default(),
        }
    }
}

/// Images found by each phase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Images linked to a metadata field equal to the keyword, best edge first
    pub exact: Vec<Image>,

    /// Images reached by relevance matches, most collisions first
    pub close: Vec<Image>,
}

impl SearchOutcome {
    /// Exact matches followed by close matches
    pub fn into_images(self) -> Vec<Image> {
        let mut images = self.exact;
        images.extend(self.close);
        images
    }

    /// Total number of images
    pub fn len(&self) -> usize {
        self.exact.len() + self.close.len()
    }

    /// True when neither phase found anything
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keyword search over a graph store and its text index
pub struct SearchEngine {
    store: Arc<dyn GraphStore>,
    index: Arc<dyn TextSearch>,
    config: SearchConfig,
}

impl SearchEngine {
    /// Create a search engine over an explicit store and index
    pub fn new(store: Arc<dyn GraphStore>, index: Arc<dyn TextSearch>, config: SearchConfig) -> Self {
        Self {
            store,
            index,
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search images for a keyword
    pub fn search(&self, keyword: &str) -> Result<Vec<Image>> {
        Ok(self.search_detailed(keyword)?.into_images())
    }

    /// Search images for a keyword, keeping the two phases apart
    pub fn search_detailed(&self, keyword: &str) -> Result<SearchOutcome> {
        let tokens = self.index.analyze(keyword);
        if tokens.is_empty() {
            return Ok(SearchOutcome::default());
        }

        let exact = match tokens.exact.as_deref() {
            Some(token) => self.exact_phase(token)?,
            None => Vec::new(),
        };

        let exclude: HashSet<&str> = exact.iter().map(|i| i.key.as_str()).collect();
        let close = self.close_phase(&tokens.fuzzy, &exclude)?;

        debug!(
            "Search {:?}: {} exact, {} close",
            keyword,
            exact.len(),
            close.len()
        );
        Ok(SearchOutcome { exact, close })
    }

    /// Metadata vertices matching a keyword by relevance, bounded by the fan-out limit
    pub fn matched_metadata(&self, keyword: &str) -> Result<FuzzyMatches> {
        let tokens = self.index.analyze(keyword);
        self.fuzzy(&tokens.fuzzy)
    }

    fn fuzzy(&self, tokens: &[String]) -> Result<FuzzyMatches> {
        if tokens.is_empty() {
            return Ok(FuzzyMatches::default());
        }
        let mut matches = self
            .index
            .fuzzy_match(tokens, &self.config.boosts, &self.config.bm25)?;
        matches.truncate(self.config.fuzzy_document_limit);
        Ok(matches)
    }

    fn exact_phase(&self, token: &str) -> Result<Vec<Image>> {
        let mut rows = Vec::new();
        for id in self.index.exact_match(token)? {
            rows.extend(self.outbound_images(&id)?);
        }
        Ok(top_distinct(rows, self.config.exact_limit))
    }

    fn close_phase(&self, tokens: &[String], exclude: &HashSet<&str>) -> Result<Vec<Image>> {
        let matches = self.fuzzy(tokens)?;

        let mut counter = CollisionCounter::new();
        for (rank, hit) in matches.iter().enumerate() {
            let source = hit.id.to_string();
            for row in self.outbound_images(&hit.id)? {
                if !exclude.contains(row.image.key.as_str()) {
                    counter.record(&source, rank, row.image);
                }
            }
        }
        Ok(counter.top(self.config.close_limit))
    }

    /// Images one hop out of a metadata vertex; a vertex missing from the store reaches nothing
    fn outbound_images(&self, id: &VertexId) -> Result<Vec<ScoredImage>> {
        let neighbors = match self
            .store
            .neighbors(id, &EdgeKind::ALL, Direction::Outbound, 1)
        {
            Ok(neighbors) => neighbors,
            Err(GraphError::NotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(neighbors
            .into_iter()
            .filter_map(|n| {
                let score = n.score();
                n.vertex.into_image().map(|image| ScoredImage { image, score })
            })
            .collect())
    }
}
