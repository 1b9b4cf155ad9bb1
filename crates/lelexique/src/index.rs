// Lexical index over metadata vertices
//
// Every Author, Tag and BestGuess vertex is one document with two projections:
// its normalized whole-field token and its relevance tokens.

use crate::analyzer::{Analyzers, QueryTokens};
use crate::bm25::{self, Bm25Params, CorpusStats, TermStat};
use legraphe::{GraphError, GraphStore, Vertex, VertexId, VertexKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::debug;

/// Text index errors
#[derive(Debug, Error)]
pub enum IndexError {
    /// Reading the graph failed while building the index
    #[error("Graph store error: {0}")]
    Store(#[from] GraphError),

    /// Index lock poisoned
    #[error("Index unavailable: {0}")]
    Unavailable(String),

    /// Images carry no indexed text
    #[error("Vertex {0} is not a metadata vertex")]
    NotIndexable(VertexId),
}

/// Result type for index operations
pub type Result<T> = std::result::Result<T, IndexError>;

/// Indexed field, one per metadata vertex kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Author display name
    Author,

    /// Tag label
    Tag,

    /// Best-guess caption
    BestGuess,
}

impl FieldKind {
    /// Field indexed for a vertex kind
    pub fn of(kind: VertexKind) -> Option<Self> {
        match kind {
            VertexKind::Image => None,
            VertexKind::Author => Some(FieldKind::Author),
            VertexKind::Tag => Some(FieldKind::Tag),
            VertexKind::BestGuess => Some(FieldKind::BestGuess),
        }
    }
}

/// Per-field score multipliers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldBoosts {
    /// Author name boost
    pub author: f64,

    /// Tag label boost
    pub tag: f64,

    /// Best-guess caption boost
    pub best_guess: f64,
}

impl Default for FieldBoosts {
    fn default() -> Self {
        Self {
            author: 4.0,
            tag: 3.0,
            best_guess: 2.0,
        }
    }
}

impl FieldBoosts {
    /// Multiplier for a field
    pub fn boost(&self, field: FieldKind) -> f64 {
        match field {
            FieldKind::Author => self.author,
            FieldKind::Tag => self.tag,
            FieldKind::BestGuess => self.best_guess,
        }
    }
}

/// One ranked fuzzy hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyMatch {
    /// Matched metadata vertex
    pub id: VertexId,

    /// Boosted BM25 score
    pub score: f64,
}

/// Fuzzy hits ordered by descending score
///
/// The list is finite and owned; `iter()` can be called any number of times.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FuzzyMatches {
    ranked: Vec<FuzzyMatch>,
}

impl FuzzyMatches {
    /// Wrap hits, sorting them by score descending then vertex id
    pub fn new(mut ranked: Vec<FuzzyMatch>) -> Self {
        ranked.sort_by(|a, b| {
            legraphe::model::by_score_desc(a.score, b.score).then_with(|| a.id.cmp(&b.id))
        });
        Self { ranked }
    }

    /// Iterate from the best hit
    pub fn iter(&self) -> std::slice::Iter<'_, FuzzyMatch> {
        self.ranked.iter()
    }

    /// Number of hits
    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    /// True when nothing matched
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    /// Keep only the best `n` hits
    pub fn truncate(&mut self, n: usize) {
        self.ranked.truncate(n);
    }

    /// Matched vertex ids in rank order
    pub fn ids(&self) -> Vec<VertexId> {
        self.ranked.iter().map(|m| m.id.clone()).collect()
    }
}

impl<'a> IntoIterator for &'a FuzzyMatches {
    type Item = &'a FuzzyMatch;
    type IntoIter = std::slice::Iter<'a, FuzzyMatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for FuzzyMatches {
    type Item = FuzzyMatch;
    type IntoIter = std::vec::IntoIter<FuzzyMatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranked.into_iter()
    }
}

/// Token and relevance lookup over metadata text
pub trait TextSearch: Send + Sync {
    /// Project a query string through the index analyzers
    fn analyze(&self, query: &str) -> QueryTokens;

    /// Metadata vertices whose normalized field equals `token`, ordered by id
    fn exact_match(&self, token: &str) -> Result<Vec<VertexId>>;

    /// Metadata vertices containing any of `tokens`, best BM25 score first
    fn fuzzy_match(
        &self,
        tokens: &[String],
        boosts: &FieldBoosts,
        params: &Bm25Params,
    ) -> Result<FuzzyMatches>;
}

#[derive(Debug)]
struct Document {
    id: VertexId,
    field: FieldKind,
    tokens: Vec<String>,
}

#[derive(Debug, Default)]
struct Inner {
    documents: Vec<Document>,
    by_id: HashMap<VertexId, usize>,
    exact: HashMap<String, Vec<usize>>,
    postings: HashMap<String, Vec<usize>>,
    total_tokens: usize,
}

impl Inner {
    fn stats(&self) -> CorpusStats {
        let n = self.documents.len();
        CorpusStats {
            document_count: n,
            average_length: if n == 0 {
                0.0
            } else {
                self.total_tokens as f64 / n as f64
            },
        }
    }
}

/// In-memory lexical index
///
/// Built from a store snapshot by [`LexicalIndex::from_store`]. Loaders that
/// insert metadata into the store afterwards must also call
/// [`LexicalIndex::index_vertex`]; queries see the vertex once both return.
#[derive(Debug, Default)]
pub struct LexicalIndex {
    analyzers: Analyzers,
    inner: RwLock<Inner>,
}

impl LexicalIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every metadata vertex of a store
    pub fn from_store(store: &dyn GraphStore) -> Result<Self> {
        let index = Self::new();
        for kind in [VertexKind::Author, VertexKind::Tag, VertexKind::BestGuess] {
            for vertex in store.vertices(kind)? {
                index.index_vertex(&vertex)?;
            }
        }
        debug!("Indexed {} metadata documents", index.len()?);
        Ok(index)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|e| IndexError::Unavailable(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|e| IndexError::Unavailable(e.to_string()))
    }

    /// Add one metadata vertex; returns false when it was already indexed
    pub fn index_vertex(&self, vertex: &Vertex) -> Result<bool> {
        let id = vertex.id();
        let (field, text) = match (FieldKind::of(vertex.kind()), vertex.text()) {
            (Some(field), Some(text)) => (field, text),
            _ => return Err(IndexError::NotIndexable(id)),
        };

        let exact = self.analyzers.norm.normalize(text);
        let tokens = self.analyzers.text.tokenize(text);

        let mut inner = self.write()?;
        if inner.by_id.contains_key(&id) {
            return Ok(false);
        }

        let doc = inner.documents.len();
        if let Some(exact) = exact {
            inner.exact.entry(exact).or_default().push(doc);
        }
        let mut distinct = tokens.clone();
        distinct.sort();
        distinct.dedup();
        for token in distinct {
            inner.postings.entry(token).or_default().push(doc);
        }
        inner.total_tokens += tokens.len();
        inner.by_id.insert(id.clone(), doc);
        inner.documents.push(Document { id, field, tokens });
        Ok(true)
    }

    /// Number of indexed documents
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.documents.len())
    }

    /// True when nothing is indexed
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl TextSearch for LexicalIndex {
    fn analyze(&self, query: &str) -> QueryTokens {
        self.analyzers.analyze(query)
    }

    fn exact_match(&self, token: &str) -> Result<Vec<VertexId>> {
        let inner = self.read()?;
        let mut ids: Vec<VertexId> = inner
            .exact
            .get(token)
            .map(|docs| docs.iter().map(|&d| inner.documents[d].id.clone()).collect())
            .unwrap_or_default();
        ids.sort();
        Ok(ids)
    }

    fn fuzzy_match(
        &self,
        tokens: &[String],
        boosts: &FieldBoosts,
        params: &Bm25Params,
    ) -> Result<FuzzyMatches> {
        let inner = self.read()?;
        let stats = inner.stats();

        let mut candidates: Vec<usize> = tokens
            .iter()
            .filter_map(|t| inner.postings.get(t))
            .flatten()
            .copied()
            .collect();
        candidates.sort_unstable();
        candidates.dedup();

        let hits = candidates
            .into_iter()
            .map(|d| {
                let doc = &inner.documents[d];
                let terms: Vec<TermStat> = tokens
                    .iter()
                    .map(|t| TermStat {
                        term_frequency: doc.tokens.iter().filter(|x| *x == t).count(),
                        document_frequency: inner.postings.get(t).map_or(0, Vec::len),
                    })
                    .collect();
                let raw = bm25::score(&terms, doc.tokens.len(), &stats, params);
                FuzzyMatch {
                    id: doc.id.clone(),
                    score: boosts.boost(doc.field) * raw,
                }
            })
            .collect();

        let matches = FuzzyMatches::new(hits);
        debug!("Fuzzy match {:?}: {} documents", tokens, matches.len());
        Ok(matches)
    }
}
