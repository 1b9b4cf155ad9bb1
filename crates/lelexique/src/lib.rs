//! lelexique - Lexical Index
//!
//! *Le Lexique* (The Lexicon) - Exact and BM25 relevance lookup over image metadata text

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// Normalizing and stemming analyzers.
pub mod analyzer;
/// Okapi BM25 scoring.
pub mod bm25;
/// Lexical index and the text search contract.
pub mod index;

pub use analyzer::{Analyzers, NormAnalyzer, QueryTokens, TextAnalyzer, STOP_WORDS};
pub use bm25::{Bm25Params, CorpusStats, TermStat};
pub use index::{
    FieldBoosts, FieldKind, FuzzyMatch, FuzzyMatches, IndexError, LexicalIndex, Result, TextSearch,
};

/// Lexicon library initialization
pub fn init() {
    let _ = tracing::subscriber::set_default(tracing::subscriber::NoSubscriber::default());
}
