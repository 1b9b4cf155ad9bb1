// lerecherche - Keyword Search
//
// *La Recherche* (The Search) - Exact and relevance keyword search over the image graph

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// Collision counting and score ordering.
pub mod ranking;
/// Two-phase keyword search.
pub mod search;
/// Random keyword suggestions.
pub mod surprise;

pub use ranking::{top_distinct, Collision, CollisionCounter, ScoredImage};
pub use search::{Error, Result, SearchConfig, SearchEngine, SearchOutcome};
pub use surprise::{SurpriseConfig, SurpriseKeywords, IGNORED_WORDS};

/// Search library initialization
pub fn init() {
    let _ = tracing::subscriber::set_default(tracing::subscriber::NoSubscriber::default());
}
