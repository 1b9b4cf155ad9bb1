// Text analyzers
//
// Two projections of every indexed field: a whole-field normalized token for
// exact matching and stemmed, stop-word filtered tokens for relevance matching.

use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Words ignored by the relevance analyzer
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "and", "or", "of", "with", "at", "an", "this", "that", "these", "those", "my",
    "your", "his", "her", "their", "from", "into", "during", "including", "until", "against",
    "among", "throughout", "despite", "towards", "upon", "concerning", "to", "in", "for", "on",
    "by", "about", "like", "through", "over", "before", "between", "after", "since", "without",
    "under", "within", "along", "following", "across", "behind", "beyond", "plus", "except",
    "but", "up", "out", "around", "down", "off", "above", "near",
];

/// Lower-case and strip accents
pub fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whole-field analyzer: accent-stripped, lower-cased, trimmed
#[derive(Debug, Clone, Copy, Default)]
pub struct NormAnalyzer;

impl NormAnalyzer {
    /// Normalized token of `text`, `None` when nothing remains
    pub fn normalize(&self, text: &str) -> Option<String> {
        let folded = fold(text.trim());
        let folded = folded.trim();
        (!folded.is_empty()).then(|| folded.to_string())
    }
}

/// Relevance analyzer: folded, word-segmented, stop words removed, stemmed
pub struct TextAnalyzer {
    stemmer: Stemmer,
    stop_words: HashSet<&'static str>,
}

impl TextAnalyzer {
    /// English analyzer with the default stop words
    pub fn english() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
            stop_words: STOP_WORDS.iter().copied().collect(),
        }
    }

    /// Tokens of `text` in order of appearance
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        fold(text)
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty() && !self.stop_words.contains(word))
            .map(|word| self.stemmer.stem(word).into_owned())
            .collect()
    }
}

impl Default for TextAnalyzer {
    fn default() -> Self {
        Self::english()
    }
}

impl std::fmt::Debug for TextAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextAnalyzer")
            .field("stop_words", &self.stop_words.len())
            .finish()
    }
}

/// Both projections of a query string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryTokens {
    /// Whole-field normalized token
    pub exact: Option<String>,

    /// Relevance tokens, deduplicated, in order of appearance
    pub fuzzy: Vec<String>,
}

impl QueryTokens {
    /// True when neither projection produced a token
    pub fn is_empty(&self) -> bool {
        self.exact.is_none() && self.fuzzy.is_empty()
    }
}

/// The pair of analyzers shared by indexing and querying
#[derive(Debug, Default)]
pub struct Analyzers {
    /// Exact-match analyzer
    pub norm: NormAnalyzer,

    /// Relevance analyzer
    pub text: TextAnalyzer,
}

impl Analyzers {
    /// Tokenize a query once per analyzer
    pub fn analyze(&self, query: &str) -> QueryTokens {
        let mut seen = HashSet::new();
        let fuzzy = self
            .text
            .tokenize(query)
            .into_iter()
            .filter(|t| seen.insert(t.clone()))
            .collect();

        QueryTokens {
            exact: self.norm.normalize(query),
            fuzzy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_strips_accents() {
        assert_eq!(fold("Crème Brûlée"), "creme brulee");
        assert_eq!(fold("ÉCOLE"), "ecole");
    }

    #[test]
    fn test_normalize_whole_field() {
        let norm = NormAnalyzer;
        assert_eq!(norm.normalize("  Mountain Range "), Some("mountain range".to_string()));
        assert_eq!(norm.normalize("   "), None);
    }

    #[test]
    fn test_tokenize_stems_and_drops_stop_words() {
        let text = TextAnalyzer::english();
        assert_eq!(text.tokenize("Mountains of the Alps"), vec!["mountain", "alp"]);
        assert_eq!(text.tokenize("mountain"), vec!["mountain"]);
        assert!(text.tokenize("the of and").is_empty());
    }

    #[test]
    fn test_analyze_dedups_fuzzy_tokens() {
        let analyzers = Analyzers::default();
        let tokens = analyzers.analyze("Lake lakes LAKE");
        assert_eq!(tokens.exact.as_deref(), Some("lake lakes lake"));
        assert_eq!(tokens.fuzzy, vec!["lake"]);
        assert!(analyzers.analyze("").is_empty());
    }
}
