// Okapi BM25 scoring
//
// Pure functions over term statistics; the index supplies the counts.

use serde::{Deserialize, Serialize};

/// BM25 tuning parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    /// Term frequency saturation
    pub k1: f64,

    /// Length normalization (0 = none, 1 = full)
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 2.4, b: 1.0 }
    }
}

/// Corpus-wide statistics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorpusStats {
    /// Number of documents in the corpus
    pub document_count: usize,

    /// Mean document length in tokens
    pub average_length: f64,
}

/// Statistics of one query term against one document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermStat {
    /// Occurrences of the term in the document
    pub term_frequency: usize,

    /// Documents containing the term
    pub document_frequency: usize,
}

/// Inverse document frequency, always non-negative
pub fn idf(document_count: usize, document_frequency: usize) -> f64 {
    let n = document_count as f64;
    let df = document_frequency.min(document_count) as f64;
    (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
}

/// BM25 score of a document of `document_length` tokens for the given terms
pub fn score(
    terms: &[TermStat],
    document_length: usize,
    corpus: &CorpusStats,
    params: &Bm25Params,
) -> f64 {
    let avgdl = if corpus.average_length > 0.0 {
        corpus.average_length
    } else {
        1.0
    };
    let norm = 1.0 - params.b + params.b * document_length as f64 / avgdl;

    terms
        .iter()
        .filter(|t| t.term_frequency > 0)
        .map(|t| {
            let tf = t.term_frequency as f64;
            idf(corpus.document_count, t.document_frequency) * tf * (params.k1 + 1.0)
                / (tf + params.k1 * norm)
        })
        .sum()
}

/// BM25 score of a tokenized document for distinct query tokens
pub fn score_tokens<F>(
    query: &[String],
    document: &[String],
    document_frequency: F,
    corpus: &CorpusStats,
    params: &Bm25Params,
) -> f64
where
    F: Fn(&str) -> usize,
{
    let terms: Vec<TermStat> = query
        .iter()
        .map(|q| TermStat {
            term_frequency: document.iter().filter(|t| *t == q).count(),
            document_frequency: document_frequency(q),
        })
        .collect();
    score(&terms, document.len(), corpus, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn corpus(n: usize, avg: f64) -> CorpusStats {
        CorpusStats {
            document_count: n,
            average_length: avg,
        }
    }

    #[test]
    fn test_idf_rare_terms_weigh_more() {
        assert!(idf(100, 1) > idf(100, 50));
        assert!(idf(100, 100) > 0.0);
    }

    #[test]
    fn test_missing_term_scores_zero() {
        let terms = [TermStat {
            term_frequency: 0,
            document_frequency: 3,
        }];
        assert_eq!(score(&terms, 4, &corpus(10, 4.0), &Bm25Params::default()), 0.0);
    }

    #[test]
    fn test_single_term_value() {
        // tf = 1, dl = avgdl, so the tf component reduces to 1
        let terms = [TermStat {
            term_frequency: 1,
            document_frequency: 1,
        }];
        let s = score(&terms, 2, &corpus(4, 2.0), &Bm25Params::default());
        let expected = (1.0_f64 + 3.5 / 1.5).ln();
        assert!((s - expected).abs() < 1e-12);
    }

    #[test]
    fn test_shorter_documents_score_higher() {
        let query = vec!["lake".to_string()];
        let df = |_: &str| 2;
        let stats = corpus(10, 3.0);
        let params = Bm25Params::default();

        let short = score_tokens(&query, &["lake".to_string()], df, &stats, &params);
        let long = score_tokens(
            &query,
            &["lake".into(), "blue".into(), "calm".into(), "water".into()],
            df,
            &stats,
            &params,
        );
        assert!(short > long);
    }

    #[test]
    fn test_zero_average_length() {
        let terms = [TermStat {
            term_frequency: 1,
            document_frequency: 1,
        }];
        assert!(score(&terms, 1, &corpus(1, 0.0), &Bm25Params::default()).is_finite());
    }

    proptest! {
        #[test]
        fn prop_score_non_negative(
            tf in 0usize..20,
            df in 0usize..50,
            n in 1usize..50,
            len in 0usize..30,
        ) {
            let terms = [TermStat { term_frequency: tf, document_frequency: df }];
            let s = score(&terms, len, &corpus(n, 5.0), &Bm25Params::default());
            prop_assert!(s >= 0.0);
            prop_assert!(s.is_finite());
        }

        #[test]
        fn prop_more_occurrences_never_lower(tf in 1usize..20, len in 20usize..40) {
            let stats = corpus(30, 10.0);
            let params = Bm25Params::default();
            let lo = score(&[TermStat { term_frequency: tf, document_frequency: 5 }], len, &stats, &params);
            let hi = score(&[TermStat { term_frequency: tf + 1, document_frequency: 5 }], len, &stats, &params);
            prop_assert!(hi >= lo);
        }
    }
}
