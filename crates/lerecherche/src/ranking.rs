// Ranking primitives shared by search and discovery

use legraphe::model::by_score_desc;
use legraphe::Image;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Image reached by a traversal, with the score of the edge that reached it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredImage {
    /// Reached image
    pub image: Image,

    /// Edge score
    pub score: f64,
}

/// Sort rows by score (stable), keep `limit` rows, then drop repeated images
///
/// The limit applies before de-duplication, so fewer than `limit` images may
/// come back when one image is reached by several top rows.
pub fn top_distinct(mut rows: Vec<ScoredImage>, limit: usize) -> Vec<Image> {
    rows.sort_by(|a, b| by_score_desc(a.score, b.score));
    rows.truncate(limit);

    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| seen.insert(row.image.key.clone()))
        .map(|row| row.image)
        .collect()
}

/// Image with the number of distinct paths that reached it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collision {
    /// Candidate image
    pub image: Image,

    /// Distinct sources that reached the image
    pub count: usize,

    /// Rank of the first source that reached the image
    pub first_rank: usize,
}

/// Collision counter keyed by image key
#[derive(Debug, Default)]
pub struct CollisionCounter {
    entries: Vec<Collision>,
    by_key: HashMap<String, usize>,
    sources: HashSet<(String, String)>,
}

impl CollisionCounter {
    /// Create an empty counter
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `source` (ranked `rank`) reached `image`
    ///
    /// The same source reaching the same image twice counts once.
    pub fn record(&mut self, source: &str, rank: usize, image: Image) {
        if !self.sources.insert((source.to_string(), image.key.clone())) {
            return;
        }

        match self.by_key.get(&image.key) {
            Some(&i) => self.entries[i].count += 1,
            None => {
                self.by_key.insert(image.key.clone(), self.entries.len());
                self.entries.push(Collision {
                    image,
                    count: 1,
                    first_rank: rank,
                });
            }
        }
    }

    /// Number of distinct images seen
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collisions by count descending, then first rank, then encounter order
    pub fn ranked(mut self) -> Vec<Collision> {
        // sort_by is stable, encounter order breaks the remaining ties
        self.entries.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.first_rank.cmp(&b.first_rank))
        });
        self.entries
    }

    /// Best `limit` images
    pub fn top(self, limit: usize) -> Vec<Image> {
        self.ranked()
            .into_iter()
            .take(limit)
            .map(|c| c.image)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(key: &str) -> Image {
        Image::new(key, "Jane Doe", format!("https://picsum.photos/id/{}", key))
    }

    fn row(key: &str, score: f64) -> ScoredImage {
        ScoredImage {
            image: image(key),
            score,
        }
    }

    fn keys(images: &[Image]) -> Vec<&str> {
        images.iter().map(|i| i.key.as_str()).collect()
    }

    #[test]
    fn test_top_distinct_orders_by_score() {
        let rows = vec![row("1", 0.5), row("2", 0.9), row("3", 0.7)];
        assert_eq!(keys(&top_distinct(rows, 10)), vec!["2", "3", "1"]);
    }

    #[test]
    fn test_top_distinct_limits_rows_before_dedup() {
        let rows = vec![row("1", 0.9), row("1", 0.8), row("2", 0.7)];
        assert_eq!(keys(&top_distinct(rows, 2)), vec!["1"]);
    }

    #[test]
    fn test_collision_counts() {
        let mut counter = CollisionCounter::new();
        counter.record("tag-a", 0, image("1"));
        counter.record("tag-a", 0, image("2"));
        counter.record("tag-b", 1, image("2"));
        counter.record("tag-b", 1, image("2"));
        counter.record("tag-c", 2, image("3"));

        let ranked = counter.ranked();
        assert_eq!(ranked[0].image.key, "2");
        assert_eq!(ranked[0].count, 2);
        assert_eq!(ranked[1].image.key, "1");
        assert_eq!(ranked[2].image.key, "3");
    }

    #[test]
    fn test_collision_ties_break_by_first_rank() {
        let mut counter = CollisionCounter::new();
        counter.record("late", 3, image("late"));
        counter.record("early", 1, image("early"));
        assert_eq!(keys(&counter.top(1)), vec!["early"]);
    }
}
