// Integration tests for keyword search
//
// These tests run both search phases over a small populated graph and check
// the ordering and size bounds of the combined result.

#[cfg(test)]
mod tests {
    use legraphe::{Annotation, Author, BestGuess, Edge, Image, PropertyGraph, Tag};
    use lelexique::LexicalIndex;
    use lerecherche::{SearchConfig, SearchEngine};
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    const VOCABULARY: &[&str] = &[
        "mountain", "mountains", "lake", "lakes", "tree", "trees", "snow", "river", "forest",
    ];

    fn engine(graph: PropertyGraph) -> SearchEngine {
        let index = LexicalIndex::from_store(&graph).unwrap();
        SearchEngine::new(Arc::new(graph), Arc::new(index), SearchConfig::default())
    }

    fn add_image(graph: &PropertyGraph, key: &str, author: &str) {
        let author = Author::new(author);
        graph
            .insert_vertex(Image::new(key, author.name.as_str(), "https://picsum.photos"))
            .unwrap();
        graph.insert_vertex(author.clone()).unwrap();
        graph.insert_edge(Edge::author_of(&author, key)).unwrap();
    }

    fn add_label(graph: &PropertyGraph, key: &str, label: &str, score: f64) {
        let tag = Tag::new(label, None);
        graph.insert_vertex(tag.clone()).unwrap();
        graph
            .insert_edge(Edge::tag_of(&tag, key, score, Annotation::Label))
            .unwrap();
    }

    #[test]
    fn test_mountain_scenario() {
        let graph = PropertyGraph::new();
        add_image(&graph, "42", "Jane Doe");
        add_image(&graph, "7", "John Roe");

        let mountain = Tag::new("mountain", Some("MOUNTAIN".to_string()));
        graph.insert_vertex(mountain.clone()).unwrap();
        graph
            .insert_edge(Edge::tag_of(&mountain, "42", 0.9, Annotation::Label))
            .unwrap();
        add_label(&graph, "7", "mountains", 0.8);

        let engine = engine(graph);
        let outcome = engine.search_detailed("mountain").unwrap();
        assert_eq!(outcome.exact.len(), 1);
        assert_eq!(outcome.exact[0].key, "42");
        assert_eq!(outcome.close.len(), 1);
        assert_eq!(outcome.close[0].key, "7");

        let keys: Vec<String> = engine
            .search("mountain")
            .unwrap()
            .into_iter()
            .map(|i| i.key)
            .collect();
        assert_eq!(keys, vec!["42", "7"]);
    }

    #[test]
    fn test_author_and_caption_fields() {
        let graph = PropertyGraph::new();
        add_image(&graph, "1", "Ansel Adams");
        add_image(&graph, "2", "Jane Doe");
        let guess = BestGuess::new("yosemite valley");
        graph.insert_vertex(guess.clone()).unwrap();
        graph.insert_edge(Edge::best_guess_of(&guess, "2")).unwrap();

        let engine = engine(graph);
        let by_author: Vec<String> = engine
            .search("ansel adams")
            .unwrap()
            .into_iter()
            .map(|i| i.key)
            .collect();
        assert_eq!(by_author, vec!["1"]);

        let by_caption: Vec<String> = engine
            .search("Yosemite")
            .unwrap()
            .into_iter()
            .map(|i| i.key)
            .collect();
        assert_eq!(by_caption, vec!["2"]);
    }

    #[test]
    fn test_search_is_repeatable() {
        let graph = PropertyGraph::new();
        for i in 0..8 {
            let key = i.to_string();
            add_image(&graph, &key, "Jane Doe");
            add_label(&graph, &key, VOCABULARY[i % VOCABULARY.len()], 0.5 + i as f64 / 20.0);
        }
        let engine = engine(graph);

        let first = engine.search("lake trees").unwrap();
        let second = engine.search("lake trees").unwrap();
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn prop_search_bounds(
            labels in prop::collection::vec((0usize..VOCABULARY.len(), 0.0f64..1.5), 1..40),
            query in 0usize..VOCABULARY.len(),
        ) {
            let graph = PropertyGraph::new();
            for (i, (label, score)) in labels.iter().enumerate() {
                let key = (i % 15).to_string();
                add_image(&graph, &key, "Jane Doe");
                add_label(&graph, &key, VOCABULARY[*label], *score);
            }

            let outcome = engine(graph).search_detailed(VOCABULARY[query]).unwrap();
            prop_assert!(outcome.exact.len() <= 10);
            prop_assert!(outcome.close.len() <= 5);

            let exact: HashSet<&str> = outcome.exact.iter().map(|i| i.key.as_str()).collect();
            prop_assert_eq!(exact.len(), outcome.exact.len());
            prop_assert!(outcome.close.iter().all(|i| !exact.contains(i.key.as_str())));
        }
    }
}
