// Single-image detail view

use crate::discovery::{DiscoveryEngine, Result};
use legraphe::{EdgeKind, GraphError, Image, Vertex, VertexKind};
use serde::{Deserialize, Serialize};

/// A tag of an image with its edge score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagScore {
    /// Tag vertex identifier (`Tag/<key>`)
    pub id: String,

    /// Tag label
    pub tag: String,

    /// `TagOf` score
    pub score: f64,
}

/// Everything shown for one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDetail {
    /// The image itself
    pub image: Image,

    /// Best-guess captions
    pub best_guesses: Vec<String>,

    /// Tags, best score first
    pub tags: Vec<TagScore>,

    /// Discovery results for this image alone
    pub similar: Vec<Image>,
}

impl DiscoveryEngine {
    /// Detail view of an image, `None` when the image does not exist
    pub fn image_detail(&self, key: &str) -> Result<Option<ImageDetail>> {
        let image = match self.store().get_vertex(VertexKind::Image, key) {
            Ok(Vertex::Image(image)) => image,
            Ok(_) | Err(GraphError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut best_guesses = Vec::new();
        let mut tags = Vec::new();
        for (vertex, edge) in self
            .store()
            .metadata_edges(key, &[EdgeKind::TagOf, EdgeKind::BestGuessOf])?
        {
            match vertex {
                Vertex::BestGuess(guess) => best_guesses.push(guess.caption),
                Vertex::Tag(tag) => tags.push(TagScore {
                    id: edge.from.to_string(),
                    tag: tag.label,
                    score: edge.score,
                }),
                _ => {}
            }
        }

        let similar = self.discover(&[key])?;
        Ok(Some(ImageDetail {
            image,
            best_guesses,
            tags,
            similar,
        }))
    }
}
