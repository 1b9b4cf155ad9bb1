// Vertex and edge model for the image graph

use crate::keys;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Score given to authorship and best-guess edges
pub const FIXED_SCORE: f64 = 1.0;

/// Highest score an upstream annotation may keep after clamping
pub const MAX_ANNOTATION_SCORE: f64 = 0.999;

const LAT_MAX: f64 = 90.0;
const LONG_MAX: f64 = 180.0;

/// Vertex kind (one collection per kind)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VertexKind {
    /// A photograph
    Image,

    /// The person credited for an image
    Author,

    /// A label, localized object, landmark or color
    Tag,

    /// A web "best guess" caption
    BestGuess,
}

impl VertexKind {
    /// All vertex kinds, images first
    pub const ALL: [VertexKind; 4] = [
        VertexKind::Image,
        VertexKind::Author,
        VertexKind::Tag,
        VertexKind::BestGuess,
    ];

    /// Collection name used in rendered identifiers
    pub fn collection(&self) -> &'static str {
        match self {
            VertexKind::Image => "Image",
            VertexKind::Author => "Author",
            VertexKind::Tag => "Tag",
            VertexKind::BestGuess => "BestGuess",
        }
    }

    /// Whether this kind describes an image rather than being one
    pub fn is_metadata(&self) -> bool {
        !matches!(self, VertexKind::Image)
    }

    /// Edge kind leaving vertices of this kind, if any
    pub fn edge_kind(&self) -> Option<EdgeKind> {
        match self {
            VertexKind::Image => None,
            VertexKind::Author => Some(EdgeKind::AuthorOf),
            VertexKind::Tag => Some(EdgeKind::TagOf),
            VertexKind::BestGuess => Some(EdgeKind::BestGuessOf),
        }
    }
}

impl fmt::Display for VertexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

/// Edge kind; every edge points from a metadata vertex to an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Author -> Image
    AuthorOf,

    /// Tag -> Image
    TagOf,

    /// BestGuess -> Image
    BestGuessOf,
}

impl EdgeKind {
    /// Every metadata edge kind
    pub const ALL: [EdgeKind; 3] = [EdgeKind::AuthorOf, EdgeKind::TagOf, EdgeKind::BestGuessOf];

    /// Collection name used in rendered identifiers
    pub fn collection(&self) -> &'static str {
        match self {
            EdgeKind::AuthorOf => "AuthorOf",
            EdgeKind::TagOf => "TagOf",
            EdgeKind::BestGuessOf => "BestGuessOf",
        }
    }

    /// The only vertex kind allowed as the `from` end
    pub fn source_kind(&self) -> VertexKind {
        match self {
            EdgeKind::AuthorOf => VertexKind::Author,
            EdgeKind::TagOf => VertexKind::Tag,
            EdgeKind::BestGuessOf => VertexKind::BestGuess,
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

/// Identifier of a vertex, unique across kinds
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId {
    /// Vertex kind
    pub kind: VertexKind,

    /// Key, unique within the kind
    pub key: String,
}

impl VertexId {
    /// Create a vertex identifier
    pub fn new(kind: VertexKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
        }
    }

    /// Shorthand for an image identifier
    pub fn image(key: impl Into<String>) -> Self {
        Self::new(VertexKind::Image, key)
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.key)
    }
}

/// Identifier of an edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId {
    /// Edge kind
    pub kind: EdgeKind,

    /// Key, unique within the kind
    pub key: String,
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.key)
    }
}

/// A photograph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Key assigned by the image source
    pub key: String,

    /// Display name of the author
    pub author: String,

    /// Download URL
    pub url: String,

    /// Ingestion time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Image {
    /// Create an image with no creation time
    pub fn new(key: impl Into<String>, author: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            author: author.into(),
            url: url.into(),
            created_at: None,
        }
    }
}

/// The person credited for one or more images
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    /// Derived from the display name
    pub key: String,

    /// Display name
    pub name: String,
}

impl Author {
    /// Create an author, deriving the key from the name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            key: keys::author_key(&name),
            name,
        }
    }
}

/// A label, object, landmark or color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// Derived from the model id when known, otherwise the label
    pub key: String,

    /// Label text
    pub label: String,

    /// Stable identifier from the annotation model
    #[serde(default)]
    pub model_id: Option<String>,

    /// Color hex for color tags
    #[serde(default)]
    pub hex: Option<String>,
}

impl Tag {
    /// Create a tag
    pub fn new(label: impl Into<String>, model_id: Option<String>) -> Self {
        let label = label.into();
        Self {
            key: keys::tag_key(&label, model_id.as_deref()),
            label,
            model_id,
            hex: None,
        }
    }

    /// Create a color tag (color family plus hex)
    pub fn color(family: impl Into<String>, hex: impl Into<String>) -> Self {
        let mut tag = Self::new(family, None);
        tag.hex = Some(hex.into());
        tag
    }
}

/// A best-guess caption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestGuess {
    /// Derived from the caption
    pub key: String,

    /// Caption text
    pub caption: String,
}

impl BestGuess {
    /// Create a caption, deriving the key from its text
    pub fn new(caption: impl Into<String>) -> Self {
        let caption = caption.into();
        Self {
            key: keys::guess_key(&caption),
            caption,
        }
    }
}

/// Vertex in the image graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Vertex {
    /// Image vertex
    Image(Image),

    /// Author vertex
    Author(Author),

    /// Tag vertex
    Tag(Tag),

    /// Best-guess vertex
    BestGuess(BestGuess),
}

impl Vertex {
    /// Vertex kind
    pub fn kind(&self) -> VertexKind {
        match self {
            Vertex::Image(_) => VertexKind::Image,
            Vertex::Author(_) => VertexKind::Author,
            Vertex::Tag(_) => VertexKind::Tag,
            Vertex::BestGuess(_) => VertexKind::BestGuess,
        }
    }

    /// Vertex key
    pub fn key(&self) -> &str {
        match self {
            Vertex::Image(v) => &v.key,
            Vertex::Author(v) => &v.key,
            Vertex::Tag(v) => &v.key,
            Vertex::BestGuess(v) => &v.key,
        }
    }

    /// Vertex identifier
    pub fn id(&self) -> VertexId {
        VertexId::new(self.kind(), self.key())
    }

    /// Searchable text of a metadata vertex
    pub fn text(&self) -> Option<&str> {
        match self {
            Vertex::Image(_) => None,
            Vertex::Author(v) => Some(&v.name),
            Vertex::Tag(v) => Some(&v.label),
            Vertex::BestGuess(v) => Some(&v.caption),
        }
    }

    /// Borrow as an image
    pub fn as_image(&self) -> Option<&Image> {
        match self {
            Vertex::Image(image) => Some(image),
            _ => None,
        }
    }

    /// Convert into an image
    pub fn into_image(self) -> Option<Image> {
        match self {
            Vertex::Image(image) => Some(image),
            _ => None,
        }
    }
}

impl From<Image> for Vertex {
    fn from(v: Image) -> Self {
        Vertex::Image(v)
    }
}

impl From<Author> for Vertex {
    fn from(v: Author) -> Self {
        Vertex::Author(v)
    }
}

impl From<Tag> for Vertex {
    fn from(v: Tag) -> Self {
        Vertex::Tag(v)
    }
}

impl From<BestGuess> for Vertex {
    fn from(v: BestGuess) -> Self {
        Vertex::BestGuess(v)
    }
}

/// Normalized 2-D point of a bounding polygon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position, 0 at the left edge
    pub x: f64,

    /// Vertical position, 0 at the top edge
    pub y: f64,
}

impl Point {
    /// Create a point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude
    pub latitude: f64,

    /// Longitude
    pub longitude: f64,
}

impl LatLng {
    /// Create a coordinate, clamping to valid ranges
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: latitude.clamp(-LAT_MAX, LAT_MAX),
            longitude: longitude.clamp(-LONG_MAX, LONG_MAX),
        }
    }
}

/// Kind of annotation a `TagOf` edge came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagType {
    /// Whole-image label, web entity or color
    Label,

    /// Localized object with a bounding polygon
    Object,

    /// Landmark with a location
    Landmark,
}

/// Payload carried by an edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Annotation {
    /// Authorship or caption edge
    Plain,

    /// Label edge
    Label,

    /// Object edge; the polygon is closed by repeating its first point
    Object {
        /// Bounding region
        polygon: Vec<Point>,
    },

    /// Landmark edge
    Landmark {
        /// Landmark location
        location: LatLng,
    },
}

impl Annotation {
    /// Tag type of a `TagOf` annotation
    pub fn tag_type(&self) -> Option<TagType> {
        match self {
            Annotation::Plain => None,
            Annotation::Label => Some(TagType::Label),
            Annotation::Object { .. } => Some(TagType::Object),
            Annotation::Landmark { .. } => Some(TagType::Landmark),
        }
    }

    /// Build an object annotation, closing the polygon if needed
    pub fn object(mut polygon: Vec<Point>) -> Self {
        if let (Some(first), Some(last)) = (polygon.first().copied(), polygon.last().copied()) {
            if polygon.len() > 1 && first != last {
                polygon.push(first);
            }
        }
        Annotation::Object { polygon }
    }

    /// Build a landmark annotation
    pub fn landmark(latitude: f64, longitude: f64) -> Self {
        Annotation::Landmark {
            location: LatLng::new(latitude, longitude),
        }
    }
}

/// Directed, scored edge from a metadata vertex to an image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Edge identifier
    pub id: EdgeId,

    /// Metadata vertex
    pub from: VertexId,

    /// Image vertex
    pub to: VertexId,

    /// Confidence in [0, 1]
    pub score: f64,

    /// Edge payload
    pub annotation: Annotation,
}

impl Edge {
    /// Authorship edge
    pub fn author_of(author: &Author, image_key: &str) -> Self {
        Self::build(
            EdgeKind::AuthorOf,
            VertexId::new(VertexKind::Author, author.key.clone()),
            image_key,
            FIXED_SCORE,
            Annotation::Plain,
        )
    }

    /// Best-guess edge
    pub fn best_guess_of(guess: &BestGuess, image_key: &str) -> Self {
        Self::build(
            EdgeKind::BestGuessOf,
            VertexId::new(VertexKind::BestGuess, guess.key.clone()),
            image_key,
            FIXED_SCORE,
            Annotation::Plain,
        )
    }

    /// Tag edge with an upstream annotation score
    pub fn tag_of(tag: &Tag, image_key: &str, raw_score: f64, annotation: Annotation) -> Self {
        Self::build(
            EdgeKind::TagOf,
            VertexId::new(VertexKind::Tag, tag.key.clone()),
            image_key,
            clamp_score(raw_score),
            annotation,
        )
    }

    fn build(
        kind: EdgeKind,
        from: VertexId,
        image_key: &str,
        score: f64,
        annotation: Annotation,
    ) -> Self {
        Self {
            id: EdgeId {
                kind,
                key: keys::edge_key(&from.key, image_key),
            },
            from,
            to: VertexId::image(image_key),
            score,
            annotation,
        }
    }

    /// Edge kind
    pub fn kind(&self) -> EdgeKind {
        self.id.kind
    }

    /// Tag type of a `TagOf` edge
    pub fn tag_type(&self) -> Option<TagType> {
        self.annotation.tag_type()
    }

    /// Bounding polygon of an object edge
    pub fn polygon(&self) -> Option<&[Point]> {
        match &self.annotation {
            Annotation::Object { polygon } => Some(polygon),
            _ => None,
        }
    }

    /// Location of a landmark edge
    pub fn location(&self) -> Option<LatLng> {
        match &self.annotation {
            Annotation::Landmark { location } => Some(*location),
            _ => None,
        }
    }
}

/// Clamp an upstream annotation score into [0, 1)
///
/// Scores of 1 or more become [`MAX_ANNOTATION_SCORE`]; NaN is passed through
/// so that insertion rejects it.
pub fn clamp_score(raw: f64) -> f64 {
    if raw.is_nan() {
        raw
    } else if raw >= 1.0 {
        MAX_ANNOTATION_SCORE
    } else {
        raw.max(0.0)
    }
}

/// Order two scores descending, NaN last
pub fn by_score_desc(a: f64, b: f64) -> std::cmp::Ordering {
    b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
}
