// Node and edge colors

use legraphe::VertexKind;

/// Author nodes
pub const AUTHOR_COLOR: &str = "#E9D758";

/// Tag nodes
pub const TAG_COLOR: &str = "#297373";

/// Best-guess nodes
pub const BEST_GUESS_COLOR: &str = "#FF8552";

/// Seed image nodes
pub const SEED_IMAGE_COLOR: &str = "#FF36AB";

/// Any other image node
pub const IMAGE_COLOR: &str = "#422040";

/// Node label font color
pub const FONT_COLOR: &str = "white";

/// Edge colors, cycled per image connection
pub const EDGE_COLORS: [&str; 6] = ["#241023", "#4464AD", "#DC0073", "#47A025", "#FF7700", "#6B0504"];

/// Color of a node of the given kind (non-seed images)
pub fn vertex_color(kind: VertexKind) -> &'static str {
    match kind {
        VertexKind::Image => IMAGE_COLOR,
        VertexKind::Author => AUTHOR_COLOR,
        VertexKind::Tag => TAG_COLOR,
        VertexKind::BestGuess => BEST_GUESS_COLOR,
    }
}

/// Edge color of the `index`-th connection
pub fn edge_color(index: usize) -> &'static str {
    EDGE_COLORS[index % EDGE_COLORS.len()]
}
