//! ledecouverte - Image Discovery
//!
//! *La Découverte* (The Discovery) - Related images through shared metadata, overlapping objects and nearby landmarks

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// Detail view of a single image.
pub mod detail;
/// Discovery engine.
pub mod discovery;
/// Great-circle distances.
pub mod geodesic;
/// Polygon intersection.
pub mod geometry;

pub use detail::{ImageDetail, TagScore};
pub use discovery::{DiscoveryConfig, DiscoveryEngine, DiscoveryOutcome, Error, Result};
pub use geodesic::{check_location, checked_distance, haversine_distance, EARTH_RADIUS_M};
pub use geometry::{polygons_intersect, segments_intersect, GeometryError};

/// Discovery library initialization
pub fn init() {
    let _ = tracing::subscriber::set_default(tracing::subscriber::NoSubscriber::default());
}
