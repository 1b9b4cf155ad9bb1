// Bounding polygon intersection
//
// Polygons are rings of normalized points, optionally closed by repeating the
// first point. Two polygons intersect when their regions share at least one
// point: an edge of one crosses or touches an edge of the other, or one lies
// inside the other.

use legraphe::Point;
use thiserror::Error;

/// Geometry errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Polygon or coordinate unusable for geometric tests
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}

/// Distinct vertices of a ring, without the closing point
fn ring(polygon: &[Point]) -> Result<Vec<Point>, GeometryError> {
    if let Some(p) = polygon.iter().find(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(GeometryError::InvalidGeometry(format!(
            "non-finite point ({}, {})",
            p.x, p.y
        )));
    }

    let mut points: Vec<Point> = Vec::with_capacity(polygon.len());
    for &p in polygon {
        if points.last() != Some(&p) {
            points.push(p);
        }
    }
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    if points.len() < 3 {
        return Err(GeometryError::InvalidGeometry(format!(
            "polygon needs 3 distinct points, got {}",
            points.len()
        )));
    }
    Ok(points)
}

fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// `p` lies within the bounding box of segment `a`-`b` (assumes collinearity)
fn on_segment(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Closed segments `p1`-`p2` and `q1`-`q2` share a point
pub fn segments_intersect(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let d1 = cross(q1, q2, p1);
    let d2 = cross(q1, q2, p2);
    let d3 = cross(p1, p2, q1);
    let d4 = cross(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}

/// Even-odd containment of `p` in a ring
fn contains(ring: &[Point], p: Point) -> bool {
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn edges(ring: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    ring.iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(&a, &b)| (a, b))
}

/// Whether two polygon regions intersect
///
/// Touching boundaries count as an intersection.
pub fn polygons_intersect(a: &[Point], b: &[Point]) -> Result<bool, GeometryError> {
    let a = ring(a)?;
    let b = ring(b)?;

    for (p1, p2) in edges(&a) {
        if edges(&b).any(|(q1, q2)| segments_intersect(p1, p2, q1, q2)) {
            return Ok(true);
        }
    }

    // No boundary contact, so either disjoint or nested
    Ok(contains(&b, a[0]) || contains(&a, b[0]))
}
