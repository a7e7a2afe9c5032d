//! District detection - the geometric decision core.
//!
//! Every user interaction funnels through here: a click becomes a point,
//! the point is tested against each district boundary, and the first hit
//! names the district. Everything in this module is a pure function of
//! its inputs - no state, no I/O.

use std::f64::consts::PI;

use crate::districts::DistrictMap;
use crate::geometry::Point;

/// Error type for degenerate geometry handed to the locator.
///
/// ## Rust Lesson #4: Error Handling
///
/// Rust uses `Result<T, E>` instead of exceptions:
/// - `Ok(value)` = success
/// - `Err(error)` = failure
///
/// You MUST handle errors - the compiler won't let you ignore them!
/// Common patterns:
/// - `?` operator: early return on error
/// - `.unwrap()`: panic on error (only use in tests!)
/// - `match`: handle each case explicitly
///
/// Note what is NOT an error: a point matching no district. That is a
/// normal outcome and is modeled as `Option::None`, never as `Err`.
#[derive(Debug, PartialEq)]
pub enum GeometryError {
    /// A vertex-less polygon was passed where at least one vertex is required.
    EmptyPolygon,
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryError::EmptyPolygon => write!(f, "polygon has no vertices"),
        }
    }
}

// Makes our error type work with the standard error trait
impl std::error::Error for GeometryError {}

// ============================================================================
// POINT IN POLYGON (Ray Casting Algorithm)
// ============================================================================
//
// ## Rust Lesson #5: References & Slices
//
// `&[Point]` is a "slice" - a borrowed view into a contiguous sequence.
// It works with Vec<Point>, arrays, or any contiguous memory.
//
// Think of it like: function takes a read-only window into your array.
// The `&` means borrowed - we don't take ownership, just look at it.

/// Tolerance for the on-edge test. Boundary data is integer pixels, so
/// anything this close to an edge is on it.
const EDGE_EPS: f64 = 1e-9;

/// Test whether (px, py) lies on the segment from a to b.
#[inline]
fn on_segment(px: f64, py: f64, a: Point, b: Point) -> bool {
    let len2 = (b.x - a.x) * (b.x - a.x) + (b.y - a.y) * (b.y - a.y);
    if len2 <= EDGE_EPS {
        // Zero-length edge (hand-clicked data repeats vertices sometimes):
        // only the vertex itself is on it
        return (px - a.x).abs() <= EDGE_EPS && (py - a.y).abs() <= EDGE_EPS;
    }
    let cross = (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x);
    if cross.abs() > EDGE_EPS * (1.0 + a.distance(b)) {
        return false;
    }
    let dot = (px - a.x) * (b.x - a.x) + (py - a.y) * (b.y - a.y);
    dot >= -EDGE_EPS && dot <= len2 + EDGE_EPS
}

/// Test if a point is inside a polygon using ray casting.
///
/// Casts a ray to the right and counts edge crossings.
/// Odd crossings = inside, even = outside. A point exactly on an edge or
/// vertex counts as inside - district borders belong to the district.
///
/// A polygon with fewer than 3 vertices contains nothing (returns false,
/// does not error). Self-intersecting boundaries are the data producer's
/// problem: behavior is unspecified for them.
#[inline]
pub fn point_in_polygon(px: f64, py: f64, polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    // Boundary first: the ray cast below is ambiguous exactly on edges.
    for i in 0..n {
        let j = (i + 1) % n;
        if on_segment(px, py, polygon[i], polygon[j]) {
            return true;
        }
    }

    let mut inside = false;
    let mut j = n - 1;

    for i in 0..n {
        let (xi, yi) = (polygon[i].x, polygon[i].y);
        let (xj, yj) = (polygon[j].x, polygon[j].y);

        // Ray casting: check if horizontal ray from (px, py) crosses this edge
        if ((yi > py) != (yj > py)) && (px < (xj - xi) * (py - yi) / (yj - yi) + xi) {
            inside = !inside;
        }

        j = i;
    }

    inside
}

// ============================================================================
// DISTRICT DETECTION
// ============================================================================

/// Find which district a point (original image space) falls in.
///
/// Iterates districts in declared order and returns the first whose
/// boundary contains the point. Overlapping boundaries are a data bug, so
/// first-declared-wins is the whole tie-break policy. District counts are
/// single digits - a linear scan beats any spatial index here.
///
/// Returns `None` when no district contains the point (a normal outcome).
pub fn detect_district<'a>(districts: &'a DistrictMap, point: Point) -> Option<&'a str> {
    districts
        .iter()
        .find(|d| d.boundary.contains(point))
        .map(|d| d.name.as_str())
}

// ============================================================================
// MARKER PLACEMENT
// ============================================================================

/// Vertex centroid: the arithmetic mean of the vertex coordinates.
///
/// This is deliberately NOT the area centroid. The boundaries are
/// hand-clicked and the marker layout downstream was tuned against the
/// vertex mean - do not "fix" this to the shoelace centroid.
///
/// Errors with [`GeometryError::EmptyPolygon`] for an empty vertex list;
/// callers must guard rather than receive a made-up default point.
pub fn centroid(points: &[Point]) -> Result<Point, GeometryError> {
    if points.is_empty() {
        return Err(GeometryError::EmptyPolygon);
    }

    let sum_x: f64 = points.iter().map(|p| p.x).sum();
    let sum_y: f64 = points.iter().map(|p| p.y).sum();
    let n = points.len() as f64;

    Ok(Point::new(sum_x / n, sum_y / n))
}

/// Lay out `count` marker positions on a circle around `center`.
///
/// ## Rust Lesson #6: Unsigned Integers
///
/// `count: usize` can't be negative - the type system retires a whole
/// class of invalid input before the function body runs. In JS you'd
/// write `if (count < 0) throw ...`; here the compiler does it.
///
/// - `count == 0`: empty
/// - `count == 1`: exactly `[center]` - no offset, and no divide-by-count
///   degenerate case
/// - `count > 1`: evenly spaced on a circle of radius `spread`, starting
///   at angle 0 and stepping 2π/count counterclockwise, each coordinate
///   rounded to the nearest integer (pixel grid)
///
/// `spread` is in whatever space the caller works in; scale it before
/// calling when placing markers on a resized display.
pub fn radial_positions(center: Point, count: usize, spread: f64) -> Vec<Point> {
    match count {
        0 => Vec::new(),
        1 => vec![center],
        _ => {
            let step = 2.0 * PI / count as f64;
            (0..count)
                .map(|i| {
                    let angle = step * i as f64;
                    Point::new(
                        (center.x + spread * angle.cos()).round(),
                        (center.y + spread * angle.sin()).round(),
                    )
                })
                .collect()
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
