//! Planar geometry for region boundaries.
//!
//! Boundaries are simple polygons given as an exterior ring. The ring is
//! implicitly closed; a repeated closing vertex is dropped on construction.

use crate::region::RegionId;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Rejection-sampling attempts before a boundary is declared unusable.
pub const MAX_POINT_ATTEMPTS: u32 = 10_000;

/// A point in the plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn sub(self, o: Point) -> Point {
        Point::new(self.x - o.x, self.y - o.y)
    }

    fn dot(self, o: Point) -> f64 {
        self.x * o.x + self.y * o.y
    }

    fn cross(self, o: Point) -> f64 {
        self.x * o.y - self.y * o.x
    }

    /// Euclidean distance to another point.
    pub fn distance(self, o: Point) -> f64 {
        let d = self.sub(o);
        d.dot(d).sqrt()
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Whether two boxes overlap once both are grown by `margin`.
    pub fn overlaps(&self, other: &Bounds, margin: f64) -> bool {
        self.min_x - margin <= other.max_x
            && other.min_x - margin <= self.max_x
            && self.min_y - margin <= other.max_y
            && other.min_y - margin <= self.max_y
    }
}

/// A simple polygon described by its exterior ring.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    exterior: Vec<Point>,
}

impl Polygon {
    pub fn new(mut exterior: Vec<Point>) -> Self {
        if exterior.len() > 1 && exterior.first() == exterior.last() {
            exterior.pop();
        }
        Self { exterior }
    }

    /// Axis-aligned rectangle with lower-left corner `(x, y)`.
    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(vec![
            Point::new(x, y),
            Point::new(x + width, y),
            Point::new(x + width, y + height),
            Point::new(x, y + height),
        ])
    }

    pub fn vertices(&self) -> &[Point] {
        &self.exterior
    }

    /// Ring edges as `(start, end)` pairs, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.exterior.len();
        (0..n).map(move |i| (self.exterior[i], self.exterior[(i + 1) % n]))
    }

    /// Unsigned area (shoelace formula).
    pub fn area(&self) -> f64 {
        if self.exterior.len() < 3 {
            return 0.0;
        }
        let twice: f64 = self.edges().map(|(a, b)| a.cross(b)).sum();
        (twice / 2.0).abs()
    }

    pub fn bounds(&self) -> Bounds {
        self.exterior.iter().fold(
            Bounds {
                min_x: f64::INFINITY,
                min_y: f64::INFINITY,
                max_x: f64::NEG_INFINITY,
                max_y: f64::NEG_INFINITY,
            },
            |b, p| Bounds {
                min_x: b.min_x.min(p.x),
                min_y: b.min_y.min(p.y),
                max_x: b.max_x.max(p.x),
                max_y: b.max_y.max(p.y),
            },
        )
    }

    /// Reason the polygon cannot serve as a region boundary, if any.
    pub fn degeneracy(&self) -> Option<&'static str> {
        if self.exterior.len() < 3 {
            return Some("fewer than three vertices");
        }
        let finite = |p: &Point| p.x.is_finite() && p.y.is_finite();
        if !self.exterior.iter().all(finite) {
            return Some("non-finite coordinate");
        }
        let area = self.area();
        if !area.is_finite() || area <= 0.0 {
            return Some("zero area");
        }
        None
    }

    /// Even-odd ray casting. Points exactly on the boundary may go either way.
    pub fn contains(&self, p: Point) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Smallest distance between the two boundaries, 0 when they cross or nest.
    pub fn distance_to(&self, other: &Polygon) -> f64 {
        if self.exterior.iter().any(|&p| other.contains(p))
            || other.exterior.iter().any(|&p| self.contains(p))
        {
            return 0.0;
        }
        let mut best = f64::INFINITY;
        for (a, b) in self.edges() {
            for (c, d) in other.edges() {
                best = best.min(segment_distance(a, b, c, d));
                if best == 0.0 {
                    return 0.0;
                }
            }
        }
        best
    }

    /// Whether the boundaries are within `tolerance` of each other.
    pub fn touches(&self, other: &Polygon, tolerance: f64) -> bool {
        self.bounds().overlaps(&other.bounds(), tolerance) && self.distance_to(other) <= tolerance
    }

    /// Uniform rejection sample inside the polygon, giving up after `max_attempts`.
    pub fn sample_point<R: Rng + ?Sized>(&self, rng: &mut R, max_attempts: u32) -> Option<Point> {
        let b = self.bounds();
        if !(b.min_x < b.max_x && b.min_y < b.max_y) {
            return None;
        }
        for _ in 0..max_attempts {
            let p = Point::new(
                rng.gen_range(b.min_x..b.max_x),
                rng.gen_range(b.min_y..b.max_y),
            );
            if self.contains(p) {
                return Some(p);
            }
        }
        None
    }
}

fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = b.sub(a);
    let len2 = ab.dot(ab);
    if len2 == 0.0 {
        return p.distance(a);
    }
    let t = (p.sub(a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * ab.x, a.y + t * ab.y))
}

fn orientation(a: Point, b: Point, c: Point) -> f64 {
    b.sub(a).cross(c.sub(a))
}

fn segments_cross(a: Point, b: Point, c: Point, d: Point) -> bool {
    let d1 = orientation(c, d, a);
    let d2 = orientation(c, d, b);
    let d3 = orientation(a, b, c);
    let d4 = orientation(a, b, d);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

fn segment_distance(a: Point, b: Point, c: Point, d: Point) -> f64 {
    if segments_cross(a, b, c, d) {
        return 0.0;
    }
    point_segment_distance(a, c, d)
        .min(point_segment_distance(b, c, d))
        .min(point_segment_distance(c, a, b))
        .min(point_segment_distance(d, a, b))
}

/// Boundary of one region as handed over by a geometry loader.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionGeometry {
    pub id: RegionId,
    pub boundary: Polygon,
}

/// Synthetic `cols x rows` layout of square cells with row-major ids from 0.
pub fn grid_regions(cols: u32, rows: u32, cell: f64) -> Vec<RegionGeometry> {
    let mut out = Vec::with_capacity((cols * rows) as usize);
    for r in 0..rows {
        for c in 0..cols {
            out.push(RegionGeometry {
                id: RegionId(r * cols + c),
                boundary: Polygon::rectangle(f64::from(c) * cell, f64::from(r) * cell, cell, cell),
            });
        }
    }
    out
}
