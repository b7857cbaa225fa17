//! Geometry kernel: distances, projections and shape intersections.
//!
//! Pure functions over world coordinates. Degenerate inputs — parallel
//! lines, concentric circles, zero-length spans — yield empty results,
//! never errors; free-hand drawing produces them all the time.

use crate::scene::{PointId, ScenePoint, Shape, ShapeKind};
use kurbo::Point;
use std::collections::HashMap;

/// Tolerance for parallelism and tangency tests.
pub const EPS: f64 = 1e-9;

/// Inclusion buffer for bounded-participant tests, in world units.
const BOUNDS_BUFFER: f64 = 1e-3;

/// Discriminant threshold below which a line/circle crossing collapses to
/// a single tangent point.
const TANGENT_TOLERANCE: f64 = 1e-3;

/// How far "infinite" lines extend beyond their defining points.
const EXTENSION: f64 = 10_000.0;

/// Parameter range of a line-family shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinearBound {
    /// Unbounded in both directions.
    Infinite,
    /// Bounded at the first point, open through the second.
    Ray,
    /// Bounded at both points.
    Segment,
}

impl LinearBound {
    /// Bound of a line-family shape kind; `None` for circles.
    pub fn of(kind: ShapeKind) -> Option<Self> {
        match kind {
            ShapeKind::Segment => Some(LinearBound::Segment),
            ShapeKind::Line => Some(LinearBound::Infinite),
            ShapeKind::Ray => Some(LinearBound::Ray),
            ShapeKind::Circle => None,
        }
    }
}

/// Euclidean distance between two points.
pub fn distance(p: Point, q: Point) -> f64 {
    (q - p).hypot()
}

/// Far endpoints for rendering/hit-testing the infinite line through
/// `p1` and `p2`. Degenerates to a vertical line when `|dx|` is near zero.
pub fn line_extension(p1: Point, p2: Point) -> (Point, Point) {
    let dx = p2.x - p1.x;
    if dx.abs() < BOUNDS_BUFFER {
        return (
            Point::new(p1.x, -EXTENSION),
            Point::new(p1.x, EXTENSION),
        );
    }

    let m = (p2.y - p1.y) / dx;
    let b = p1.y - m * p1.x;
    (
        Point::new(-EXTENSION, m * -EXTENSION + b),
        Point::new(EXTENSION, m * EXTENSION + b),
    )
}

/// Endpoints for a ray from `origin` through `through`: the origin itself
/// and a far point along the direction.
pub fn ray_extension(origin: Point, through: Point) -> (Point, Point) {
    let v = through - origin;
    let len = v.hypot();
    if len < EPS {
        return (origin, origin);
    }
    (origin, origin + v * (EXTENSION / len))
}

/// Scalar projection of `p` onto the line through `a` and `b`.
///
/// With `clamp` the parameter is restricted to `[0, 1]` (segment/ray
/// semantics); without it the full line is used.
pub fn project_linear(p: Point, a: Point, b: Point, clamp: bool) -> Point {
    let ab = b - a;
    let len_sq = ab.hypot2();
    if len_sq < EPS {
        return a;
    }

    let mut t = (p - a).dot(ab) / len_sq;
    if clamp {
        t = t.clamp(0.0, 1.0);
    }
    a + ab * t
}

/// Nearest point on the circle centered at `center` through `radius_point`.
pub fn project_on_circle(p: Point, center: Point, radius_point: Point) -> Point {
    let r = distance(center, radius_point);
    let v = p - center;
    let d = v.hypot();
    if d < EPS {
        // Cursor exactly on the center: pick a deterministic spot.
        return Point::new(center.x + r, center.y);
    }
    center + v * (r / d)
}

/// Whether `p` lies within the axis-aligned bounds of the span `a..b`.
fn on_segment(p: Point, a: Point, b: Point) -> bool {
    p.x >= a.x.min(b.x) - BOUNDS_BUFFER
        && p.x <= a.x.max(b.x) + BOUNDS_BUFFER
        && p.y >= a.y.min(b.y) - BOUNDS_BUFFER
        && p.y <= a.y.max(b.y) + BOUNDS_BUFFER
}

/// Whether `p` lies on the `origin`-side half-line through `through`.
fn on_ray(p: Point, origin: Point, through: Point) -> bool {
    (p - origin).dot(through - origin) >= -BOUNDS_BUFFER
}

fn within_bound(p: Point, a: Point, b: Point, bound: LinearBound) -> bool {
    match bound {
        LinearBound::Infinite => true,
        LinearBound::Ray => on_ray(p, a, b),
        LinearBound::Segment => on_segment(p, a, b),
    }
}

/// Intersection of two line-family shapes: 2x2 solve for the crossing
/// parameter, then bound checks for each participant.
pub fn linear_linear_intersection(
    a1: Point,
    a2: Point,
    bound_a: LinearBound,
    b1: Point,
    b2: Point,
    bound_b: LinearBound,
) -> Vec<Point> {
    let denom = (b2.y - b1.y) * (a2.x - a1.x) - (b2.x - b1.x) * (a2.y - a1.y);
    if denom.abs() < EPS {
        return Vec::new(); // Parallel
    }

    let ua = ((b2.x - b1.x) * (a1.y - b1.y) - (b2.y - b1.y) * (a1.x - b1.x)) / denom;
    let p = Point::new(a1.x + ua * (a2.x - a1.x), a1.y + ua * (a2.y - a1.y));

    if !within_bound(p, a1, a2, bound_a) || !within_bound(p, b1, b2, bound_b) {
        return Vec::new();
    }
    vec![p]
}

/// Intersection of a line-family shape with a circle, via the determinant
/// form of the line/circle quadratic.
pub fn linear_circle_intersection(
    a1: Point,
    a2: Point,
    bound: LinearBound,
    center: Point,
    radius_point: Point,
) -> Vec<Point> {
    let r = distance(center, radius_point);
    let x1 = a1.x - center.x;
    let y1 = a1.y - center.y;
    let x2 = a2.x - center.x;
    let y2 = a2.y - center.y;

    let dx = x2 - x1;
    let dy = y2 - y1;
    let dr_sq = dx * dx + dy * dy;
    if dr_sq < EPS {
        return Vec::new();
    }

    let det = x1 * y2 - x2 * y1;
    let disc = r * r * dr_sq - det * det;
    if disc < 0.0 {
        return Vec::new();
    }

    let root = disc.max(0.0).sqrt();
    let sign = if dy < 0.0 { -1.0 } else { 1.0 };
    let first = Point::new(
        (det * dy + sign * dx * root) / dr_sq + center.x,
        (-det * dx + dy.abs() * root) / dr_sq + center.y,
    );
    let second = Point::new(
        (det * dy - sign * dx * root) / dr_sq + center.x,
        (-det * dx - dy.abs() * root) / dr_sq + center.y,
    );

    let mut out = Vec::new();
    if within_bound(first, a1, a2, bound) {
        out.push(first);
    }
    // A near-zero discriminant is a tangency: both roots collapse.
    if disc > TANGENT_TOLERANCE && within_bound(second, a1, a2, bound) {
        out.push(second);
    }
    out
}

/// Intersection of two circles via the radical line construction.
pub fn circle_circle_intersection(
    c1: Point,
    r1_point: Point,
    c2: Point,
    r2_point: Point,
) -> Vec<Point> {
    let r1 = distance(c1, r1_point);
    let r2 = distance(c2, r2_point);
    let d = distance(c1, c2);

    // Concentric, too far apart, or one inside the other.
    if d < EPS || d > r1 + r2 + EPS || d < (r1 - r2).abs() - EPS {
        return Vec::new();
    }

    let a = (r1 * r1 - r2 * r2 + d * d) / (2.0 * d);
    let h = (r1 * r1 - a * a).max(0.0).sqrt();

    let mx = c1.x + a * (c2.x - c1.x) / d;
    let my = c1.y + a * (c2.y - c1.y) / d;

    let first = Point::new(mx + h * (c2.y - c1.y) / d, my - h * (c2.x - c1.x) / d);
    if (d - (r1 + r2)).abs() < EPS || (d - (r1 - r2).abs()).abs() < EPS {
        return vec![first]; // External or internal tangency
    }

    let second = Point::new(mx - h * (c2.y - c1.y) / d, my + h * (c2.x - c1.x) / d);
    vec![first, second]
}

/// Intersection points of two scene shapes, or empty if either dangles.
pub fn intersect_shapes(
    s1: &Shape,
    s2: &Shape,
    points: &HashMap<PointId, ScenePoint>,
) -> Vec<Point> {
    let (Some(a1), Some(a2)) = (points.get(&s1.p1), points.get(&s1.p2)) else {
        return Vec::new();
    };
    let (Some(b1), Some(b2)) = (points.get(&s2.p1), points.get(&s2.p2)) else {
        return Vec::new();
    };
    let (a1, a2) = (a1.position(), a2.position());
    let (b1, b2) = (b1.position(), b2.position());

    match (LinearBound::of(s1.kind), LinearBound::of(s2.kind)) {
        (Some(ba), Some(bb)) => linear_linear_intersection(a1, a2, ba, b1, b2, bb),
        (Some(ba), None) => linear_circle_intersection(a1, a2, ba, b1, b2),
        (None, Some(bb)) => linear_circle_intersection(b1, b2, bb, a1, a2),
        (None, None) => circle_circle_intersection(a1, a2, b1, b2),
    }
}

/// All pairwise intersection points between shapes in the scene.
///
/// Recomputed in full whenever the scene changes; shape counts on a board
/// are tens, not millions. Dangling shapes are skipped.
pub fn all_intersections(
    shapes: &[Shape],
    points: &HashMap<PointId, ScenePoint>,
) -> Vec<Point> {
    let mut out = Vec::new();
    for i in 0..shapes.len() {
        for j in (i + 1)..shapes.len() {
            out.extend(intersect_shapes(&shapes[i], &shapes[j], points));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ScenePoint;

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_distance() {
        assert!((distance(pt(0.0, 0.0), pt(3.0, 4.0)) - 5.0).abs() < EPS);
        assert!(distance(pt(1.0, 1.0), pt(1.0, 1.0)).abs() < EPS);
    }

    #[test]
    fn test_line_extension_sloped() {
        let (a, b) = line_extension(pt(0.0, 0.0), pt(1.0, 1.0));
        // Both far endpoints stay on y = x.
        assert!((a.y - a.x).abs() < 1e-6);
        assert!((b.y - b.x).abs() < 1e-6);
        assert!(a.x < -9000.0 && b.x > 9000.0);
    }

    #[test]
    fn test_line_extension_vertical() {
        let (a, b) = line_extension(pt(5.0, 0.0), pt(5.0, 3.0));
        assert!((a.x - 5.0).abs() < EPS);
        assert!((b.x - 5.0).abs() < EPS);
        assert!(a.y < 0.0 && b.y > 0.0);
    }

    #[test]
    fn test_ray_extension_direction() {
        let (a, b) = ray_extension(pt(0.0, 0.0), pt(1.0, 0.0));
        assert_eq!(a, pt(0.0, 0.0));
        assert!(b.x > 9000.0 && b.y.abs() < EPS);
    }

    #[test]
    fn test_project_linear_unclamped() {
        let p = project_linear(pt(2.0, 1.0), pt(0.0, 0.0), pt(1.0, 0.0), false);
        assert!((p.x - 2.0).abs() < EPS);
        assert!(p.y.abs() < EPS);
    }

    #[test]
    fn test_project_linear_clamped() {
        let p = project_linear(pt(2.0, 1.0), pt(0.0, 0.0), pt(1.0, 0.0), true);
        assert!((p.x - 1.0).abs() < EPS);
        assert!(p.y.abs() < EPS);
    }

    #[test]
    fn test_project_linear_degenerate_span() {
        let a = pt(3.0, 4.0);
        let p = project_linear(pt(10.0, 10.0), a, a, false);
        assert_eq!(p, a);
    }

    #[test]
    fn test_project_on_circle() {
        let p = project_on_circle(pt(20.0, 0.0), pt(0.0, 0.0), pt(0.0, 10.0));
        assert!((p.x - 10.0).abs() < 1e-9);
        assert!(p.y.abs() < 1e-9);
    }

    #[test]
    fn test_project_on_circle_from_center() {
        let p = project_on_circle(pt(0.0, 0.0), pt(0.0, 0.0), pt(0.0, 10.0));
        // Deterministic fallback on the positive x axis.
        assert!((p.x - 10.0).abs() < 1e-9);
        assert!(p.y.abs() < 1e-9);
    }

    #[test]
    fn test_lines_crossing() {
        let hits = linear_linear_intersection(
            pt(-10.0, 0.0),
            pt(10.0, 0.0),
            LinearBound::Infinite,
            pt(0.0, -10.0),
            pt(0.0, 10.0),
            LinearBound::Infinite,
        );
        assert_eq!(hits.len(), 1);
        assert!(distance(hits[0], pt(0.0, 0.0)) < 1e-9);
    }

    #[test]
    fn test_parallel_lines_empty() {
        let hits = linear_linear_intersection(
            pt(0.0, 0.0),
            pt(10.0, 0.0),
            LinearBound::Infinite,
            pt(0.0, 5.0),
            pt(10.0, 5.0),
            LinearBound::Infinite,
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn test_segment_bound_rejects_off_span_crossing() {
        // The carrier lines cross at the origin, outside both spans.
        let hits = linear_linear_intersection(
            pt(1.0, 1.0),
            pt(2.0, 2.0),
            LinearBound::Segment,
            pt(1.0, -1.0),
            pt(2.0, -2.0),
            LinearBound::Segment,
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn test_ray_bound_is_one_sided() {
        // Vertical line through x=-5 crosses the carrier behind the ray origin.
        let behind = linear_linear_intersection(
            pt(0.0, 0.0),
            pt(1.0, 0.0),
            LinearBound::Ray,
            pt(-5.0, -10.0),
            pt(-5.0, 10.0),
            LinearBound::Infinite,
        );
        assert!(behind.is_empty());

        let ahead = linear_linear_intersection(
            pt(0.0, 0.0),
            pt(1.0, 0.0),
            LinearBound::Ray,
            pt(5.0, -10.0),
            pt(5.0, 10.0),
            LinearBound::Infinite,
        );
        assert_eq!(ahead.len(), 1);
        assert!(distance(ahead[0], pt(5.0, 0.0)) < 1e-9);
    }

    #[test]
    fn test_line_circle_secant() {
        let hits = linear_circle_intersection(
            pt(-20.0, 0.0),
            pt(20.0, 0.0),
            LinearBound::Infinite,
            pt(0.0, 0.0),
            pt(10.0, 0.0),
        );
        assert_eq!(hits.len(), 2);
        for p in &hits {
            assert!((distance(*p, pt(0.0, 0.0)) - 10.0).abs() < 1e-6);
            assert!(p.y.abs() < 1e-6);
        }
    }

    #[test]
    fn test_line_circle_tangent() {
        let hits = linear_circle_intersection(
            pt(-20.0, 10.0),
            pt(20.0, 10.0),
            LinearBound::Infinite,
            pt(0.0, 0.0),
            pt(10.0, 0.0),
        );
        assert_eq!(hits.len(), 1);
        assert!(distance(hits[0], pt(0.0, 10.0)) < 1e-3);
    }

    #[test]
    fn test_line_circle_miss() {
        let hits = linear_circle_intersection(
            pt(-20.0, 15.0),
            pt(20.0, 15.0),
            LinearBound::Infinite,
            pt(0.0, 0.0),
            pt(10.0, 0.0),
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn test_segment_circle_bounded() {
        // The segment stops at the center, so only one crossing is on it.
        let hits = linear_circle_intersection(
            pt(-20.0, 0.0),
            pt(0.0, 0.0),
            LinearBound::Segment,
            pt(0.0, 0.0),
            pt(10.0, 0.0),
        );
        assert_eq!(hits.len(), 1);
        assert!((hits[0].x + 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_circle_circle_two_points() {
        let hits = circle_circle_intersection(
            pt(0.0, 0.0),
            pt(10.0, 0.0),
            pt(10.0, 0.0),
            pt(20.0, 0.0),
        );
        assert_eq!(hits.len(), 2);
        for p in &hits {
            assert!((distance(*p, pt(0.0, 0.0)) - 10.0).abs() < 1e-9);
            assert!((distance(*p, pt(10.0, 0.0)) - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_circle_circle_equilateral_construction() {
        // Circles of radius 10 centered at A(0,0) and B(10,0) meet at
        // (5, +-5*sqrt(3)): the classic equilateral triangle apexes.
        let hits = circle_circle_intersection(
            pt(0.0, 0.0),
            pt(10.0, 0.0),
            pt(10.0, 0.0),
            pt(0.0, 0.0),
        );
        assert_eq!(hits.len(), 2);
        let apex = 5.0 * 3.0_f64.sqrt();
        let mut ys: Vec<f64> = hits.iter().map(|p| p.y).collect();
        ys.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((hits[0].x - 5.0).abs() < 1e-9 && (hits[1].x - 5.0).abs() < 1e-9);
        assert!((ys[0] + apex).abs() < 1e-9);
        assert!((ys[1] - apex).abs() < 1e-9);
    }

    #[test]
    fn test_circle_circle_external_tangency() {
        let hits = circle_circle_intersection(
            pt(0.0, 0.0),
            pt(5.0, 0.0),
            pt(10.0, 0.0),
            pt(5.0, 0.0),
        );
        assert_eq!(hits.len(), 1);
        assert!(distance(hits[0], pt(5.0, 0.0)) < 1e-9);
    }

    #[test]
    fn test_circle_circle_internal_tangency() {
        let hits = circle_circle_intersection(
            pt(0.0, 0.0),
            pt(10.0, 0.0),
            pt(5.0, 0.0),
            pt(10.0, 0.0),
        );
        assert_eq!(hits.len(), 1);
        assert!(distance(hits[0], pt(10.0, 0.0)) < 1e-9);
    }

    #[test]
    fn test_circle_circle_concentric() {
        let hits = circle_circle_intersection(
            pt(0.0, 0.0),
            pt(10.0, 0.0),
            pt(0.0, 0.0),
            pt(5.0, 0.0),
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn test_circle_circle_disjoint() {
        let hits = circle_circle_intersection(
            pt(0.0, 0.0),
            pt(1.0, 0.0),
            pt(100.0, 0.0),
            pt(101.0, 0.0),
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn test_all_intersections_skips_dangling() {
        let mut points = HashMap::new();
        let a = ScenePoint::new(0.0, 0.0, None);
        let b = ScenePoint::new(10.0, 0.0, None);
        let (a_id, b_id) = (a.id, b.id);
        points.insert(a.id, a);
        points.insert(b.id, b);

        let good = Shape::new(ShapeKind::Segment, a_id, b_id);
        let dangling = Shape::new(ShapeKind::Line, a_id, uuid::Uuid::new_v4());
        let crossing = Shape::new(ShapeKind::Circle, a_id, b_id);

        let hits = all_intersections(&[good, dangling, crossing], &points);
        // Only segment x circle contributes; the dangling line is skipped.
        assert_eq!(hits.len(), 1);
    }
}
