//! Snap resolution: mapping a raw cursor position to the most meaningful
//! nearby target.
//!
//! Candidates are tested tier by tier in strict priority order; within a
//! tier the nearest candidate wins, across tiers the first tier with any
//! hit wins. Existing points and texts always snap because they define
//! object identity for construction; intersections, shape boundaries and
//! the grid are assist tiers the user can switch off.

use crate::geometry::{self, LinearBound};
use crate::scene::{PointId, ScenePoint, Shape, ShapeId, ShapeKind, TextId, TextLabel};
use kurbo::Point;
use std::collections::HashMap;
use uuid::Uuid;

/// Snap radius in screen pixels. Divided by the zoom factor so the radius
/// stays constant on screen regardless of zoom.
pub const SNAP_DISTANCE: f64 = 15.0;

/// Grid cell size in world units.
pub const GRID_SIZE: f64 = 20.0;

/// What a resolved position snapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapKind {
    /// Nothing nearby; the raw coordinates pass through.
    #[default]
    None,
    /// An existing visible point.
    Point(PointId),
    /// An existing text label.
    Text(TextId),
    /// A computed shape-shape intersection.
    Intersection,
    /// The nearest boundary point of a shape.
    OnShape(ShapeId),
    /// A grid cell corner.
    Grid,
}

/// Result of resolving a cursor position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// Effective world coordinates.
    pub position: Point,
    /// The kind of target that was hit.
    pub kind: SnapKind,
}

impl SnapResult {
    /// A pass-through result at the raw position.
    pub fn none(position: Point) -> Self {
        Self {
            position,
            kind: SnapKind::None,
        }
    }

    /// Id of the snapped point, if the result targets one.
    pub fn point_id(&self) -> Option<PointId> {
        match self.kind {
            SnapKind::Point(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_snapped(&self) -> bool {
        self.kind != SnapKind::None
    }
}

/// Tunables for a snap query.
#[derive(Debug, Clone, Copy)]
pub struct SnapOptions {
    /// Enables the assist tiers: intersections, shape boundaries, grid.
    pub assist: bool,
    /// Grid cell size in world units.
    pub grid_size: f64,
    /// Acceptance threshold in world units.
    pub threshold: f64,
}

impl SnapOptions {
    /// Options for the given zoom factor, with the standard screen-space
    /// snap radius and grid size.
    pub fn at_zoom(assist: bool, zoom: f64) -> Self {
        Self {
            assist,
            grid_size: GRID_SIZE,
            threshold: SNAP_DISTANCE / zoom,
        }
    }
}

/// Resolve `world` against the scene. `exclude` removes one entity (the
/// point or text currently being dragged) from tiers 1 and 2.
pub fn resolve_snap(
    world: Point,
    points: &HashMap<PointId, ScenePoint>,
    shapes: &[Shape],
    texts: &HashMap<TextId, TextLabel>,
    intersections: &[Point],
    options: SnapOptions,
    exclude: Option<Uuid>,
) -> SnapResult {
    // Tier 1: existing visible points.
    if let Some((id, position)) = nearest_point(world, points, exclude, options.threshold) {
        return SnapResult {
            position,
            kind: SnapKind::Point(id),
        };
    }

    // Tier 2: text labels.
    if let Some((id, position)) = nearest_text(world, texts, exclude, options.threshold) {
        return SnapResult {
            position,
            kind: SnapKind::Text(id),
        };
    }

    if !options.assist {
        return SnapResult::none(world);
    }

    // Tier 3: computed intersections.
    if let Some(position) = nearest_candidate(world, intersections.iter().copied(), options.threshold)
    {
        return SnapResult {
            position,
            kind: SnapKind::Intersection,
        };
    }

    // Tier 4: projection onto a shape boundary.
    if let Some((id, position)) = nearest_on_shape(world, shapes, points, options.threshold) {
        return SnapResult {
            position,
            kind: SnapKind::OnShape(id),
        };
    }

    // Tier 5: the grid, accepted only when the rounded corner is close.
    let corner = Point::new(
        (world.x / options.grid_size).round() * options.grid_size,
        (world.y / options.grid_size).round() * options.grid_size,
    );
    if geometry::distance(world, corner) < options.threshold {
        return SnapResult {
            position: corner,
            kind: SnapKind::Grid,
        };
    }

    SnapResult::none(world)
}

/// Nearest visible point within `threshold`, skipping `exclude`.
pub fn nearest_point(
    world: Point,
    points: &HashMap<PointId, ScenePoint>,
    exclude: Option<Uuid>,
    threshold: f64,
) -> Option<(PointId, Point)> {
    let mut best: Option<(PointId, Point)> = None;
    let mut best_dist = threshold;
    for p in points.values() {
        if p.hidden || Some(p.id) == exclude {
            continue;
        }
        let d = geometry::distance(world, p.position());
        if d < best_dist {
            best_dist = d;
            best = Some((p.id, p.position()));
        }
    }
    best
}

fn nearest_text(
    world: Point,
    texts: &HashMap<TextId, TextLabel>,
    exclude: Option<Uuid>,
    threshold: f64,
) -> Option<(TextId, Point)> {
    let mut best: Option<(TextId, Point)> = None;
    let mut best_dist = threshold;
    for t in texts.values() {
        if Some(t.id) == exclude {
            continue;
        }
        let d = geometry::distance(world, t.position());
        if d < best_dist {
            best_dist = d;
            best = Some((t.id, t.position()));
        }
    }
    best
}

fn nearest_candidate(
    world: Point,
    candidates: impl Iterator<Item = Point>,
    threshold: f64,
) -> Option<Point> {
    let mut best: Option<Point> = None;
    let mut best_dist = threshold;
    for c in candidates {
        let d = geometry::distance(world, c);
        if d < best_dist {
            best_dist = d;
            best = Some(c);
        }
    }
    best
}

/// Project `world` onto every shape and keep the nearest boundary point
/// within `threshold`. Dangling shapes are skipped. Also serves as the
/// shape hit-test for selection and erasing.
pub fn nearest_on_shape(
    world: Point,
    shapes: &[Shape],
    points: &HashMap<PointId, ScenePoint>,
    threshold: f64,
) -> Option<(ShapeId, Point)> {
    let mut best: Option<(ShapeId, Point)> = None;
    let mut best_dist = threshold;
    for shape in shapes {
        let (Some(p1), Some(p2)) = (points.get(&shape.p1), points.get(&shape.p2)) else {
            continue;
        };
        let (a, b) = (p1.position(), p2.position());
        let projected = match shape.kind {
            ShapeKind::Circle => geometry::project_on_circle(world, a, b),
            kind => {
                let clamp = LinearBound::of(kind) != Some(LinearBound::Infinite);
                geometry::project_linear(world, a, b, clamp)
            }
        };
        let d = geometry::distance(world, projected);
        if d < best_dist {
            best_dist = d;
            best = Some((shape.id, projected));
        }
    }
    best
}
