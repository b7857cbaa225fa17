//! Scene model: points, shapes and text labels.
//!
//! Pure data owned by a [`crate::workspace::Workspace`]. All behavior lives
//! in the geometry kernel, the snap resolver and the editor.

use kurbo::Point;
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a scene point.
pub type PointId = Uuid;
/// Identifier of a shape.
pub type ShapeId = Uuid;
/// Identifier of a text label.
pub type TextId = Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SceneColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }
}

impl From<Color> for SceneColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SceneColor> for Color {
    fn from(color: SceneColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// A point on the board.
///
/// Hidden points anchor the direction of infinite lines and rays; they are
/// excluded from rendering, hit-testing and point snapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenePoint {
    pub id: PointId,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<SceneColor>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

impl ScenePoint {
    /// Create a visible point.
    pub fn new(x: f64, y: f64, label: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            x,
            y,
            label,
            color: None,
            hidden: false,
        }
    }

    /// Create a hidden direction-only point.
    pub fn hidden(x: f64, y: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            x,
            y,
            label: None,
            color: None,
            hidden: true,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Shape kinds supported by the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Segment,
    Line,
    Ray,
    Circle,
}

impl ShapeKind {
    /// Whether this kind belongs to the line family (as opposed to circles).
    pub fn is_linear(self) -> bool {
        !matches!(self, ShapeKind::Circle)
    }
}

/// A shape defined by two point references.
///
/// For circles `p1` is the center and `p2` the radius point. A shape whose
/// referenced point no longer exists is dangling; committed deletions cascade
/// so this is only ever observed transiently, and consumers skip it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub p1: PointId,
    pub p2: PointId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<SceneColor>,
}

impl Shape {
    pub fn new(kind: ShapeKind, p1: PointId, p2: PointId) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            p1,
            p2,
            color: None,
        }
    }

    /// Whether this shape is defined by the given point.
    pub fn references(&self, point: PointId) -> bool {
        self.p1 == point || self.p2 == point
    }
}

/// A free-floating text label anchored at a world position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLabel {
    pub id: TextId,
    pub x: f64,
    pub y: f64,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<SceneColor>,
}

impl TextLabel {
    pub fn new(x: f64, y: f64, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            x,
            y,
            content: content.into(),
            color: None,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_visibility() {
        let p = ScenePoint::new(1.0, 2.0, Some("A".to_string()));
        assert!(!p.hidden);

        let h = ScenePoint::hidden(1.0, 2.0);
        assert!(h.hidden);
        assert!(h.label.is_none());
    }

    #[test]
    fn test_shape_references() {
        let a = ScenePoint::new(0.0, 0.0, None);
        let b = ScenePoint::new(1.0, 0.0, None);
        let s = Shape::new(ShapeKind::Segment, a.id, b.id);

        assert!(s.references(a.id));
        assert!(s.references(b.id));
        assert!(!s.references(Uuid::new_v4()));
    }

    #[test]
    fn test_shape_kind_family() {
        assert!(ShapeKind::Segment.is_linear());
        assert!(ShapeKind::Line.is_linear());
        assert!(ShapeKind::Ray.is_linear());
        assert!(!ShapeKind::Circle.is_linear());
    }

    #[test]
    fn test_shape_kind_serde_names() {
        let json = serde_json::to_string(&ShapeKind::Segment).unwrap();
        assert_eq!(json, "\"segment\"");
        let kind: ShapeKind = serde_json::from_str("\"ray\"").unwrap();
        assert_eq!(kind, ShapeKind::Ray);
    }

    #[test]
    fn test_color_roundtrip() {
        let c = SceneColor::new(10, 20, 30, 255);
        let peniko: peniko::Color = c.into();
        let back: SceneColor = peniko.into();
        assert_eq!(c, back);
    }
}
