//! Tool selection for the board.

use crate::scene::ShapeKind;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Point,
    Segment,
    Line,
    Ray,
    Circle,
    Text,
    Eraser,
}

impl ToolKind {
    /// Shape kind drafted by this tool, if it is a shape tool.
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            ToolKind::Segment => Some(ShapeKind::Segment),
            ToolKind::Line => Some(ShapeKind::Line),
            ToolKind::Ray => Some(ShapeKind::Ray),
            ToolKind::Circle => Some(ShapeKind::Circle),
            ToolKind::Select | ToolKind::Point | ToolKind::Text | ToolKind::Eraser => None,
        }
    }

    /// Whether this tool constructs two-point shapes.
    pub fn is_shape_tool(self) -> bool {
        self.shape_kind().is_some()
    }
}
