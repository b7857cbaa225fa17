//! Input event model for the interaction engine.
//!
//! Events carry positions in screen coordinates relative to the board
//! surface; the embedding layer translates from whatever windowing toolkit
//! it uses. The engine never reads ambient globals.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Modifiers {
            shift: true,
            ..Self::NONE
        }
    }
}

/// Unified pointer event for mouse, pen or a single tracked touch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    Move {
        position: Point,
    },
    Up {
        position: Point,
    },
    /// One discrete wheel tick; positive `delta_y` scrolls down (zoom out).
    Wheel {
        position: Point,
        delta_y: f64,
    },
}

/// Multi-contact touch event. Contact positions are screen coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TouchEvent {
    Start { touches: Vec<Point> },
    Move { touches: Vec<Point> },
    /// The tracked contacts lifted.
    End,
    /// The platform cancelled the gesture (e.g. the pointer left the
    /// tracked surface).
    Cancel,
}
