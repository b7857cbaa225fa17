//! Kanon Core Library
//!
//! Platform-agnostic engine for the Kanon straightedge-and-compass board:
//! scene model, geometry kernel, snap resolution, the interaction state
//! machine and per-workspace undo/redo. Rendering, UI chrome and the chat
//! transport live in other crates and consume this one's public state.

pub mod batch;
pub mod camera;
pub mod editor;
pub mod geometry;
pub mod input;
pub mod scene;
pub mod snap;
pub mod storage;
pub mod tools;
pub mod workspace;

pub use batch::{apply_batch, BatchOp};
pub use camera::{Camera, MAX_ZOOM, MIN_ZOOM};
pub use editor::{DragTarget, Editor, HoverState, InteractionState, DRAG_CREATE_DISTANCE};
pub use input::{Modifiers, MouseButton, PointerEvent, TouchEvent};
pub use scene::{
    PointId, SceneColor, ScenePoint, Shape, ShapeId, ShapeKind, TextId, TextLabel,
};
pub use snap::{resolve_snap, SnapKind, SnapOptions, SnapResult, GRID_SIZE, SNAP_DISTANCE};
pub use storage::{Storage, StorageError, StorageResult};
pub use tools::ToolKind;
pub use workspace::{Workspace, WorkspaceId, MAX_UNDO_HISTORY};
