//! Batch application of assistant-issued construction primitives.
//!
//! The chat collaborator sends whole constructions at once, referencing
//! points by its own temporary ids. Ids are remapped to durable ones
//! through a translation table scoped to the batch and discarded with it;
//! the batch lands as a single history entry.

use crate::scene::{PointId, SceneColor, ScenePoint, Shape, ShapeKind, TextLabel};
use crate::workspace::Workspace;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A construction primitive issued by the assistant.
///
/// Wire format: `{"op": "create_point", "id": "p1", "x": 0, "y": 0}` etc.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BatchOp {
    CreatePoint {
        id: String,
        x: f64,
        y: f64,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        color: Option<SceneColor>,
    },
    CreateShape {
        id: String,
        kind: ShapeKind,
        p1: String,
        p2: String,
        #[serde(default)]
        color: Option<SceneColor>,
    },
    CreateText {
        id: String,
        x: f64,
        y: f64,
        content: String,
        #[serde(default)]
        color: Option<SceneColor>,
    },
    ClearBoard,
}

/// Apply a batch to `workspace` as one atomic history entry.
///
/// Point references resolve against ids minted earlier in the same batch,
/// then against durable ids already in the scene. A shape whose reference
/// resolves to nothing is dropped; the rest of the batch still applies.
/// A batch that changes nothing pushes no history.
pub fn apply_batch(workspace: &mut Workspace, ops: &[BatchOp]) {
    if ops.is_empty() {
        return;
    }

    let before = workspace.snapshot();
    let mut minted: HashMap<&str, PointId> = HashMap::new();
    let mut changed = false;

    for op in ops {
        match op {
            BatchOp::CreatePoint {
                id,
                x,
                y,
                label,
                color,
            } => {
                let mut point = ScenePoint::new(*x, *y, label.clone());
                point.color = *color;
                minted.insert(id.as_str(), point.id);
                workspace.insert_point(point);
                changed = true;
            }
            BatchOp::CreateShape {
                id: _,
                kind,
                p1,
                p2,
                color,
            } => {
                let (Some(a), Some(b)) = (
                    resolve_reference(workspace, &minted, p1),
                    resolve_reference(workspace, &minted, p2),
                ) else {
                    log::warn!("dropping {kind:?} op with unresolved point reference");
                    continue;
                };
                let mut shape = Shape::new(*kind, a, b);
                shape.color = *color;
                workspace.insert_shape(shape);
                changed = true;
            }
            BatchOp::CreateText {
                id: _,
                x,
                y,
                content,
                color,
            } => {
                let mut text = TextLabel::new(*x, *y, content.clone());
                text.color = *color;
                workspace.insert_text(text);
                changed = true;
            }
            BatchOp::ClearBoard => {
                if !workspace.is_scene_empty() {
                    workspace.clear_scene();
                    changed = true;
                }
            }
        }
    }

    if changed {
        workspace.commit_snapshot(before);
    }
}

/// Resolve a point reference: batch-minted ids first, then durable ids.
/// Presence in the scene is checked either way, so a shape can never be
/// created dangling (a mid-batch clear invalidates earlier mints).
fn resolve_reference(
    workspace: &Workspace,
    minted: &HashMap<&str, PointId>,
    reference: &str,
) -> Option<PointId> {
    let id = minted
        .get(reference)
        .copied()
        .or_else(|| Uuid::parse_str(reference).ok())?;
    workspace.points.contains_key(&id).then_some(id)
}
