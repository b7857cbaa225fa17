//! Workspaces: the transactional scene unit with undo/redo history.
//!
//! A workspace owns one scene tri-tuple (points, shapes, texts). Only the
//! committed mutators here may write it; everything else reads. Each
//! committed mutation captures the pre-mutation tri-tuple for undo and
//! clears the redo stack. History is runtime-only: serialization carries
//! the scene and metadata, never the stacks.

use crate::camera::Camera;
use crate::scene::{PointId, SceneColor, ScenePoint, Shape, ShapeId, ShapeKind, TextId, TextLabel};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Maximum number of undo snapshots kept per workspace.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Identifier of a workspace.
pub type WorkspaceId = Uuid;

/// Immutable copy of the scene tri-tuple, captured before a mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSnapshot {
    points: HashMap<PointId, ScenePoint>,
    shapes: Vec<Shape>,
    texts: HashMap<TextId, TextLabel>,
}

/// One independent board: scene data, metadata and its own history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: String,
    pub points: HashMap<PointId, ScenePoint>,
    pub shapes: Vec<Shape>,
    #[serde(default)]
    pub texts: HashMap<TextId, TextLabel>,
    #[serde(rename = "createdAt")]
    pub created_at: u64,
    /// Undo stack; loading a saved workspace starts with empty history.
    #[serde(skip)]
    undo_stack: Vec<SceneSnapshot>,
    #[serde(skip)]
    redo_stack: Vec<SceneSnapshot>,
    /// View transform: workspace-scoped but never snapshotted or persisted.
    #[serde(skip)]
    pub camera: Camera,
    /// Bumped on every scene change; drives reactive recomputation of
    /// intersections.
    #[serde(skip)]
    revision: u64,
}

impl Workspace {
    /// Create an empty workspace. `created_at` is caller-supplied wall
    /// clock millis; the engine keeps no ambient clock.
    pub fn new(name: impl Into<String>, created_at: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            points: HashMap::new(),
            shapes: Vec::new(),
            texts: HashMap::new(),
            created_at,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            camera: Camera::new(),
            revision: 0,
        }
    }

    /// Current scene revision. Changes whenever the scene does.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Whether the scene holds nothing at all.
    pub fn is_scene_empty(&self) -> bool {
        self.points.is_empty() && self.shapes.is_empty() && self.texts.is_empty()
    }

    /// Next automatic point label: A, B, ... Z, then cycling.
    pub fn next_label(&self) -> String {
        let visible = self.points.values().filter(|p| !p.hidden).count();
        let ch = (b'A' + (visible % 26) as u8) as char;
        ch.to_string()
    }

    // --- History ---

    pub(crate) fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            points: self.points.clone(),
            shapes: self.shapes.clone(),
            texts: self.texts.clone(),
        }
    }

    fn restore(&mut self, snapshot: SceneSnapshot) {
        self.points = snapshot.points;
        self.shapes = snapshot.shapes;
        self.texts = snapshot.texts;
        self.touch();
    }

    /// Push the current tri-tuple onto the undo stack and clear the redo
    /// stack. Call before applying a mutation that will change the scene;
    /// a no-op mutation must not reach this.
    pub fn begin_change(&mut self) {
        let snapshot = self.snapshot();
        self.push_past(snapshot);
    }

    fn push_past(&mut self, snapshot: SceneSnapshot) {
        self.undo_stack.push(snapshot);
        self.redo_stack.clear();
        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Record an already-applied mutation whose pre-state was captured
    /// with [`Workspace::snapshot`]. Used for atomic batches.
    pub(crate) fn commit_snapshot(&mut self, before: SceneSnapshot) {
        self.push_past(before);
    }

    /// Revert the most recent committed mutation.
    /// Returns false if there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        let current = self.snapshot();
        self.redo_stack.push(current);
        self.restore(previous);
        log::debug!("undo on workspace {} ({} left)", self.id, self.undo_stack.len());
        true
    }

    /// Re-apply the most recently undone mutation.
    /// Returns false if there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        let current = self.snapshot();
        self.undo_stack.push(current);
        self.restore(next);
        log::debug!("redo on workspace {} ({} left)", self.id, self.redo_stack.len());
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    // --- Raw scene edits (no history; callers own the boundary) ---

    pub(crate) fn insert_point(&mut self, point: ScenePoint) -> PointId {
        let id = point.id;
        self.points.insert(id, point);
        self.touch();
        id
    }

    pub(crate) fn insert_shape(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id;
        self.shapes.push(shape);
        self.touch();
        id
    }

    pub(crate) fn insert_text(&mut self, text: TextLabel) -> TextId {
        let id = text.id;
        self.texts.insert(id, text);
        self.touch();
        id
    }

    pub(crate) fn clear_scene(&mut self) {
        self.points.clear();
        self.shapes.clear();
        self.texts.clear();
        self.touch();
    }

    /// Remove a text without a history entry. Used to garbage-collect
    /// labels whose editing session ended empty.
    pub(crate) fn remove_text_raw(&mut self, id: TextId) -> bool {
        let removed = self.texts.remove(&id).is_some();
        if removed {
            self.touch();
        }
        removed
    }

    /// Overwrite a point's coordinates without a history entry. Live drag
    /// frames go through here; the drag pushes one entry at its start.
    pub fn set_point_position(&mut self, id: PointId, x: f64, y: f64) -> bool {
        match self.points.get_mut(&id) {
            Some(p) => {
                p.x = x;
                p.y = y;
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Overwrite a text anchor without a history entry.
    pub fn set_text_position(&mut self, id: TextId, x: f64, y: f64) -> bool {
        match self.texts.get_mut(&id) {
            Some(t) => {
                t.x = x;
                t.y = y;
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Overwrite a text's content without a history entry. The editing
    /// session pushes one entry at its first change.
    pub fn set_text_content(&mut self, id: TextId, content: &str) -> bool {
        match self.texts.get_mut(&id) {
            Some(t) if t.content != content => {
                t.content = content.to_string();
                self.touch();
                true
            }
            _ => false,
        }
    }

    // --- Committed mutators ---

    /// Create a visible point. One history entry.
    pub fn create_point(&mut self, x: f64, y: f64, label: Option<String>) -> PointId {
        self.begin_change();
        self.insert_point(ScenePoint::new(x, y, label))
    }

    /// Create a hidden direction-only point. One history entry.
    pub fn create_hidden_point(&mut self, x: f64, y: f64) -> PointId {
        self.begin_change();
        self.insert_point(ScenePoint::hidden(x, y))
    }

    /// Create a shape between two existing points. One history entry.
    /// Returns `None` (and pushes nothing) if either point is missing.
    pub fn create_shape(
        &mut self,
        kind: ShapeKind,
        p1: PointId,
        p2: PointId,
        color: Option<SceneColor>,
    ) -> Option<ShapeId> {
        if !self.points.contains_key(&p1) || !self.points.contains_key(&p2) {
            return None;
        }
        self.begin_change();
        let mut shape = Shape::new(kind, p1, p2);
        shape.color = color;
        Some(self.insert_shape(shape))
    }

    /// Create a text label. One history entry.
    pub fn create_text(&mut self, x: f64, y: f64, content: impl Into<String>) -> TextId {
        self.begin_change();
        self.insert_text(TextLabel::new(x, y, content))
    }

    /// Delete a selection spanning points, shapes and texts, cascading to
    /// every shape that references a deleted point. One history entry;
    /// returns false (and pushes nothing) when nothing matched.
    pub fn delete_selection(&mut self, ids: &[Uuid]) -> bool {
        let id_set: HashSet<Uuid> = ids.iter().copied().collect();

        let doomed_points: HashSet<PointId> = self
            .points
            .keys()
            .filter(|id| id_set.contains(id))
            .copied()
            .collect();
        let shape_doomed = |s: &Shape| {
            id_set.contains(&s.id) || doomed_points.contains(&s.p1) || doomed_points.contains(&s.p2)
        };
        let any_shape = self.shapes.iter().any(shape_doomed);
        let any_text = self.texts.keys().any(|id| id_set.contains(id));

        if doomed_points.is_empty() && !any_shape && !any_text {
            return false;
        }

        self.begin_change();
        self.shapes.retain(|s| !shape_doomed(s));
        self.points.retain(|id, _| !doomed_points.contains(id));
        self.texts.retain(|id, _| !id_set.contains(id));
        self.touch();
        true
    }

    /// Clear the whole scene. One history entry; a no-op on an already
    /// empty workspace.
    pub fn clear(&mut self) -> bool {
        if self.is_scene_empty() {
            return false;
        }
        self.begin_change();
        self.clear_scene();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace() -> Workspace {
        Workspace::new("Untitled 1", 0)
    }

    #[test]
    fn test_create_point_and_undo() {
        let mut ws = workspace();
        let id = ws.create_point(1.0, 2.0, Some("A".to_string()));

        assert_eq!(ws.points.len(), 1);
        assert!(ws.can_undo());

        assert!(ws.undo());
        assert!(ws.points.is_empty());
        assert!(ws.can_redo());

        assert!(ws.redo());
        assert!(ws.points.contains_key(&id));
    }

    #[test]
    fn test_undo_empty_stack() {
        let mut ws = workspace();
        assert!(!ws.can_undo());
        assert!(!ws.undo());
        assert!(!ws.can_redo());
        assert!(!ws.redo());
    }

    #[test]
    fn test_new_change_clears_redo() {
        let mut ws = workspace();
        ws.create_point(0.0, 0.0, None);
        assert!(ws.undo());
        assert!(ws.can_redo());

        ws.create_point(5.0, 5.0, None);
        assert!(!ws.can_redo());
    }

    #[test]
    fn test_history_capped() {
        let mut ws = workspace();
        for i in 0..(MAX_UNDO_HISTORY + 20) {
            ws.create_point(i as f64, 0.0, None);
        }

        let mut undos = 0;
        while ws.undo() {
            undos += 1;
        }
        assert_eq!(undos, MAX_UNDO_HISTORY);
        // The oldest entries were evicted, so some points survive.
        assert_eq!(ws.points.len(), 20);
    }

    #[test]
    fn test_undo_redo_roundtrip_restores_scene() {
        let mut ws = workspace();
        let a = ws.create_point(0.0, 0.0, Some("A".to_string()));
        let b = ws.create_point(10.0, 0.0, Some("B".to_string()));
        ws.create_shape(ShapeKind::Segment, a, b, None).unwrap();
        ws.create_text(3.0, 4.0, "note");

        let reference = ws.snapshot();
        for _ in 0..4 {
            assert!(ws.undo());
        }
        assert!(ws.is_scene_empty());
        for _ in 0..4 {
            assert!(ws.redo());
        }
        assert_eq!(ws.snapshot(), reference);
    }

    #[test]
    fn test_create_shape_requires_points() {
        let mut ws = workspace();
        let a = ws.create_point(0.0, 0.0, None);
        assert!(ws.create_shape(ShapeKind::Line, a, Uuid::new_v4(), None).is_none());
        // The failed creation must not have pushed history.
        assert!(ws.undo());
        assert!(!ws.can_undo());
    }

    #[test]
    fn test_delete_point_cascades() {
        let mut ws = workspace();
        let a = ws.create_point(0.0, 0.0, None);
        let b = ws.create_point(10.0, 0.0, None);
        ws.create_shape(ShapeKind::Segment, a, b, None).unwrap();

        assert!(ws.delete_selection(&[a]));
        assert!(ws.shapes.is_empty());
        assert_eq!(ws.points.len(), 1);
        assert!(ws.points.contains_key(&b));
    }

    #[test]
    fn test_delete_selection_spans_kinds() {
        let mut ws = workspace();
        let a = ws.create_point(0.0, 0.0, None);
        let b = ws.create_point(10.0, 0.0, None);
        let c = ws.create_point(20.0, 0.0, None);
        let s = ws.create_shape(ShapeKind::Segment, b, c, None).unwrap();
        let t = ws.create_text(5.0, 5.0, "hi");

        assert!(ws.delete_selection(&[a, s, t]));
        assert!(ws.shapes.is_empty());
        assert!(ws.texts.is_empty());
        assert_eq!(ws.points.len(), 2);
    }

    #[test]
    fn test_delete_selection_noop_pushes_nothing() {
        let mut ws = workspace();
        ws.create_point(0.0, 0.0, None);
        assert!(!ws.delete_selection(&[Uuid::new_v4()]));
        // Only the creation is on the stack.
        assert!(ws.undo());
        assert!(!ws.can_undo());
    }

    #[test]
    fn test_clear_guards_empty() {
        let mut ws = workspace();
        assert!(!ws.clear());
        assert!(!ws.can_undo());

        ws.create_point(0.0, 0.0, None);
        assert!(ws.clear());
        assert!(ws.is_scene_empty());
    }

    #[test]
    fn test_live_position_updates_skip_history() {
        let mut ws = workspace();
        let id = ws.create_point(0.0, 0.0, None);

        ws.begin_change();
        for i in 1..=50 {
            assert!(ws.set_point_position(id, i as f64, 0.0));
        }

        // One undo reverts the whole drag.
        assert!(ws.undo());
        let p = &ws.points[&id];
        assert!((p.x - 0.0).abs() < f64::EPSILON);
        // And one more removes the point.
        assert!(ws.undo());
        assert!(!ws.can_undo());
    }

    #[test]
    fn test_next_label_cycles_and_skips_hidden() {
        let mut ws = workspace();
        assert_eq!(ws.next_label(), "A");
        ws.create_point(0.0, 0.0, Some(ws.next_label()));
        assert_eq!(ws.next_label(), "B");
        ws.create_hidden_point(1.0, 1.0);
        assert_eq!(ws.next_label(), "B");
    }

    #[test]
    fn test_revision_tracks_changes() {
        let mut ws = workspace();
        let r0 = ws.revision();
        let id = ws.create_point(0.0, 0.0, None);
        assert_ne!(ws.revision(), r0);

        let r1 = ws.revision();
        ws.set_point_position(id, 5.0, 5.0);
        assert_ne!(ws.revision(), r1);
    }

    #[test]
    fn test_persisted_layout_drops_history_and_camera() {
        let mut ws = workspace();
        let a = ws.create_point(0.0, 0.0, Some("A".to_string()));
        let b = ws.create_point(10.0, 0.0, Some("B".to_string()));
        ws.create_shape(ShapeKind::Circle, a, b, None).unwrap();
        ws.create_text(1.0, 1.0, "label");
        ws.camera.zoom = 3.0;

        let json = serde_json::to_string(&ws).unwrap();
        assert!(json.contains("\"createdAt\""));

        let loaded: Workspace = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.points.len(), 2);
        assert_eq!(loaded.shapes.len(), 1);
        assert_eq!(loaded.texts.len(), 1);
        assert!(!loaded.can_undo());
        assert!(!loaded.can_redo());
        assert!((loaded.camera.zoom - 1.0).abs() < f64::EPSILON);
    }
}
