//! The interaction engine: tools, selection, drafting and view gestures.
//!
//! The [`Editor`] owns the workspaces and turns pointer/touch/wheel events
//! into scene mutations according to the active tool. All transitions are
//! synchronous; transient state lives in a single [`InteractionState`]
//! variant so every input source observes the same machine.

use crate::batch::{self, BatchOp};
use crate::geometry;
use crate::input::{Modifiers, MouseButton, PointerEvent, TouchEvent};
use crate::scene::{PointId, ShapeKind, TextId};
use crate::snap::{self, SnapKind, SnapOptions, SnapResult, SNAP_DISTANCE};
use crate::tools::ToolKind;
use crate::workspace::{Workspace, WorkspaceId};
use kurbo::{Point, Size};
use uuid::Uuid;

/// Minimum release distance, in screen pixels, for drag-to-create.
pub const DRAG_CREATE_DISTANCE: f64 = 10.0;

/// Per-frame clamp on the pinch distance ratio.
const PINCH_RATIO_MIN: f64 = 0.1;
const PINCH_RATIO_MAX: f64 = 10.0;

/// What a drag is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    Point(PointId),
    Text(TextId),
}

impl DragTarget {
    fn id(self) -> Uuid {
        match self {
            DragTarget::Point(id) => id,
            DragTarget::Text(id) => id,
        }
    }
}

/// The engine's transient interaction state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionState {
    Idle,
    /// A shape draft anchored at its first point, awaiting the second.
    Drafting { start: PointId },
    /// A point or text being moved. `committed` flips once the drag has
    /// pushed its single coalesced history entry.
    Dragging { target: DragTarget, committed: bool },
    /// View panning, tracked by the last screen position.
    Panning { last: Point },
    /// Two-finger gesture, tracked by contact distance and midpoint.
    Pinching { dist: f64, center: Point },
}

/// Cursor feedback for the rendering collaborator.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoverState {
    /// Effective cursor position in world coordinates.
    pub cursor: Point,
    /// What the cursor currently snaps to.
    pub target: SnapKind,
}

/// The interaction engine. Owns at least one workspace at all times.
#[derive(Debug)]
pub struct Editor {
    workspaces: Vec<Workspace>,
    active: WorkspaceId,
    tool: ToolKind,
    state: InteractionState,
    selection: Vec<Uuid>,
    hover: HoverState,
    snap_assist: bool,
    viewport: Size,
    editing_text: Option<TextId>,
    text_edit_committed: bool,
    /// Cached pairwise intersections, keyed by workspace and revision.
    intersections: Vec<Point>,
    intersections_key: Option<(WorkspaceId, u64)>,
    /// Last pointer position, for touch-end release handling.
    last_screen: Point,
}

impl Editor {
    /// Create an editor with one empty workspace. `created_at` is
    /// caller-supplied wall clock millis.
    pub fn new(created_at: u64) -> Self {
        let ws = Workspace::new("Untitled 1", created_at);
        let active = ws.id;
        Self {
            workspaces: vec![ws],
            active,
            tool: ToolKind::default(),
            state: InteractionState::Idle,
            selection: Vec::new(),
            hover: HoverState::default(),
            snap_assist: true,
            viewport: Size::new(800.0, 600.0),
            editing_text: None,
            text_edit_committed: false,
            intersections: Vec::new(),
            intersections_key: None,
            last_screen: Point::ZERO,
        }
    }

    // --- Workspace management ---

    /// The active workspace. At least one workspace always exists.
    pub fn active_workspace(&self) -> &Workspace {
        self.workspaces
            .iter()
            .find(|w| w.id == self.active)
            .unwrap_or(&self.workspaces[0])
    }

    pub fn active_workspace_mut(&mut self) -> &mut Workspace {
        let index = self
            .workspaces
            .iter()
            .position(|w| w.id == self.active)
            .unwrap_or(0);
        &mut self.workspaces[index]
    }

    pub fn workspaces(&self) -> &[Workspace] {
        &self.workspaces
    }

    /// Add a workspace and make it active.
    pub fn add_workspace(&mut self, name: Option<String>, created_at: u64) -> WorkspaceId {
        let name = name.unwrap_or_else(|| format!("Untitled {}", self.workspaces.len() + 1));
        let ws = Workspace::new(name, created_at);
        let id = ws.id;
        self.workspaces.push(ws);
        self.set_active_workspace(id);
        id
    }

    /// Remove a workspace and its history. Refuses to remove the last one.
    pub fn remove_workspace(&mut self, id: WorkspaceId) -> bool {
        if self.workspaces.len() <= 1 {
            return false;
        }
        let Some(index) = self.workspaces.iter().position(|w| w.id == id) else {
            return false;
        };
        self.workspaces.remove(index);
        if self.active == id {
            // Prefer the previous tab, falling back to the next one.
            let next = index.saturating_sub(1).min(self.workspaces.len() - 1);
            self.active = self.workspaces[next].id;
            self.reset_transient_state();
        }
        true
    }

    pub fn rename_workspace(&mut self, id: WorkspaceId, name: impl Into<String>) -> bool {
        match self.workspaces.iter_mut().find(|w| w.id == id) {
            Some(ws) => {
                ws.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Switch the active workspace. Cancels any in-progress interaction.
    pub fn set_active_workspace(&mut self, id: WorkspaceId) -> bool {
        if !self.workspaces.iter().any(|w| w.id == id) {
            return false;
        }
        if self.active != id {
            self.reset_transient_state();
            self.active = id;
        }
        true
    }

    fn reset_transient_state(&mut self) {
        self.end_text_editing();
        self.state = InteractionState::Idle;
        self.selection.clear();
        self.hover = HoverState::default();
    }

    // --- Settings and queries ---

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Switch tools. Cancels an in-progress draft or drag and closes any
    /// text editing session.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.tool != tool {
            log::debug!("tool switched to {tool:?}");
            self.cancel_interaction();
            self.end_text_editing();
        }
        self.tool = tool;
    }

    pub fn snap_assist(&self) -> bool {
        self.snap_assist
    }

    pub fn set_snap_assist(&mut self, enabled: bool) {
        self.snap_assist = enabled;
    }

    /// Viewport dimensions, supplied by the embedding layer.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport = Size::new(width, height);
    }

    pub fn viewport_size(&self) -> Size {
        self.viewport
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn hover(&self) -> HoverState {
        self.hover
    }

    pub fn selection(&self) -> &[Uuid] {
        &self.selection
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn can_undo(&self) -> bool {
        self.active_workspace().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.active_workspace().can_redo()
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        self.active_workspace().camera.screen_to_world(screen)
    }

    /// Pairwise shape intersections of the active scene, recomputed
    /// whenever the scene revision changes.
    pub fn intersections(&mut self) -> &[Point] {
        self.refresh_intersections();
        &self.intersections
    }

    /// Resolve a world position against the active scene.
    pub fn resolve_snap(&mut self, world: Point, exclude: Option<Uuid>) -> SnapResult {
        self.refresh_intersections();
        let options = SnapOptions::at_zoom(self.snap_assist, self.active_workspace().camera.zoom);
        let ws = self.active_workspace();
        snap::resolve_snap(
            world,
            &ws.points,
            &ws.shapes,
            &ws.texts,
            &self.intersections,
            options,
            exclude,
        )
    }

    fn refresh_intersections(&mut self) {
        let ws = self.active_workspace();
        let key = (ws.id, ws.revision());
        if self.intersections_key != Some(key) {
            let next = geometry::all_intersections(&ws.shapes, &ws.points);
            self.intersections = next;
            self.intersections_key = Some(key);
        }
    }

    fn snap_threshold(&self) -> f64 {
        SNAP_DISTANCE / self.active_workspace().camera.zoom
    }

    // --- History ---

    pub fn undo(&mut self) -> bool {
        self.cancel_interaction();
        self.end_text_editing();
        let undone = self.active_workspace_mut().undo();
        if undone {
            self.prune_selection();
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        self.cancel_interaction();
        self.end_text_editing();
        let redone = self.active_workspace_mut().redo();
        if redone {
            self.prune_selection();
        }
        redone
    }

    /// Delete the current selection, cascading to dependent shapes.
    pub fn delete_selected(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        let ids = std::mem::take(&mut self.selection);
        self.active_workspace_mut().delete_selection(&ids);
    }

    /// Apply an assistant batch to the active workspace as one atomic
    /// history entry.
    pub fn apply_batch(&mut self, ops: &[BatchOp]) {
        batch::apply_batch(self.active_workspace_mut(), ops);
        self.prune_selection();
    }

    /// Drop selection entries whose entity no longer exists.
    fn prune_selection(&mut self) {
        let ws = self.active_workspace();
        let keep: Vec<Uuid> = self
            .selection
            .iter()
            .copied()
            .filter(|id| {
                ws.points.contains_key(id)
                    || ws.texts.contains_key(id)
                    || ws.shapes.iter().any(|s| s.id == *id)
            })
            .collect();
        self.selection = keep;
    }

    // --- Text editing session ---

    pub fn editing_text(&self) -> Option<TextId> {
        self.editing_text
    }

    /// Open a text label for in-place editing, closing any prior session.
    pub fn begin_text_editing(&mut self, id: TextId) {
        self.end_text_editing();
        if self.active_workspace().texts.contains_key(&id) {
            self.editing_text = Some(id);
            self.text_edit_committed = false;
        }
    }

    /// Replace the content of the text being edited. The first actual
    /// change of a session pushes one coalesced history entry.
    pub fn set_editing_content(&mut self, content: &str) {
        let Some(id) = self.editing_text else {
            return;
        };
        let unchanged = self
            .active_workspace()
            .texts
            .get(&id)
            .map_or(true, |t| t.content == content);
        if unchanged {
            return;
        }
        if !self.text_edit_committed {
            self.active_workspace_mut().begin_change();
            self.text_edit_committed = true;
        }
        self.active_workspace_mut().set_text_content(id, content);
    }

    /// Close the editing session, garbage-collecting the label if its
    /// content ended up empty.
    pub fn end_text_editing(&mut self) {
        if let Some(id) = self.editing_text.take() {
            let empty = self
                .active_workspace()
                .texts
                .get(&id)
                .is_some_and(|t| t.content.trim().is_empty());
            if empty {
                self.active_workspace_mut().remove_text_raw(id);
                self.prune_selection();
            }
        }
        self.text_edit_committed = false;
    }

    // --- Event entry points ---

    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
            } => self.pointer_down(position, button, modifiers),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { position } => self.pointer_up(position),
            PointerEvent::Wheel { position, delta_y } => {
                self.active_workspace_mut().camera.wheel_zoom(position, delta_y);
            }
        }
    }

    pub fn handle_touch_event(&mut self, event: TouchEvent) {
        match event {
            TouchEvent::Start { touches } => match touches.len() {
                0 => {}
                1 => self.pointer_down(touches[0], MouseButton::Left, Modifiers::NONE),
                _ => {
                    // A second finger cancels any single-finger interaction.
                    let (dist, center) = gesture_metrics(&touches);
                    self.state = InteractionState::Pinching { dist, center };
                }
            },
            TouchEvent::Move { touches } => match (self.state, touches.len()) {
                (InteractionState::Pinching { dist, center }, n) if n >= 2 => {
                    let (new_dist, new_center) = gesture_metrics(&touches);
                    let camera = &mut self.active_workspace_mut().camera;
                    camera.pan(new_center - center);
                    if dist > 0.0 {
                        let ratio = (new_dist / dist).clamp(PINCH_RATIO_MIN, PINCH_RATIO_MAX);
                        if (1.0 - ratio).abs() > 0.01 {
                            camera.zoom_at(new_center, ratio);
                        }
                    }
                    self.state = InteractionState::Pinching {
                        dist: new_dist,
                        center: new_center,
                    };
                }
                (_, 1) => self.pointer_move(touches[0]),
                _ => {}
            },
            TouchEvent::End => match self.state {
                InteractionState::Pinching { .. } => self.state = InteractionState::Idle,
                _ => self.pointer_up(self.last_screen),
            },
            TouchEvent::Cancel => self.cancel_interaction(),
        }
    }

    /// Abort any in-progress interaction without a partial commit.
    pub fn cancel_interaction(&mut self) {
        if self.state != InteractionState::Idle {
            log::debug!("interaction cancelled from {:?}", self.state);
            self.state = InteractionState::Idle;
        }
    }

    // --- Pointer transitions ---

    fn pointer_down(&mut self, screen: Point, button: MouseButton, modifiers: Modifiers) {
        self.last_screen = screen;
        match button {
            MouseButton::Middle => {
                self.state = InteractionState::Panning { last: screen };
                return;
            }
            MouseButton::Right => return,
            MouseButton::Left => {}
        }

        let world = self.screen_to_world(screen);
        let snap = self.resolve_snap(world, None);
        self.hover = HoverState {
            cursor: snap.position,
            target: snap.kind,
        };

        match self.tool {
            ToolKind::Select => self.select_down(world, snap, screen, modifiers),
            ToolKind::Eraser => self.eraser_down(world, snap, screen),
            ToolKind::Point => self.point_down(snap),
            ToolKind::Text => self.text_down(snap),
            ToolKind::Segment | ToolKind::Line | ToolKind::Ray | ToolKind::Circle => {
                self.shape_tool_down(snap)
            }
        }
    }

    fn select_down(&mut self, world: Point, snap: SnapResult, screen: Point, modifiers: Modifiers) {
        match snap.kind {
            SnapKind::Point(id) => {
                self.update_selection(id, modifiers.shift);
                self.state = InteractionState::Dragging {
                    target: DragTarget::Point(id),
                    committed: false,
                };
            }
            SnapKind::Text(id) => {
                self.update_selection(id, modifiers.shift);
                self.state = InteractionState::Dragging {
                    target: DragTarget::Text(id),
                    committed: false,
                };
            }
            _ => {
                let hit = {
                    let threshold = self.snap_threshold();
                    let ws = self.active_workspace();
                    snap::nearest_on_shape(world, &ws.shapes, &ws.points, threshold)
                        .map(|(id, _)| id)
                };
                match hit {
                    Some(id) => self.update_selection(id, modifiers.shift),
                    None => {
                        if !modifiers.shift {
                            self.selection.clear();
                        }
                        self.state = InteractionState::Panning { last: screen };
                    }
                }
            }
        }
    }

    fn eraser_down(&mut self, world: Point, snap: SnapResult, screen: Point) {
        match snap.kind {
            SnapKind::Point(id) | SnapKind::Text(id) => {
                self.active_workspace_mut().delete_selection(&[id]);
                self.prune_selection();
            }
            _ => {
                let hit = {
                    let threshold = self.snap_threshold();
                    let ws = self.active_workspace();
                    snap::nearest_on_shape(world, &ws.shapes, &ws.points, threshold)
                        .map(|(id, _)| id)
                };
                match hit {
                    Some(id) => {
                        self.active_workspace_mut().delete_selection(&[id]);
                        self.prune_selection();
                    }
                    // Nothing to erase: the press falls through to panning.
                    None => self.state = InteractionState::Panning { last: screen },
                }
            }
        }
    }

    fn point_down(&mut self, snap: SnapResult) {
        // Never stack a new point on an existing one.
        if snap.point_id().is_some() {
            return;
        }
        let label = self.active_workspace().next_label();
        self.active_workspace_mut()
            .create_point(snap.position.x, snap.position.y, Some(label));
    }

    fn text_down(&mut self, snap: SnapResult) {
        match snap.kind {
            SnapKind::Text(id) => self.begin_text_editing(id),
            _ => {
                self.end_text_editing();
                let id = self
                    .active_workspace_mut()
                    .create_text(snap.position.x, snap.position.y, "");
                self.begin_text_editing(id);
            }
        }
    }

    fn shape_tool_down(&mut self, snap: SnapResult) {
        let Some(kind) = self.tool.shape_kind() else {
            return;
        };
        match self.state {
            InteractionState::Drafting { start } => {
                let target = self.target_point(snap);
                if target != start {
                    self.active_workspace_mut().create_shape(kind, start, target, None);
                }
                // A click back on the anchor abandons the draft.
                self.state = InteractionState::Idle;
            }
            _ => {
                let start = self.target_point(snap);
                self.state = InteractionState::Drafting { start };
            }
        }
    }

    /// The point a construction click refers to: the snapped existing
    /// point, or a fresh labeled point at the effective position.
    fn target_point(&mut self, snap: SnapResult) -> PointId {
        if let Some(id) = snap.point_id() {
            return id;
        }
        let label = self.active_workspace().next_label();
        self.active_workspace_mut()
            .create_point(snap.position.x, snap.position.y, Some(label))
    }

    fn pointer_move(&mut self, screen: Point) {
        self.last_screen = screen;
        match self.state {
            InteractionState::Panning { last } => {
                self.active_workspace_mut().camera.pan(screen - last);
                self.state = InteractionState::Panning { last: screen };
            }
            InteractionState::Pinching { .. } => {}
            InteractionState::Dragging { target, committed } => {
                let world = self.screen_to_world(screen);
                let snap = self.resolve_snap(world, Some(target.id()));
                self.hover = HoverState {
                    cursor: snap.position,
                    target: snap.kind,
                };

                let current = {
                    let ws = self.active_workspace();
                    match target {
                        DragTarget::Point(id) => ws.points.get(&id).map(|p| (p.x, p.y)),
                        DragTarget::Text(id) => ws.texts.get(&id).map(|t| (t.x, t.y)),
                    }
                };
                let Some(current) = current else {
                    // The dragged entity vanished (e.g. via undo).
                    self.state = InteractionState::Idle;
                    return;
                };
                let next = (snap.position.x, snap.position.y);
                if current == next {
                    return;
                }
                // The whole drag is one history entry, pushed at the
                // first actual movement.
                if !committed {
                    self.active_workspace_mut().begin_change();
                    self.state = InteractionState::Dragging {
                        target,
                        committed: true,
                    };
                }
                let ws = self.active_workspace_mut();
                match target {
                    DragTarget::Point(id) => ws.set_point_position(id, next.0, next.1),
                    DragTarget::Text(id) => ws.set_text_position(id, next.0, next.1),
                };
            }
            InteractionState::Idle | InteractionState::Drafting { .. } => {
                let world = self.screen_to_world(screen);
                let snap = self.resolve_snap(world, None);
                self.hover = HoverState {
                    cursor: snap.position,
                    target: snap.kind,
                };
            }
        }
    }

    fn pointer_up(&mut self, screen: Point) {
        self.last_screen = screen;
        match self.state {
            InteractionState::Dragging { .. } | InteractionState::Panning { .. } => {
                self.state = InteractionState::Idle;
            }
            InteractionState::Drafting { start } => self.draft_release(start, screen),
            InteractionState::Idle | InteractionState::Pinching { .. } => {}
        }
    }

    /// Drag-to-create: a release far enough from the draft anchor
    /// finalizes the shape; a short release keeps the draft pending for
    /// the second click.
    fn draft_release(&mut self, start: PointId, screen: Point) {
        let Some(kind) = self.tool.shape_kind() else {
            self.state = InteractionState::Idle;
            return;
        };
        let world = self.screen_to_world(screen);
        let zoom = self.active_workspace().camera.zoom;
        let Some(start_pos) = self
            .active_workspace()
            .points
            .get(&start)
            .map(|p| p.position())
        else {
            self.state = InteractionState::Idle;
            return;
        };
        if geometry::distance(start_pos, world) * zoom <= DRAG_CREATE_DISTANCE {
            return;
        }

        let snap = self.resolve_snap(world, None);
        let p2 = match snap.point_id() {
            Some(id) if id != start => id,
            // Snapped back onto the anchor: keep the draft pending.
            Some(_) => return,
            None => match kind {
                // Infinite shapes are defined by direction, not by a
                // visible second endpoint.
                ShapeKind::Line | ShapeKind::Ray => self
                    .active_workspace_mut()
                    .create_hidden_point(snap.position.x, snap.position.y),
                ShapeKind::Segment | ShapeKind::Circle => {
                    let label = self.active_workspace().next_label();
                    self.active_workspace_mut().create_point(
                        snap.position.x,
                        snap.position.y,
                        Some(label),
                    )
                }
            },
        };
        self.active_workspace_mut().create_shape(kind, start, p2, None);
        self.state = InteractionState::Idle;
    }

    fn update_selection(&mut self, id: Uuid, toggle: bool) {
        if toggle {
            match self.selection.iter().position(|&s| s == id) {
                Some(index) => {
                    self.selection.remove(index);
                }
                None => self.selection.push(id),
            }
        } else {
            self.selection = vec![id];
        }
    }
}

fn gesture_metrics(touches: &[Point]) -> (f64, Point) {
    let (a, b) = (touches[0], touches[1]);
    (
        geometry::distance(a, b),
        Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0),
    )
}
