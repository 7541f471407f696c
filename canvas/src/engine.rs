//! Gesture controller: pointer events in, note geometry and actions out.
//!
//! DESIGN
//! ======
//! Every handler is a transition of the closed `GestureState` machine and
//! returns the `Action`s the host must carry out. Intermediate moves only
//! touch the local `NoteCollection`; the single `CommitPositions` /
//! `CommitSizes` action is emitted when the gesture ends, so the host sends
//! one remote write per gesture no matter how many move events arrived.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use crate::consts::{MIN_NOTE_HEIGHT, MIN_NOTE_WIDTH};
use crate::doc::NoteCollection;
use crate::hit::{HitPart, ResizeDirection, hit_test};
use crate::input::{Button, GestureState};
use crate::note::{Geometry, NoteId, PositionUpdate, SizeUpdate};
use crate::viewport::{Point, Viewport};

/// Cursor shown while no gesture is active.
pub const CURSOR_DEFAULT: &str = "default";

/// Cursor shown while a note is being dragged.
pub const CURSOR_GRABBING: &str = "grabbing";

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The pointer event was consumed by a note; do not let it reach
    /// canvas-level handlers.
    CaptureEvent,
    SetCursor(String),
    RenderNeeded,
    /// Persist final note positions (end of a drag).
    CommitPositions(Vec<PositionUpdate>),
    /// Persist final note sizes (end of a resize).
    CommitSizes(Vec<SizeUpdate>),
}

/// Single owner of the active gesture.
#[derive(Debug, Clone, Default)]
pub struct GestureController {
    state: GestureState,
    viewport: Viewport,
}

impl GestureController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The active gesture.
    #[must_use]
    pub fn state(&self) -> GestureState {
        self.state
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Update where the canvas sits on screen.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    // --- Gesture start ---

    /// Route a pointer-down through hit testing: a handle starts a resize,
    /// a body starts a drag, empty canvas does nothing.
    pub fn on_pointer_down(&mut self, doc: &NoteCollection, screen_pt: Point, button: Button) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        let canvas_pt = self.viewport.screen_to_canvas(screen_pt);
        let Some(hit) = hit_test(canvas_pt, doc) else {
            return Vec::new();
        };
        match hit.part {
            HitPart::Body => self.begin_drag(doc, hit.note_id, screen_pt),
            HitPart::ResizeHandle(direction) => self.begin_resize(doc, hit.note_id, direction),
        }
    }

    /// Start dragging `id`, capturing the pointer's offset from the note origin.
    ///
    /// An active gesture is ended (and committed) first. Unknown ids are ignored.
    pub fn begin_drag(&mut self, doc: &NoteCollection, id: NoteId, screen_pt: Point) -> Vec<Action> {
        let Some(note) = doc.get(&id) else {
            return Vec::new();
        };
        let offset = self
            .viewport
            .screen_to_canvas(screen_pt)
            .sub(note.geometry().origin());
        let mut actions = self.finish(doc);
        self.state = GestureState::Dragging { id, offset };
        actions.push(Action::CaptureEvent);
        actions.push(Action::SetCursor(CURSOR_GRABBING.to_owned()));
        actions
    }

    /// Start resizing `id` from the given handle.
    ///
    /// An active gesture is ended (and committed) first. Unknown ids are ignored.
    pub fn begin_resize(&mut self, doc: &NoteCollection, id: NoteId, direction: ResizeDirection) -> Vec<Action> {
        if doc.get(&id).is_none() {
            return Vec::new();
        }
        let mut actions = self.finish(doc);
        self.state = GestureState::Resizing { id, direction };
        actions.push(Action::CaptureEvent);
        actions.push(Action::SetCursor(direction.cursor().to_owned()));
        actions
    }

    // --- Gesture progress ---

    /// Apply a pointer move to the target note's local geometry.
    pub fn on_pointer_move(&mut self, doc: &mut NoteCollection, screen_pt: Point) -> Vec<Action> {
        let canvas_pt = self.viewport.screen_to_canvas(screen_pt);
        let written = match self.state {
            GestureState::Idle => return Vec::new(),
            GestureState::Dragging { id, offset } => doc.mutate_geometry(&id, |g| drag_geometry(g, canvas_pt, offset)),
            GestureState::Resizing { id, direction } => {
                doc.mutate_geometry(&id, |g| resize_geometry(g, canvas_pt, direction))
            }
        };
        if written.is_some() { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    // --- Gesture end ---

    /// End the active gesture and emit its single commit.
    pub fn on_pointer_up(&mut self, doc: &NoteCollection) -> Vec<Action> {
        self.finish(doc)
    }

    /// The pointer left the canvas bounds; treated exactly like a release.
    pub fn on_pointer_leave(&mut self, doc: &NoteCollection) -> Vec<Action> {
        self.finish(doc)
    }

    /// Drop the active gesture without committing anything.
    ///
    /// Returns `true` if a gesture was active.
    pub fn cancel(&mut self) -> bool {
        let was_active = !self.state.is_idle();
        self.state = GestureState::Idle;
        was_active
    }

    /// Cancel the active gesture only if it is bound to `id`.
    pub fn cancel_if_targets(&mut self, id: &NoteId) -> bool {
        if self.state.target().as_ref() == Some(id) { self.cancel() } else { false }
    }

    fn finish(&mut self, doc: &NoteCollection) -> Vec<Action> {
        let commit = match std::mem::take(&mut self.state) {
            GestureState::Idle => return Vec::new(),
            GestureState::Dragging { id, .. } => doc
                .get(&id)
                .map(|note| Action::CommitPositions(vec![PositionUpdate { id, x: note.x, y: note.y }])),
            GestureState::Resizing { id, .. } => doc.get(&id).map(|note| {
                let g = note.geometry();
                Action::CommitSizes(vec![SizeUpdate { id, width: g.width, height: g.height }])
            }),
        };
        let mut actions: Vec<Action> = commit.into_iter().collect();
        actions.push(Action::SetCursor(CURSOR_DEFAULT.to_owned()));
        actions
    }
}

/// New geometry for a drag: pointer minus captured offset, clamped to `>= 0`.
#[must_use]
pub fn drag_geometry(current: Geometry, canvas_pt: Point, offset: Point) -> Geometry {
    let origin = canvas_pt.sub(offset).clamp_non_negative();
    Geometry { x: origin.x, y: origin.y, ..current }
}

/// New geometry for a resize: pointer minus note origin on the axes the
/// handle controls, floored at the minimum note size.
#[must_use]
pub fn resize_geometry(current: Geometry, canvas_pt: Point, direction: ResizeDirection) -> Geometry {
    let mut next = current;
    if direction.affects_width() {
        next.width = (canvas_pt.x - current.x).max(MIN_NOTE_WIDTH);
    }
    if direction.affects_height() {
        next.height = (canvas_pt.y - current.y).max(MIN_NOTE_HEIGHT);
    }
    next
}
