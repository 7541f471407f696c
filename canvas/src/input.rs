//! Input model: mouse buttons and the gesture state machine.
//!
//! `GestureState` is the single active gesture tracked between pointer-down
//! and pointer-up (or pointer-leave). It is a closed enumeration, so "at most
//! one gesture" holds by construction: there is no way to be dragging and
//! resizing at the same time.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::hit::ResizeDirection;
use crate::note::NoteId;
use crate::viewport::Point;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// Internal state for the gesture state machine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is moving a note across the canvas.
    Dragging {
        /// Id of the note being dragged.
        id: NoteId,
        /// Pointer position minus the note's origin at press time, in canvas units.
        offset: Point,
    },
    /// The user is resizing a note by one of its handles.
    Resizing {
        /// Id of the note being resized.
        id: NoteId,
        /// Which handle is being dragged.
        direction: ResizeDirection,
    },
}

impl GestureState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// The note the active gesture is bound to, if any.
    #[must_use]
    pub fn target(&self) -> Option<NoteId> {
        match self {
            Self::Idle => None,
            Self::Dragging { id, .. } | Self::Resizing { id, .. } => Some(*id),
        }
    }
}
