//! Note model and pointer-gesture engine for the freeform notes canvas.
//!
//! Everything here is synchronous and free of I/O. The host feeds pointer
//! events into [`engine::GestureController`] together with the local
//! [`doc::NoteCollection`], and carries out the returned [`engine::Action`]s
//! (capturing the event, updating the cursor, persisting geometry).
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Gesture controller and the actions it emits |
//! | [`doc`] | Ordered in-memory note collection |
//! | [`note`] | Note, canvas, draft and patch types (wire format) |
//! | [`viewport`] | Screen/canvas coordinate conversion |
//! | [`input`] | Pointer buttons and the gesture state machine |
//! | [`hit`] | Hit-testing note bodies and resize handles |
//! | [`consts`] | Default sizes, minimum sizes, placement bounds |

pub mod consts;
pub mod doc;
pub mod engine;
pub mod hit;
pub mod input;
pub mod note;
pub mod viewport;
