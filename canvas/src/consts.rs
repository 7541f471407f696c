//! Shared numeric constants for the canvas crate.

// ── Sizing ──────────────────────────────────────────────────────

/// Width used when a note carries no explicit width.
pub const DEFAULT_NOTE_WIDTH: f64 = 200.0;

/// Height used when a note carries no explicit height.
pub const DEFAULT_NOTE_HEIGHT: f64 = 150.0;

/// Resizing never shrinks a note below this width.
pub const MIN_NOTE_WIDTH: f64 = 100.0;

/// Resizing never shrinks a note below this height.
pub const MIN_NOTE_HEIGHT: f64 = 80.0;

/// Initial width of a freshly uploaded image note.
pub const IMAGE_NOTE_WIDTH: f64 = 220.0;

/// Initial height of a freshly uploaded image note.
pub const IMAGE_NOTE_HEIGHT: f64 = 160.0;

/// Initial width of a freshly uploaded audio note.
pub const AUDIO_NOTE_WIDTH: f64 = 250.0;

/// Initial height of a freshly uploaded audio note.
pub const AUDIO_NOTE_HEIGHT: f64 = 100.0;

/// Initial width of a text note saved from OCR or transcription output.
pub const RECOGNIZED_NOTE_WIDTH: f64 = 300.0;

/// Initial height of a text note saved from OCR or transcription output.
pub const RECOGNIZED_NOTE_HEIGHT: f64 = 200.0;

// ── Placement ───────────────────────────────────────────────────

/// Lower bound (inclusive) of the random placement region, on each axis.
pub const PLACEMENT_MIN: f64 = 50.0;

/// Upper bound (exclusive) of the random placement region, on each axis.
pub const PLACEMENT_MAX: f64 = 450.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Thickness of the resize handles along the bottom and right edges.
pub const HANDLE_SIZE: f64 = 12.0;
