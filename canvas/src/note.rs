//! Note model: canvases, notes, their variant payloads, and the edit types.
//!
//! This module defines what lives on a canvas (`Note`, tagged by
//! `NoteContent`), the body sent to create one (`NoteDraft`), a sparse
//! field-edit type (`NotePatch`), and the batched geometry updates sent at
//! the end of a gesture (`PositionUpdate`, `SizeUpdate`).
//!
//! The JSON shape matches the backend: the variant is a `"type"` field
//! flattened next to the common fields, so a text note looks like
//! `{"id": .., "type": "text", "title": .., "content": .., "x": .., ...}`.

#[cfg(test)]
#[path = "note_test.rs"]
mod note_test;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::consts::{
    AUDIO_NOTE_HEIGHT, AUDIO_NOTE_WIDTH, DEFAULT_NOTE_HEIGHT, DEFAULT_NOTE_WIDTH, IMAGE_NOTE_HEIGHT, IMAGE_NOTE_WIDTH,
    RECOGNIZED_NOTE_HEIGHT, RECOGNIZED_NOTE_WIDTH,
};
use crate::viewport::Point;

/// Unique identifier for a note.
pub type NoteId = Uuid;

/// Unique identifier for a canvas.
pub type CanvasId = Uuid;

/// Title given to text notes created from the toolbar.
pub const DEFAULT_TEXT_TITLE: &str = "New note";

/// Body given to text notes created from the toolbar.
pub const DEFAULT_TEXT_CONTENT: &str = "Note content";

/// A named workspace holding an independent set of notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub id: CanvasId,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

/// The variant of a note, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    Text,
    Image,
    Audio,
    Drawing,
}

impl NoteKind {
    /// Initial size for a note of this kind created through the usual path
    /// (toolbar for text and drawing, upload for image and audio).
    #[must_use]
    pub fn default_size(self) -> Size {
        match self {
            Self::Text | Self::Drawing => Size::new(DEFAULT_NOTE_WIDTH, DEFAULT_NOTE_HEIGHT),
            Self::Image => Size::new(IMAGE_NOTE_WIDTH, IMAGE_NOTE_HEIGHT),
            Self::Audio => Size::new(AUDIO_NOTE_WIDTH, AUDIO_NOTE_HEIGHT),
        }
    }

    /// Lowercase wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Drawing => "drawing",
        }
    }
}

impl std::fmt::Display for NoteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variant payload of a note. Each variant carries only its own fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NoteContent {
    /// Free text with a title.
    Text { title: String, content: String },
    /// An uploaded image with an optional caption.
    Image {
        /// Stored-file reference returned by the upload endpoint.
        file_path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    /// An uploaded audio clip with an optional transcript.
    Audio {
        /// Stored-file reference returned by the upload endpoint.
        file_path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transcript: Option<String>,
    },
    /// Opaque stroke data.
    Drawing { drawing_data: serde_json::Value },
}

impl NoteContent {
    #[must_use]
    pub fn text(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Text { title: title.into(), content: content.into() }
    }

    #[must_use]
    pub fn image(file_path: impl Into<String>) -> Self {
        Self::Image { file_path: file_path.into(), caption: None }
    }

    #[must_use]
    pub fn audio(file_path: impl Into<String>) -> Self {
        Self::Audio { file_path: file_path.into(), transcript: None }
    }

    #[must_use]
    pub fn drawing(drawing_data: serde_json::Value) -> Self {
        Self::Drawing { drawing_data }
    }

    #[must_use]
    pub fn kind(&self) -> NoteKind {
        match self {
            Self::Text { .. } => NoteKind::Text,
            Self::Image { .. } => NoteKind::Image,
            Self::Audio { .. } => NoteKind::Audio,
            Self::Drawing { .. } => NoteKind::Drawing,
        }
    }

    /// Stored-file reference for media variants.
    #[must_use]
    pub fn file_path(&self) -> Option<&str> {
        match self {
            Self::Image { file_path, .. } | Self::Audio { file_path, .. } => Some(file_path),
            Self::Text { .. } | Self::Drawing { .. } => None,
        }
    }
}

/// Width and height of a note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Size of a text note saved from OCR or transcription output.
    #[must_use]
    pub fn recognized_text() -> Self {
        Self::new(RECOGNIZED_NOTE_WIDTH, RECOGNIZED_NOTE_HEIGHT)
    }
}

/// Resolved bounding box of a note, with absent sizes defaulted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Geometry {
    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Whether `pt` lies inside the box (edges inclusive).
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.x + self.width && pt.y >= self.y && pt.y <= self.y + self.height
    }
}

/// A note as held in memory and on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Server-assigned identifier.
    pub id: NoteId,
    /// Variant tag and payload.
    #[serde(flatten)]
    pub content: NoteContent,
    /// Left edge in canvas coordinates.
    pub x: f64,
    /// Top edge in canvas coordinates.
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Free-form tags. Order is kept, duplicates are allowed.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    /// Server-assigned creation timestamp.
    pub created_at: String,
    /// Server-assigned modification timestamp.
    pub updated_at: String,
}

impl Note {
    #[must_use]
    pub fn kind(&self) -> NoteKind {
        self.content.kind()
    }

    /// The note's bounding box, falling back to the default size per axis.
    #[must_use]
    pub fn geometry(&self) -> Geometry {
        Geometry {
            x: self.x,
            y: self.y,
            width: self.width.unwrap_or(DEFAULT_NOTE_WIDTH),
            height: self.height.unwrap_or(DEFAULT_NOTE_HEIGHT),
        }
    }

    /// Write a geometry back. An absent size stays absent unless it changed.
    pub fn set_geometry(&mut self, geometry: Geometry) {
        let current = self.geometry();
        self.x = geometry.x;
        self.y = geometry.y;
        if self.width.is_some() || (geometry.width - current.width).abs() > f64::EPSILON {
            self.width = Some(geometry.width);
        }
        if self.height.is_some() || (geometry.height - current.height).abs() > f64::EPSILON {
            self.height = Some(geometry.height);
        }
    }

    /// Return a copy of this note with `patch` applied.
    ///
    /// Fields that do not belong to this note's variant are ignored.
    #[must_use]
    pub fn merged(&self, patch: &NotePatch) -> Note {
        let mut next = self.clone();
        match &mut next.content {
            NoteContent::Text { title, content } => {
                if let Some(v) = &patch.title {
                    title.clone_from(v);
                }
                if let Some(v) = &patch.content {
                    content.clone_from(v);
                }
            }
            NoteContent::Image { file_path, caption } => {
                if let Some(v) = &patch.file_path {
                    file_path.clone_from(v);
                }
                if let Some(v) = &patch.caption {
                    *caption = Some(v.clone());
                }
            }
            NoteContent::Audio { file_path, transcript } => {
                if let Some(v) = &patch.file_path {
                    file_path.clone_from(v);
                }
                if let Some(v) = &patch.transcript {
                    *transcript = Some(v.clone());
                }
            }
            NoteContent::Drawing { drawing_data } => {
                if let Some(v) = &patch.drawing_data {
                    drawing_data.clone_from(v);
                }
            }
        }
        if let Some(tags) = &patch.tags {
            next.tags.clone_from(tags);
        }
        next
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of a note creation request. The server assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteDraft {
    #[serde(flatten)]
    pub content: NoteContent,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub tags: Vec<String>,
}

impl NoteDraft {
    #[must_use]
    pub fn new(content: NoteContent, origin: Point, size: Size) -> Self {
        Self { content, x: origin.x, y: origin.y, width: size.width, height: size.height, tags: Vec::new() }
    }
}

/// Sparse field edit for a note. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drawing_data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl NotePatch {
    /// Returns `true` if the patch sets no field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Split a comma-separated tag string into trimmed, non-empty tags.
#[must_use]
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Final position of one note after a drag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub id: NoteId,
    pub x: f64,
    pub y: f64,
}

/// Final size of one note after a resize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeUpdate {
    pub id: NoteId,
    pub width: f64,
    pub height: f64,
}
