//! Remote store: the backend REST boundary behind a trait.
//!
//! DESIGN
//! ======
//! `RemoteStore` is the single seam between the interaction engine and the
//! network. The note store, sync coordinator and session all hold an
//! `Arc<dyn RemoteStore>`; production uses [`http::HttpRemote`], tests use
//! an in-memory mock with failure switches and response gates.
//!
//! ERROR HANDLING
//! ==============
//! Every call reports only success or a `RemoteError`. Callers decide what a
//! failure means: geometry commits log it, field edits surface it, loads
//! fall back to an empty collection.

pub mod http;
#[cfg(test)]
pub mod mock;

use std::str::FromStr;

use async_trait::async_trait;
use canvas::note::{Canvas, CanvasId, Note, NoteContent, NoteDraft, NoteId, PositionUpdate, SizeUpdate};
use serde::Deserialize;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by remote store calls.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request never produced a response (network, timeout).
    #[error("request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success status.
    #[error("backend rejected request: status {status}")]
    Response { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("response parse failed: {0}")]
    Parse(String),
}

impl RemoteError {
    /// Network-level failure, as opposed to a rejected or malformed response.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Request(_))
    }
}

// =============================================================================
// TYPES
// =============================================================================

/// One entry of `GET /canvases`: either a bare id or full metadata.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CanvasListEntry {
    Id(CanvasId),
    Meta(Canvas),
}

impl CanvasListEntry {
    #[must_use]
    pub fn id(&self) -> CanvasId {
        match self {
            Self::Id(id) => *id,
            Self::Meta(canvas) => canvas.id,
        }
    }
}

/// Kinds of file the backend accepts for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Audio,
}

impl MediaKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
        }
    }

    /// Content of the note that points at an uploaded file of this kind.
    #[must_use]
    pub fn note_content(self, file_path: impl Into<String>) -> NoteContent {
        match self {
            Self::Image => NoteContent::image(file_path),
            Self::Audio => NoteContent::audio(file_path),
        }
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(Self::Image),
            "audio" => Ok(Self::Audio),
            other => Err(format!("unknown media kind '{other}' (expected 'image' or 'audio')")),
        }
    }
}

// =============================================================================
// TRAIT
// =============================================================================

/// The backend's canvas and note endpoints.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn list_canvases(&self) -> Result<Vec<CanvasListEntry>, RemoteError>;

    async fn get_canvas(&self, id: CanvasId) -> Result<Canvas, RemoteError>;

    async fn create_canvas(&self, name: &str) -> Result<Canvas, RemoteError>;

    async fn delete_canvas(&self, id: CanvasId) -> Result<(), RemoteError>;

    async fn list_notes(&self, canvas: CanvasId) -> Result<Vec<Note>, RemoteError>;

    /// Create a note; the returned note carries server-assigned id and timestamps.
    async fn create_note(&self, canvas: CanvasId, draft: &NoteDraft) -> Result<Note, RemoteError>;

    /// Replace a note with its full representation (PUT).
    async fn update_note(&self, canvas: CanvasId, note: &Note) -> Result<Note, RemoteError>;

    async fn patch_positions(&self, canvas: CanvasId, updates: &[PositionUpdate]) -> Result<(), RemoteError>;

    async fn patch_sizes(&self, canvas: CanvasId, updates: &[SizeUpdate]) -> Result<(), RemoteError>;

    async fn delete_note(&self, canvas: CanvasId, note: NoteId) -> Result<(), RemoteError>;

    /// Upload a file and return the stored file path.
    async fn upload_file(
        &self,
        canvas: CanvasId,
        kind: MediaKind,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, RemoteError>;

    /// Run OCR on an already uploaded image.
    async fn ocr_existing(&self, canvas: CanvasId, file_path: &str, lang: &str) -> Result<String, RemoteError>;

    /// Run speech recognition on an already uploaded audio file.
    async fn transcribe_existing(&self, canvas: CanvasId, file_path: &str, lang: &str)
    -> Result<String, RemoteError>;
}
