//! Canvas session — the active canvas and everything bound to it.
//!
//! DESIGN
//! ======
//! A session is an explicit context object rather than global state, so
//! several independent sessions can coexist (tests run many in parallel).
//! It owns the active canvas id, the single `GestureController`, and the
//! notice list, and drives the `NoteStore` and `SyncCoordinator`.
//!
//! Pointer handlers are synchronous: they lock the session, then the store
//! (always in that order), run one controller transition, and hand any
//! commit actions to the sync coordinator before returning.
//!
//! ERROR HANDLING
//! ==============
//! Operations that need an active canvas return `Ok(None)` / `Ok(false)`
//! without touching anything when there is none. Field-edit failures and
//! failed saves of recognized text also push an error notice; geometry and
//! load failures stay silent (logged only).

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use canvas::engine::{Action, GestureController};
use canvas::hit::ResizeDirection;
use canvas::input::{Button, GestureState};
use canvas::note::{Canvas, CanvasId, Note, NoteContent, NoteId, NoteKind, NotePatch, Size};
use canvas::viewport::{Point, Viewport};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::RecognitionLangs;
use crate::remote::{CanvasListEntry, MediaKind, RemoteError, RemoteStore};
use crate::store::NoteStore;
use crate::sync::SyncCoordinator;

/// Title of a text note saved from OCR output.
pub const RECOGNIZED_TEXT_TITLE: &str = "Recognized text";

/// Title of a text note saved from a speech transcript.
pub const TRANSCRIPT_TITLE: &str = "Transcript";

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("note not found: {0}")]
    NoteNotFound(NoteId),

    #[error("expected a {expected} note, found {found}")]
    UnsupportedKind { expected: NoteKind, found: NoteKind },
}

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A dismissible user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

/// Output of OCR or transcription, plus the note it was saved as (if asked).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recognition {
    pub text: String,
    pub saved: Option<Note>,
}

/// What a pointer handler produced: actions for the host, and the spawned
/// commit tasks (empty unless the handler ended a gesture).
#[derive(Debug, Default)]
pub struct GestureOutcome {
    pub actions: Vec<Action>,
    pub commits: Vec<JoinHandle<()>>,
}

impl GestureOutcome {
    /// Wait for any spawned commits to finish.
    pub async fn settle(self) {
        for commit in self.commits {
            if let Err(e) = commit.await {
                warn!(error = %e, "geometry commit task failed");
            }
        }
    }
}

// =============================================================================
// SESSION
// =============================================================================

struct SessionInner {
    active: Option<CanvasId>,
    gesture: GestureController,
    notices: Vec<Notice>,
    next_notice_id: u64,
}

#[derive(Clone)]
pub struct CanvasSession {
    remote: Arc<dyn RemoteStore>,
    store: NoteStore,
    sync: SyncCoordinator,
    langs: RecognitionLangs,
    inner: Arc<Mutex<SessionInner>>,
}

impl CanvasSession {
    #[must_use]
    pub fn new(remote: Arc<dyn RemoteStore>, langs: RecognitionLangs) -> Self {
        let store = NoteStore::new(Arc::clone(&remote));
        Self::with_store(remote, store, langs)
    }

    /// Session around an existing store (e.g. one with seeded placement).
    #[must_use]
    pub fn with_store(remote: Arc<dyn RemoteStore>, store: NoteStore, langs: RecognitionLangs) -> Self {
        let sync = SyncCoordinator::new(Arc::clone(&remote), store.clone());
        let inner = SessionInner { active: None, gesture: GestureController::new(), notices: Vec::new(), next_notice_id: 1 };
        Self { remote, store, sync, langs, inner: Arc::new(Mutex::new(inner)) }
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn active_canvas(&self) -> Option<CanvasId> {
        self.lock().active
    }

    #[must_use]
    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    /// Notes of the active canvas in stacking order.
    #[must_use]
    pub fn notes(&self) -> Vec<Note> {
        self.store.snapshot()
    }

    #[must_use]
    pub fn gesture_state(&self) -> GestureState {
        self.lock().gesture.state()
    }

    // --- Canvases ---

    /// All canvases with metadata. Entries whose metadata cannot be fetched
    /// are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas list itself cannot be fetched.
    pub async fn list_canvases(&self) -> Result<Vec<Canvas>, SessionError> {
        let entries = self.remote.list_canvases().await?;
        let mut canvases = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                CanvasListEntry::Meta(canvas) => canvases.push(canvas),
                CanvasListEntry::Id(id) => match self.remote.get_canvas(id).await {
                    Ok(canvas) => canvases.push(canvas),
                    Err(e) => warn!(error = %e, canvas_id = %id, "skipping canvas with unreadable metadata"),
                },
            }
        }
        Ok(canvases)
    }

    /// Make `id` the active canvas: cancel any gesture, then load its notes.
    ///
    /// The active canvas and the store binding change under one session
    /// lock, so concurrent selects always leave them agreeing.
    pub async fn select_canvas(&self, id: CanvasId) {
        let seq = {
            let mut inner = self.lock();
            inner.active = Some(id);
            if inner.gesture.cancel() {
                debug!(canvas_id = %id, "gesture cancelled by canvas switch");
            }
            self.store.bind(id)
        };
        info!(canvas_id = %id, "canvas selected");
        self.store.fetch(id, seq).await;
    }

    /// Create a canvas and select it.
    ///
    /// # Errors
    ///
    /// Returns the remote error; the active canvas is unchanged.
    pub async fn create_canvas(&self, name: &str) -> Result<Canvas, SessionError> {
        let canvas = self.remote.create_canvas(name).await?;
        info!(canvas_id = %canvas.id, name = %canvas.name, "canvas created");
        self.select_canvas(canvas.id).await;
        Ok(canvas)
    }

    /// Delete a canvas. Deleting the active one falls back to the first
    /// remaining canvas, or to none (with an empty collection).
    ///
    /// # Errors
    ///
    /// Returns the remote error if the deletion itself fails.
    pub async fn delete_canvas(&self, id: CanvasId) -> Result<(), SessionError> {
        self.remote.delete_canvas(id).await?;
        info!(canvas_id = %id, "canvas deleted");
        if self.active_canvas() != Some(id) {
            return Ok(());
        }

        let next = match self.remote.list_canvases().await {
            Ok(entries) => entries.iter().map(CanvasListEntry::id).find(|c| *c != id),
            Err(e) => {
                warn!(error = %e, "canvas list failed after delete; clearing active canvas");
                None
            }
        };

        let seq = {
            let mut inner = self.lock();
            if inner.active != Some(id) {
                debug!(canvas_id = %id, "active canvas changed during delete; keeping it");
                return Ok(());
            }
            inner.gesture.cancel();
            inner.active = next;
            match next {
                Some(next) => Some(self.store.bind(next)),
                None => {
                    self.store.clear();
                    None
                }
            }
        };

        if let (Some(next), Some(seq)) = (next, seq) {
            info!(canvas_id = %next, "falling back to remaining canvas");
            self.store.fetch(next, seq).await;
        }
        Ok(())
    }

    /// Reload the active canvas's notes. Returns `false` with no canvas.
    pub async fn refresh(&self) -> bool {
        match self.active_canvas() {
            Some(id) => self.store.load(id).await,
            None => false,
        }
    }

    // --- Note creation ---

    /// Create a text note at a random spot with the toolbar's default size.
    ///
    /// # Errors
    ///
    /// Returns the remote error; nothing is added locally.
    pub async fn create_text_note(&self, title: &str, content: &str) -> Result<Option<Note>, SessionError> {
        if self.active_canvas().is_none() {
            return Ok(None);
        }
        Ok(self.store.create(NoteContent::text(title, content)).await?)
    }

    /// Create a drawing note holding `drawing_data` as is.
    ///
    /// # Errors
    ///
    /// Returns the remote error; nothing is added locally.
    pub async fn create_drawing_note(&self, drawing_data: serde_json::Value) -> Result<Option<Note>, SessionError> {
        if self.active_canvas().is_none() {
            return Ok(None);
        }
        Ok(self.store.create(NoteContent::drawing(drawing_data)).await?)
    }

    /// Upload a file, then create an image or audio note pointing at it.
    ///
    /// # Errors
    ///
    /// Returns the remote error of the upload or of the note creation.
    pub async fn upload_media(
        &self,
        kind: MediaKind,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Option<Note>, SessionError> {
        let Some(canvas) = self.active_canvas() else {
            return Ok(None);
        };
        let file_path = self.remote.upload_file(canvas, kind, file_name, bytes).await?;
        info!(canvas_id = %canvas, kind = kind.as_str(), %file_path, "file uploaded");
        Ok(self.store.create(kind.note_content(file_path)).await?)
    }

    /// Save `text` as a new 300x200 text note titled `title`.
    ///
    /// # Errors
    ///
    /// Returns the remote error after pushing an error notice.
    pub async fn create_note_from_text(&self, title: &str, text: &str) -> Result<Option<Note>, SessionError> {
        if self.active_canvas().is_none() {
            return Ok(None);
        }
        match self.store.create_sized(NoteContent::text(title, text), Size::recognized_text()).await {
            Ok(Some(note)) => {
                self.push_notice(NoticeLevel::Info, "Note created", "Text saved as a new note");
                Ok(Some(note))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                self.push_notice(NoticeLevel::Error, "Error", "Could not create note");
                Err(e.into())
            }
        }
    }

    // --- Note edits ---

    /// Apply a field edit and wait for the backend to confirm it.
    ///
    /// # Errors
    ///
    /// The remote error (after pushing an error notice) if the backend
    /// rejects it. A note that is no longer on the canvas is a no-op
    /// returning `Ok(None)`.
    pub async fn edit_note(&self, id: NoteId, patch: &NotePatch) -> Result<Option<Note>, SessionError> {
        if self.active_canvas().is_none() {
            return Ok(None);
        }
        match self.sync.commit_field_edit(id, patch).await {
            Ok(Some(note)) => Ok(Some(note)),
            Ok(None) => {
                debug!(note_id = %id, "edit of a note no longer on the canvas ignored");
                Ok(None)
            }
            Err(e) => {
                self.push_notice(NoticeLevel::Error, "Error", &format!("Could not save note: {e}"));
                Err(e.into())
            }
        }
    }

    /// Delete a note; a gesture bound to it is cancelled once the backend
    /// confirms. Returns `Ok(false)` for a note that is no longer on the
    /// canvas.
    ///
    /// # Errors
    ///
    /// Returns the remote error; the note stays in place.
    pub async fn delete_note(&self, id: NoteId) -> Result<bool, SessionError> {
        if self.active_canvas().is_none() {
            return Ok(false);
        }
        let removed = self.store.delete(id).await?;
        if removed && self.lock().gesture.cancel_if_targets(&id) {
            debug!(note_id = %id, "gesture cancelled by note deletion");
        }
        Ok(removed)
    }

    // --- Recognition ---

    /// Run OCR on an image note. With `save`, the text is also stored as a
    /// new text note titled "Recognized text".
    ///
    /// # Errors
    ///
    /// `NoteNotFound` / `UnsupportedKind` for a missing or non-image note,
    /// or the remote error.
    pub async fn recognize_text(&self, id: NoteId, save: bool) -> Result<Option<Recognition>, SessionError> {
        let Some(canvas) = self.active_canvas() else {
            return Ok(None);
        };
        let file_path = self.media_path(id, NoteKind::Image)?;
        let text = self.remote.ocr_existing(canvas, &file_path, &self.langs.ocr).await?;
        self.push_notice(
            NoticeLevel::Success,
            "Text recognized",
            &format!("Found {} characters", text.chars().count()),
        );
        let saved = if save { self.create_note_from_text(RECOGNIZED_TEXT_TITLE, &text).await? } else { None };
        Ok(Some(Recognition { text, saved }))
    }

    /// Transcribe an audio note. With `save`, the transcript is also stored
    /// as a new text note titled "Transcript".
    ///
    /// # Errors
    ///
    /// `NoteNotFound` / `UnsupportedKind` for a missing or non-audio note,
    /// or the remote error.
    pub async fn transcribe(&self, id: NoteId, save: bool) -> Result<Option<Recognition>, SessionError> {
        let Some(canvas) = self.active_canvas() else {
            return Ok(None);
        };
        let file_path = self.media_path(id, NoteKind::Audio)?;
        let text = self.remote.transcribe_existing(canvas, &file_path, &self.langs.transcribe).await?;
        self.push_notice(
            NoticeLevel::Success,
            "Speech recognized",
            &format!("Found {} words", text.split_whitespace().count()),
        );
        let saved = if save { self.create_note_from_text(TRANSCRIPT_TITLE, &text).await? } else { None };
        Ok(Some(Recognition { text, saved }))
    }

    fn media_path(&self, id: NoteId, expected: NoteKind) -> Result<String, SessionError> {
        let note = self.store.get(&id).ok_or(SessionError::NoteNotFound(id))?;
        match note.content.file_path() {
            Some(path) if note.kind() == expected => Ok(path.to_owned()),
            _ => Err(SessionError::UnsupportedKind { expected, found: note.kind() }),
        }
    }

    // --- Pointer input ---

    pub fn set_viewport(&self, viewport: Viewport) {
        self.lock().gesture.set_viewport(viewport);
    }

    pub fn pointer_down(&self, screen_pt: Point, button: Button) -> GestureOutcome {
        self.run_gesture(|gesture, store| store.with_notes(|doc| gesture.on_pointer_down(doc, screen_pt, button)))
    }

    /// Start a drag on a note the host has already targeted.
    pub fn begin_drag(&self, id: NoteId, screen_pt: Point) -> GestureOutcome {
        self.run_gesture(|gesture, store| store.with_notes(|doc| gesture.begin_drag(doc, id, screen_pt)))
    }

    /// Start a resize from a handle the host has already targeted.
    pub fn begin_resize(&self, id: NoteId, direction: ResizeDirection) -> GestureOutcome {
        self.run_gesture(|gesture, store| store.with_notes(|doc| gesture.begin_resize(doc, id, direction)))
    }

    pub fn pointer_move(&self, screen_pt: Point) -> GestureOutcome {
        self.run_gesture(|gesture, store| store.with_notes_mut(|doc| gesture.on_pointer_move(doc, screen_pt)))
    }

    pub fn pointer_up(&self) -> GestureOutcome {
        self.run_gesture(|gesture, store| store.with_notes(|doc| gesture.on_pointer_up(doc)))
    }

    pub fn pointer_leave(&self) -> GestureOutcome {
        self.run_gesture(|gesture, store| store.with_notes(|doc| gesture.on_pointer_leave(doc)))
    }

    /// Abandon the active gesture without committing it.
    pub fn cancel_gesture(&self) -> bool {
        self.lock().gesture.cancel()
    }

    fn run_gesture<F>(&self, transition: F) -> GestureOutcome
    where
        F: FnOnce(&mut GestureController, &NoteStore) -> Vec<Action>,
    {
        let (canvas, actions) = {
            let mut inner = self.lock();
            let actions = transition(&mut inner.gesture, &self.store);
            (inner.active, actions)
        };
        let commits = self.sync.dispatch(canvas, &actions);
        GestureOutcome { actions, commits }
    }

    // --- Notices ---

    fn push_notice(&self, level: NoticeLevel, title: &str, message: &str) -> u64 {
        let mut inner = self.lock();
        let id = inner.next_notice_id;
        inner.next_notice_id += 1;
        inner.notices.push(Notice { id, level, title: title.to_owned(), message: message.to_owned() });
        id
    }

    /// Notices not yet dismissed, oldest first.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.lock().notices.clone()
    }

    /// Remove a notice. Returns `false` if it was already gone.
    pub fn dismiss_notice(&self, id: u64) -> bool {
        let mut inner = self.lock();
        let before = inner.notices.len();
        inner.notices.retain(|n| n.id != id);
        inner.notices.len() != before
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
