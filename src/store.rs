//! Note store — the local note collection for the bound canvas.
//!
//! DESIGN
//! ======
//! `NoteStore` is a cheap `Clone` handle over shared state. The lock is
//! never held across an `.await`: each remote operation collects what it
//! needs under the lock, releases it, awaits the backend, then re-locks and
//! applies the result only if it still belongs to the current binding.
//!
//! Stale responses are dropped with two guards:
//! - every `load` takes a sequence number and only the newest load for the
//!   bound canvas may apply its snapshot;
//! - `create`, `update` and `delete` apply only while the store is still
//!   bound to the canvas the request was sent for.
//!
//! ERROR HANDLING
//! ==============
//! `load` never fails: a failed fetch leaves an empty collection and is
//! logged. Write operations return the `RemoteError` and leave the local
//! collection exactly as it was before the call.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use canvas::consts::{PLACEMENT_MAX, PLACEMENT_MIN};
use canvas::doc::NoteCollection;
use canvas::note::{CanvasId, Geometry, Note, NoteContent, NoteDraft, NoteId, NotePatch, Size};
use canvas::viewport::Point;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::remote::{RemoteError, RemoteStore};

struct StoreInner {
    canvas: Option<CanvasId>,
    notes: NoteCollection,
    load_seq: u64,
    rng: StdRng,
}

#[derive(Clone)]
pub struct NoteStore {
    remote: Arc<dyn RemoteStore>,
    inner: Arc<Mutex<StoreInner>>,
}

impl NoteStore {
    #[must_use]
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self::with_rng(remote, StdRng::from_os_rng())
    }

    /// Store with deterministic placement, for tests and replays.
    #[must_use]
    pub fn with_seed(remote: Arc<dyn RemoteStore>, seed: u64) -> Self {
        Self::with_rng(remote, StdRng::seed_from_u64(seed))
    }

    fn with_rng(remote: Arc<dyn RemoteStore>, rng: StdRng) -> Self {
        let inner = StoreInner { canvas: None, notes: NoteCollection::new(), load_seq: 0, rng };
        Self { remote, inner: Arc::new(Mutex::new(inner)) }
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Canvas the collection currently belongs to.
    #[must_use]
    pub fn canvas(&self) -> Option<CanvasId> {
        self.lock().canvas
    }

    // --- Loading ---

    /// Bind to `canvas` and replace the collection with its remote snapshot.
    ///
    /// Switching to a different canvas empties the collection immediately so
    /// the previous canvas's notes are never shown under the new binding.
    /// Returns `false` if the response was dropped because a newer load or
    /// a rebind happened while it was in flight.
    pub async fn load(&self, canvas: CanvasId) -> bool {
        let seq = self.bind(canvas);
        self.fetch(canvas, seq).await
    }

    /// First half of [`load`](Self::load): bind to `canvas` and return the
    /// load sequence number that [`fetch`](Self::fetch) must present.
    pub fn bind(&self, canvas: CanvasId) -> u64 {
        let mut inner = self.lock();
        inner.load_seq += 1;
        if inner.canvas != Some(canvas) {
            inner.notes.clear();
        }
        inner.canvas = Some(canvas);
        inner.load_seq
    }

    /// Second half of [`load`](Self::load): fetch the snapshot and apply it
    /// unless a newer bind or load superseded `seq`.
    pub async fn fetch(&self, canvas: CanvasId, seq: u64) -> bool {
        let result = self.remote.list_notes(canvas).await;

        let mut inner = self.lock();
        if inner.load_seq != seq || inner.canvas != Some(canvas) {
            debug!(canvas_id = %canvas, seq, latest = inner.load_seq, "dropping stale note snapshot");
            return false;
        }
        match result {
            Ok(notes) => {
                info!(canvas_id = %canvas, count = notes.len(), "notes loaded");
                inner.notes.load_snapshot(notes);
            }
            Err(e) => {
                warn!(error = %e, canvas_id = %canvas, "note load failed; showing empty canvas");
                inner.notes.clear();
            }
        }
        true
    }

    /// Unbind from any canvas and empty the collection.
    ///
    /// Any load still in flight is invalidated.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.load_seq += 1;
        inner.canvas = None;
        inner.notes.clear();
    }

    // --- Remote writes ---

    /// Create a note of `content`'s kind at a random position with the
    /// kind's default size.
    ///
    /// Returns `Ok(None)` when no canvas is bound.
    ///
    /// # Errors
    ///
    /// Returns the remote error if the backend rejects the note; nothing is
    /// added locally in that case.
    pub async fn create(&self, content: NoteContent) -> Result<Option<Note>, RemoteError> {
        let size = content.kind().default_size();
        self.create_sized(content, size).await
    }

    /// Like [`create`](Self::create) with an explicit initial size.
    ///
    /// # Errors
    ///
    /// Returns the remote error if the backend rejects the note.
    pub async fn create_sized(&self, content: NoteContent, size: Size) -> Result<Option<Note>, RemoteError> {
        let (canvas, draft) = {
            let mut inner = self.lock();
            let Some(canvas) = inner.canvas else {
                return Ok(None);
            };
            let origin = random_origin(&mut inner.rng);
            (canvas, NoteDraft::new(content, origin, size))
        };

        let note = self.remote.create_note(canvas, &draft).await.inspect_err(|e| {
            warn!(error = %e, canvas_id = %canvas, kind = %draft.content.kind(), "note create failed");
        })?;

        let mut inner = self.lock();
        if inner.canvas == Some(canvas) {
            inner.notes.push(note.clone());
        } else {
            debug!(canvas_id = %canvas, note_id = %note.id, "created note belongs to a previous canvas");
        }
        Ok(Some(note))
    }

    /// Merge `patch` into the local note, send the full note, and replace it
    /// with the backend's representation on success.
    ///
    /// Returns `Ok(None)` when no canvas is bound or the note is not in the
    /// collection.
    ///
    /// # Errors
    ///
    /// Returns the remote error; the local note is left unchanged.
    pub async fn update(&self, id: NoteId, patch: &NotePatch) -> Result<Option<Note>, RemoteError> {
        let (canvas, merged) = {
            let inner = self.lock();
            let Some(canvas) = inner.canvas else {
                return Ok(None);
            };
            let Some(current) = inner.notes.get(&id) else {
                return Ok(None);
            };
            (canvas, current.merged(patch))
        };

        let saved = self.remote.update_note(canvas, &merged).await.inspect_err(|e| {
            warn!(error = %e, canvas_id = %canvas, note_id = %id, "note update failed");
        })?;

        let mut inner = self.lock();
        if inner.canvas == Some(canvas) && !inner.notes.replace(saved.clone()) {
            debug!(note_id = %id, "updated note was removed locally in the meantime");
        }
        Ok(Some(saved))
    }

    /// Delete a note remotely, then locally once the backend confirms.
    ///
    /// Returns `Ok(false)` without a remote call when no canvas is bound or
    /// the note is not in the collection.
    ///
    /// # Errors
    ///
    /// Returns the remote error; the note stays in the collection.
    pub async fn delete(&self, id: NoteId) -> Result<bool, RemoteError> {
        let canvas = {
            let inner = self.lock();
            let Some(canvas) = inner.canvas else {
                return Ok(false);
            };
            if inner.notes.get(&id).is_none() {
                debug!(canvas_id = %canvas, note_id = %id, "delete of a note no longer on the canvas ignored");
                return Ok(false);
            }
            canvas
        };

        self.remote.delete_note(canvas, id).await.inspect_err(|e| {
            warn!(error = %e, canvas_id = %canvas, note_id = %id, "note delete failed");
        })?;

        let mut inner = self.lock();
        if inner.canvas == Some(canvas) {
            inner.notes.remove(&id);
        }
        Ok(true)
    }

    // --- Local access ---

    /// Optimistically rewrite a note's geometry. Never touches the backend.
    pub fn mutate_geometry<F>(&self, id: &NoteId, transform: F) -> Option<Geometry>
    where
        F: FnOnce(Geometry) -> Geometry,
    {
        self.lock().notes.mutate_geometry(id, transform)
    }

    /// Run `f` against the collection under the lock.
    pub fn with_notes<R>(&self, f: impl FnOnce(&NoteCollection) -> R) -> R {
        f(&self.lock().notes)
    }

    /// Run `f` against the mutable collection under the lock.
    pub fn with_notes_mut<R>(&self, f: impl FnOnce(&mut NoteCollection) -> R) -> R {
        f(&mut self.lock().notes)
    }

    #[must_use]
    pub fn get(&self, id: &NoteId) -> Option<Note> {
        self.lock().notes.get(id).cloned()
    }

    /// Copy of every note in stacking order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Note> {
        self.lock().notes.to_vec()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().notes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().notes.is_empty()
    }
}

/// Random placement inside the creation region, so notes created in quick
/// succession do not stack exactly on top of each other.
pub fn random_origin(rng: &mut impl Rng) -> Point {
    Point::new(rng.random_range(PLACEMENT_MIN..PLACEMENT_MAX), rng.random_range(PLACEMENT_MIN..PLACEMENT_MAX))
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
