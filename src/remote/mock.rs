//! In-memory `RemoteStore` for tests.
//!
//! Holds canvases and notes in a `Mutex`, records every call, and can be
//! told to fail individual operations or to hold a `list_notes` response
//! until the test releases it.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use canvas::note::{Canvas, CanvasId, Note, NoteDraft, NoteId, PositionUpdate, SizeUpdate};
use tokio::sync::oneshot;
use uuid::Uuid;

use super::{CanvasListEntry, MediaKind, RemoteError, RemoteStore};

/// Remote operations, used for failure switches and the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ListCanvases,
    GetCanvas,
    CreateCanvas,
    DeleteCanvas,
    ListNotes,
    CreateNote,
    UpdateNote,
    PatchPositions,
    PatchSizes,
    DeleteNote,
    Upload,
    Ocr,
    Transcribe,
}

#[derive(Default)]
struct MockState {
    canvases: Vec<Canvas>,
    notes: HashMap<CanvasId, Vec<Note>>,
    list_as_ids: bool,
    failing: HashSet<Op>,
    failing_canvas_meta: HashSet<CanvasId>,
    calls: Vec<Op>,
    position_batches: Vec<Vec<PositionUpdate>>,
    size_batches: Vec<Vec<SizeUpdate>>,
    updated: Vec<Note>,
    gates: HashMap<CanvasId, oneshot::Receiver<()>>,
    create_gate: Option<oneshot::Receiver<()>>,
    ocr_text: String,
    transcript: String,
    stamp: u64,
}

#[derive(Default)]
pub struct MockRemote {
    state: Mutex<MockState>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a canvas and return its id.
    pub fn seed_canvas(&self, name: &str) -> CanvasId {
        let mut state = self.state.lock().unwrap();
        let canvas = make_canvas(name, &mut state.stamp);
        let id = canvas.id;
        state.canvases.push(canvas);
        state.notes.entry(id).or_default();
        id
    }

    /// Store a note on `canvas` as if it had been created earlier.
    pub fn seed_note(&self, canvas: CanvasId, note: Note) {
        let mut state = self.state.lock().unwrap();
        state.notes.entry(canvas).or_default().push(note);
    }

    /// Make `list_canvases` return bare ids instead of metadata objects.
    pub fn list_canvases_as_ids(&self) {
        self.state.lock().unwrap().list_as_ids = true;
    }

    pub fn fail(&self, op: Op) {
        self.state.lock().unwrap().failing.insert(op);
    }

    pub fn succeed(&self, op: Op) {
        self.state.lock().unwrap().failing.remove(&op);
    }

    /// Make `get_canvas` fail for one canvas only.
    pub fn fail_canvas_meta(&self, id: CanvasId) {
        self.state.lock().unwrap().failing_canvas_meta.insert(id);
    }

    /// Hold the next `list_notes(canvas)` response until the sender fires.
    pub fn gate_list_notes(&self, canvas: CanvasId) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().unwrap().gates.insert(canvas, rx);
        tx
    }

    /// Hold the next `create_note` response until the sender fires.
    pub fn gate_create_note(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().unwrap().create_gate = Some(rx);
        tx
    }

    pub fn set_ocr_text(&self, text: &str) {
        self.state.lock().unwrap().ocr_text = text.to_owned();
    }

    pub fn set_transcript(&self, text: &str) {
        self.state.lock().unwrap().transcript = text.to_owned();
    }

    pub fn calls(&self) -> Vec<Op> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, op: Op) -> usize {
        self.state.lock().unwrap().calls.iter().filter(|c| **c == op).count()
    }

    pub fn position_batches(&self) -> Vec<Vec<PositionUpdate>> {
        self.state.lock().unwrap().position_batches.clone()
    }

    pub fn size_batches(&self) -> Vec<Vec<SizeUpdate>> {
        self.state.lock().unwrap().size_batches.clone()
    }

    /// Full notes received by `update_note`, in call order.
    pub fn updated_notes(&self) -> Vec<Note> {
        self.state.lock().unwrap().updated.clone()
    }

    /// Notes currently stored remotely for `canvas`.
    pub fn remote_notes(&self, canvas: CanvasId) -> Vec<Note> {
        self.state.lock().unwrap().notes.get(&canvas).cloned().unwrap_or_default()
    }

    fn begin(&self, op: Op) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(op);
        if state.failing.contains(&op) {
            return Err(RemoteError::Request(format!("simulated {op:?} failure")));
        }
        Ok(())
    }
}

fn make_canvas(name: &str, stamp: &mut u64) -> Canvas {
    *stamp += 1;
    Canvas {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        created_at: format!("server-ts-{stamp}"),
        updated_at: format!("server-ts-{stamp}"),
    }
}

/// Build a stored note with the given geometry.
pub fn make_note(content: canvas::note::NoteContent, x: f64, y: f64, width: f64, height: f64) -> Note {
    Note {
        id: Uuid::new_v4(),
        content,
        x,
        y,
        width: Some(width),
        height: Some(height),
        tags: Vec::new(),
        created_at: "seed".into(),
        updated_at: "seed".into(),
    }
}

#[async_trait]
impl RemoteStore for MockRemote {
    async fn list_canvases(&self) -> Result<Vec<CanvasListEntry>, RemoteError> {
        self.begin(Op::ListCanvases)?;
        let state = self.state.lock().unwrap();
        Ok(state
            .canvases
            .iter()
            .map(|c| if state.list_as_ids { CanvasListEntry::Id(c.id) } else { CanvasListEntry::Meta(c.clone()) })
            .collect())
    }

    async fn get_canvas(&self, id: CanvasId) -> Result<Canvas, RemoteError> {
        self.begin(Op::GetCanvas)?;
        let state = self.state.lock().unwrap();
        if state.failing_canvas_meta.contains(&id) {
            return Err(RemoteError::Response { status: 500, body: "boom".into() });
        }
        state
            .canvases
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(RemoteError::Response { status: 404, body: "Canvas not found".into() })
    }

    async fn create_canvas(&self, name: &str) -> Result<Canvas, RemoteError> {
        self.begin(Op::CreateCanvas)?;
        let mut state = self.state.lock().unwrap();
        let canvas = make_canvas(name, &mut state.stamp);
        state.canvases.push(canvas.clone());
        state.notes.entry(canvas.id).or_default();
        Ok(canvas)
    }

    async fn delete_canvas(&self, id: CanvasId) -> Result<(), RemoteError> {
        self.begin(Op::DeleteCanvas)?;
        let mut state = self.state.lock().unwrap();
        state.canvases.retain(|c| c.id != id);
        state.notes.remove(&id);
        Ok(())
    }

    async fn list_notes(&self, canvas: CanvasId) -> Result<Vec<Note>, RemoteError> {
        let (snapshot, gate) = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Op::ListNotes);
            let snapshot = if state.failing.contains(&Op::ListNotes) {
                Err(RemoteError::Request("simulated ListNotes failure".into()))
            } else {
                Ok(state.notes.get(&canvas).cloned().unwrap_or_default())
            };
            (snapshot, state.gates.remove(&canvas))
        };
        if let Some(gate) = gate {
            gate.await.unwrap_or_default();
        }
        snapshot
    }

    async fn create_note(&self, canvas: CanvasId, draft: &NoteDraft) -> Result<Note, RemoteError> {
        self.begin(Op::CreateNote)?;
        let gate = self.state.lock().unwrap().create_gate.take();
        if let Some(gate) = gate {
            gate.await.unwrap_or_default();
        }
        let mut state = self.state.lock().unwrap();
        state.stamp += 1;
        let stamp = format!("server-ts-{}", state.stamp);
        let note = Note {
            id: Uuid::new_v4(),
            content: draft.content.clone(),
            x: draft.x,
            y: draft.y,
            width: Some(draft.width),
            height: Some(draft.height),
            tags: draft.tags.clone(),
            created_at: stamp.clone(),
            updated_at: stamp,
        };
        state.notes.entry(canvas).or_default().push(note.clone());
        Ok(note)
    }

    async fn update_note(&self, canvas: CanvasId, note: &Note) -> Result<Note, RemoteError> {
        self.begin(Op::UpdateNote)?;
        let mut state = self.state.lock().unwrap();
        state.stamp += 1;
        let mut stored = note.clone();
        stored.updated_at = format!("server-ts-{}", state.stamp);
        state.updated.push(note.clone());
        let notes = state.notes.entry(canvas).or_default();
        match notes.iter_mut().find(|n| n.id == note.id) {
            Some(slot) => *slot = stored.clone(),
            None => return Err(RemoteError::Response { status: 404, body: "Note not found".into() }),
        }
        Ok(stored)
    }

    async fn patch_positions(&self, _canvas: CanvasId, updates: &[PositionUpdate]) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Op::PatchPositions);
        state.position_batches.push(updates.to_vec());
        if state.failing.contains(&Op::PatchPositions) {
            return Err(RemoteError::Request("simulated PatchPositions failure".into()));
        }
        Ok(())
    }

    async fn patch_sizes(&self, _canvas: CanvasId, updates: &[SizeUpdate]) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Op::PatchSizes);
        state.size_batches.push(updates.to_vec());
        if state.failing.contains(&Op::PatchSizes) {
            return Err(RemoteError::Request("simulated PatchSizes failure".into()));
        }
        Ok(())
    }

    async fn delete_note(&self, canvas: CanvasId, note: NoteId) -> Result<(), RemoteError> {
        self.begin(Op::DeleteNote)?;
        let mut state = self.state.lock().unwrap();
        if let Some(notes) = state.notes.get_mut(&canvas) {
            notes.retain(|n| n.id != note);
        }
        Ok(())
    }

    async fn upload_file(
        &self,
        _canvas: CanvasId,
        kind: MediaKind,
        file_name: &str,
        _bytes: Vec<u8>,
    ) -> Result<String, RemoteError> {
        self.begin(Op::Upload)?;
        Ok(format!("uploads/{}/{file_name}", kind.as_str()))
    }

    async fn ocr_existing(&self, _canvas: CanvasId, _file_path: &str, _lang: &str) -> Result<String, RemoteError> {
        self.begin(Op::Ocr)?;
        Ok(self.state.lock().unwrap().ocr_text.clone())
    }

    async fn transcribe_existing(
        &self,
        _canvas: CanvasId,
        _file_path: &str,
        _lang: &str,
    ) -> Result<String, RemoteError> {
        self.begin(Op::Transcribe)?;
        Ok(self.state.lock().unwrap().transcript.clone())
    }
}
