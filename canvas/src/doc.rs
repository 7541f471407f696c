//! The in-memory note collection for the active canvas.
//!
//! Notes are kept in arrival order, which doubles as stacking order: later
//! notes are drawn over earlier ones and win hit tests. The collection is a
//! plain cache; it never talks to the network. Data flows in from remote
//! snapshots and confirmed writes, and from the gesture engine as local
//! geometry mutations.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use crate::note::{Geometry, Note, NoteId};

/// Ordered in-memory store of notes.
#[derive(Debug, Clone, Default)]
pub struct NoteCollection {
    notes: Vec<Note>,
}

impl NoteCollection {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self { notes: Vec::new() }
    }

    /// Replace all notes with a full snapshot, keeping its order.
    pub fn load_snapshot(&mut self, notes: Vec<Note>) {
        self.notes = notes;
    }

    /// Append a note on top of the stack. An existing note with the same id
    /// is replaced in place instead.
    pub fn push(&mut self, note: Note) {
        if !self.replace(note.clone()) {
            self.notes.push(note);
        }
    }

    /// Replace the note with the same id. Returns false if it is not present.
    pub fn replace(&mut self, note: Note) -> bool {
        let Some(slot) = self.notes.iter_mut().find(|n| n.id == note.id) else {
            return false;
        };
        *slot = note;
        true
    }

    /// Remove a note by id, returning it if it was present.
    pub fn remove(&mut self, id: &NoteId) -> Option<Note> {
        let index = self.notes.iter().position(|n| n.id == *id)?;
        Some(self.notes.remove(index))
    }

    /// Return a reference to a note by id.
    #[must_use]
    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == *id)
    }

    /// Apply a geometry transform to one note, locally.
    ///
    /// Returns the geometry that was written, or `None` if the note does not exist.
    pub fn mutate_geometry<F>(&mut self, id: &NoteId, transform: F) -> Option<Geometry>
    where
        F: FnOnce(Geometry) -> Geometry,
    {
        let note = self.notes.iter_mut().find(|n| n.id == *id)?;
        let next = transform(note.geometry());
        note.set_geometry(next);
        Some(next)
    }

    /// Drop every note.
    pub fn clear(&mut self) {
        self.notes.clear();
    }

    /// Notes in stacking order, bottom first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Note> {
        self.notes.iter()
    }

    /// Clone the notes out, bottom first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Note> {
        self.notes.clone()
    }

    /// Number of notes currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Returns `true` if the collection holds no notes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}
