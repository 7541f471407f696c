//! Sync coordinator — pushes local edits to the backend.
//!
//! DESIGN
//! ======
//! Geometry and content use different delivery rules:
//! - positions and sizes are committed once per gesture as a spawned task.
//!   The caller gets the `JoinHandle` (and may drop it); a failed write is
//!   logged and never rolled back, so the optimistic local geometry stays on
//!   screen until the next full load.
//! - field edits go through [`NoteStore::update`] and the caller awaits the
//!   outcome, so the editor can report success or failure.

use std::sync::Arc;

use canvas::engine::Action;
use canvas::note::{CanvasId, Note, NoteId, NotePatch, PositionUpdate, SizeUpdate};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::remote::{RemoteError, RemoteStore};
use crate::store::NoteStore;

#[derive(Clone)]
pub struct SyncCoordinator {
    remote: Arc<dyn RemoteStore>,
    store: NoteStore,
}

impl SyncCoordinator {
    #[must_use]
    pub fn new(remote: Arc<dyn RemoteStore>, store: NoteStore) -> Self {
        Self { remote, store }
    }

    /// Send final note positions in one batched call.
    ///
    /// Returns `None` if there is nothing to send or no runtime to run on.
    pub fn commit_positions(&self, canvas: CanvasId, updates: Vec<PositionUpdate>) -> Option<JoinHandle<()>> {
        if updates.is_empty() {
            return None;
        }
        let remote = Arc::clone(&self.remote);
        spawn_commit("positions", async move {
            if let Err(e) = remote.patch_positions(canvas, &updates).await {
                log_commit_failure(&e, "positions", canvas, updates.len());
            }
        })
    }

    /// Send final note sizes in one batched call.
    pub fn commit_sizes(&self, canvas: CanvasId, updates: Vec<SizeUpdate>) -> Option<JoinHandle<()>> {
        if updates.is_empty() {
            return None;
        }
        let remote = Arc::clone(&self.remote);
        spawn_commit("sizes", async move {
            if let Err(e) = remote.patch_sizes(canvas, &updates).await {
                log_commit_failure(&e, "sizes", canvas, updates.len());
            }
        })
    }

    /// Apply a field edit and wait for the backend's verdict.
    ///
    /// # Errors
    ///
    /// Returns the remote error; the local note keeps its pre-edit content.
    pub async fn commit_field_edit(&self, id: NoteId, patch: &NotePatch) -> Result<Option<Note>, RemoteError> {
        self.store.update(id, patch).await
    }

    /// Dispatch the commit actions a gesture produced. Other actions are
    /// for the host and are ignored here.
    pub fn dispatch(&self, canvas: Option<CanvasId>, actions: &[Action]) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();
        for action in actions {
            let handle = match (action, canvas) {
                (Action::CommitPositions(updates), Some(canvas)) => self.commit_positions(canvas, updates.clone()),
                (Action::CommitSizes(updates), Some(canvas)) => self.commit_sizes(canvas, updates.clone()),
                (Action::CommitPositions(_) | Action::CommitSizes(_), None) => {
                    debug!("no active canvas; geometry commit skipped");
                    None
                }
                _ => None,
            };
            handles.extend(handle);
        }
        handles
    }
}

fn spawn_commit<F>(what: &'static str, task: F) -> Option<JoinHandle<()>>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => Some(handle.spawn(task)),
        Err(e) => {
            warn!(error = %e, what, "no async runtime; geometry commit dropped");
            None
        }
    }
}

fn log_commit_failure(e: &RemoteError, what: &'static str, canvas: CanvasId, count: usize) {
    if e.is_transport() {
        warn!(error = %e, what, canvas_id = %canvas, count, "geometry commit failed (transport); keeping local geometry");
    } else {
        warn!(error = %e, what, canvas_id = %canvas, count, "geometry commit rejected; keeping local geometry");
    }
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
