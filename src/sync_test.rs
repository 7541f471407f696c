#![allow(clippy::float_cmp)]

use canvas::note::{Geometry, NoteContent};

use super::*;
use crate::remote::mock::{MockRemote, Op, make_note};

fn setup() -> (Arc<MockRemote>, NoteStore, SyncCoordinator, CanvasId) {
    let remote = Arc::new(MockRemote::new());
    let canvas = remote.seed_canvas("Main");
    let store = NoteStore::with_seed(remote.clone(), 1);
    let sync = SyncCoordinator::new(remote.clone(), store.clone());
    (remote, store, sync, canvas)
}

// =========================================================================
// geometry commits
// =========================================================================

#[tokio::test]
async fn commit_positions_sends_one_batch() {
    let (remote, _store, sync, canvas) = setup();
    let id = uuid::Uuid::new_v4();
    let handle = sync.commit_positions(canvas, vec![PositionUpdate { id, x: 5.0, y: 6.0 }]).unwrap();
    handle.await.unwrap();
    assert_eq!(remote.position_batches(), vec![vec![PositionUpdate { id, x: 5.0, y: 6.0 }]]);
}

#[tokio::test]
async fn commit_sizes_sends_one_batch() {
    let (remote, _store, sync, canvas) = setup();
    let id = uuid::Uuid::new_v4();
    sync.commit_sizes(canvas, vec![SizeUpdate { id, width: 120.0, height: 90.0 }]).unwrap().await.unwrap();
    assert_eq!(remote.size_batches(), vec![vec![SizeUpdate { id, width: 120.0, height: 90.0 }]]);
}

#[tokio::test]
async fn empty_batch_is_not_sent() {
    let (remote, _store, sync, canvas) = setup();
    assert!(sync.commit_positions(canvas, Vec::new()).is_none());
    assert!(sync.commit_sizes(canvas, Vec::new()).is_none());
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn failed_position_commit_keeps_optimistic_geometry() {
    let (remote, store, sync, canvas) = setup();
    let note = make_note(NoteContent::text("a", "b"), 10.0, 10.0, 200.0, 150.0);
    remote.seed_note(canvas, note.clone());
    store.load(canvas).await;
    remote.fail(Op::PatchPositions);

    store.mutate_geometry(&note.id, |g| Geometry { x: 300.0, y: 250.0, ..g });
    sync.commit_positions(canvas, vec![PositionUpdate { id: note.id, x: 300.0, y: 250.0 }])
        .unwrap()
        .await
        .unwrap();

    assert_eq!(remote.call_count(Op::PatchPositions), 1);
    let local = store.get(&note.id).unwrap();
    assert_eq!((local.x, local.y), (300.0, 250.0));
}

#[test]
fn commit_without_runtime_is_dropped() {
    let (remote, _store, sync, canvas) = setup();
    let id = uuid::Uuid::new_v4();
    assert!(sync.commit_positions(canvas, vec![PositionUpdate { id, x: 0.0, y: 0.0 }]).is_none());
    assert!(remote.calls().is_empty());
}

// =========================================================================
// dispatch
// =========================================================================

#[tokio::test]
async fn dispatch_only_spawns_commits() {
    let (remote, _store, sync, canvas) = setup();
    let id = uuid::Uuid::new_v4();
    let actions = vec![
        Action::CaptureEvent,
        Action::RenderNeeded,
        Action::CommitSizes(vec![SizeUpdate { id, width: 100.0, height: 80.0 }]),
        Action::SetCursor("default".into()),
    ];
    let handles = sync.dispatch(Some(canvas), &actions);
    assert_eq!(handles.len(), 1);
    for h in handles {
        h.await.unwrap();
    }
    assert_eq!(remote.calls(), vec![Op::PatchSizes]);
}

#[tokio::test]
async fn dispatch_without_canvas_sends_nothing() {
    let (remote, _store, sync, _canvas) = setup();
    let id = uuid::Uuid::new_v4();
    let actions = vec![Action::CommitPositions(vec![PositionUpdate { id, x: 1.0, y: 1.0 }])];
    assert!(sync.dispatch(None, &actions).is_empty());
    assert!(remote.calls().is_empty());
}

// =========================================================================
// field edits
// =========================================================================

#[tokio::test]
async fn field_edit_success_returns_server_note() {
    let (remote, store, sync, canvas) = setup();
    let note = make_note(NoteContent::audio("uploads/a.ogg"), 0.0, 0.0, 250.0, 100.0);
    remote.seed_note(canvas, note.clone());
    store.load(canvas).await;

    let patch = NotePatch { transcript: Some("hello".into()), ..NotePatch::default() };
    let saved = sync.commit_field_edit(note.id, &patch).await.unwrap().unwrap();
    assert_eq!(saved.content, NoteContent::Audio { file_path: "uploads/a.ogg".into(), transcript: Some("hello".into()) });
    assert_eq!(store.get(&note.id), Some(saved));
}

#[tokio::test]
async fn field_edit_failure_rolls_back() {
    let (remote, store, sync, canvas) = setup();
    let note = make_note(NoteContent::text("Keep", "me"), 0.0, 0.0, 200.0, 150.0);
    remote.seed_note(canvas, note.clone());
    store.load(canvas).await;
    remote.fail(Op::UpdateNote);

    let patch = NotePatch { title: Some("Lost".into()), ..NotePatch::default() };
    assert!(sync.commit_field_edit(note.id, &patch).await.is_err());
    assert_eq!(store.get(&note.id), Some(note));
}
