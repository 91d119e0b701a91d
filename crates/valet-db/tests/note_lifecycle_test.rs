//! Note flag lifecycle and soft-delete visibility tests.

use valet_core::{
    CreateNoteRequest, Error, IndexState, IndexStore, NoteRepository, UpdateNoteRequest,
};
use valet_db::test_fixtures::TestDatabase;

fn note_req(title: &str, content: &str) -> CreateNoteRequest {
    CreateNoteRequest {
        title: title.to_string(),
        content: content.to_string(),
    }
}

#[tokio::test]
async fn created_note_is_pending_reindex_with_no_vectors() {
    let test_db = TestDatabase::new().await;
    let notes = &test_db.db.notes;

    let id = notes.create(note_req("T", "hello world")).await.unwrap();
    let note = notes.get(id).await.unwrap();

    assert_eq!(note.title, "T");
    assert_eq!(note.state, IndexState::PendingReindex);
    assert!(note.vector_ids.is_empty());
}

#[tokio::test]
async fn update_marks_note_pending_reindex_again() {
    let test_db = TestDatabase::new().await;
    let notes = &test_db.db.notes;

    let id = notes.create(note_req("T", "v1")).await.unwrap();
    notes.mark_indexed(&[(id, vec!["v1".to_string()])]).await.unwrap();
    assert_eq!(notes.get(id).await.unwrap().state, IndexState::Active);

    notes
        .update(
            id,
            UpdateNoteRequest {
                title: "T".to_string(),
                content: "v2".to_string(),
            },
        )
        .await
        .unwrap();

    let note = notes.get(id).await.unwrap();
    assert_eq!(note.state, IndexState::PendingReindex);
    assert_eq!(note.content, "v2");
    // Stale ids are kept until the index pass deletes them.
    assert_eq!(note.vector_ids, vec!["v1".to_string()]);
}

#[tokio::test]
async fn soft_deleted_note_is_invisible_to_reads_and_writes() {
    let test_db = TestDatabase::new().await;
    let notes = &test_db.db.notes;

    let id = notes.create(note_req("T", "bye")).await.unwrap();
    notes.delete(id).await.unwrap();

    assert!(matches!(notes.get(id).await, Err(Error::NoteNotFound(_))));
    assert!(notes.list().await.unwrap().is_empty());
    assert!(matches!(
        notes
            .update(
                id,
                UpdateNoteRequest {
                    title: "x".to_string(),
                    content: "y".to_string()
                }
            )
            .await,
        Err(Error::NoteNotFound(_))
    ));
    // Double delete reads as not-found, same as a truly absent id.
    assert!(matches!(notes.delete(id).await, Err(Error::NoteNotFound(_))));
    assert!(matches!(
        notes.delete(9999).await,
        Err(Error::NoteNotFound(9999))
    ));
}

#[tokio::test]
async fn pending_removal_is_excluded_from_reindex_listing() {
    let test_db = TestDatabase::new().await;
    let notes = &test_db.db.notes;

    let keep = notes.create(note_req("keep", "a")).await.unwrap();
    let drop = notes.create(note_req("drop", "b")).await.unwrap();
    notes.delete(drop).await.unwrap();

    let dirty = notes.list_pending_reindex().await.unwrap();
    assert_eq!(dirty.len(), 1);
    assert_eq!(dirty[0].id, keep);

    let doomed = notes.list_pending_removal().await.unwrap();
    assert_eq!(doomed.len(), 1);
    assert_eq!(doomed[0].id, drop);
}

#[tokio::test]
async fn purge_deletes_rows_in_bulk() {
    let test_db = TestDatabase::new().await;
    let notes = &test_db.db.notes;

    let a = notes.create(note_req("a", "1")).await.unwrap();
    let b = notes.create(note_req("b", "2")).await.unwrap();
    notes.delete(a).await.unwrap();
    notes.delete(b).await.unwrap();

    let deleted = notes.purge(&[a, b]).await.unwrap();
    assert_eq!(deleted, 2);
    assert!(notes.list_pending_removal().await.unwrap().is_empty());

    // Second purge with the same ids is a no-op.
    assert_eq!(notes.purge(&[a, b]).await.unwrap(), 0);
    assert_eq!(notes.purge(&[]).await.unwrap(), 0);
}

#[tokio::test]
async fn mark_indexed_clears_dirty_and_stores_vector_ids() {
    let test_db = TestDatabase::new().await;
    let notes = &test_db.db.notes;

    let id = notes.create(note_req("T", "hello")).await.unwrap();
    notes
        .mark_indexed(&[(id, vec!["v1".to_string(), "v2".to_string()])])
        .await
        .unwrap();

    let note = notes.get(id).await.unwrap();
    assert_eq!(note.state, IndexState::Active);
    assert_eq!(note.vector_ids, vec!["v1".to_string(), "v2".to_string()]);
}

#[tokio::test]
async fn mark_indexed_never_resurrects_a_concurrent_delete() {
    let test_db = TestDatabase::new().await;
    let notes = &test_db.db.notes;

    let id = notes.create(note_req("T", "hello")).await.unwrap();
    // Delete lands while the index pass is embedding this note.
    notes.delete(id).await.unwrap();
    notes.mark_indexed(&[(id, vec!["v1".to_string()])]).await.unwrap();

    let doomed = notes.list_pending_removal().await.unwrap();
    assert_eq!(doomed.len(), 1);
    assert_eq!(doomed[0].state, IndexState::PendingRemoval);
}
