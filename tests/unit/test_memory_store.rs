//! In-memory diagram store tests.

use chrono::{Duration, Utc};
use diagram_gen_api::models::{DiagramRecord, DiagramStyle, NewDiagram, SharingUpdate};
use diagram_gen_api::storage::{DiagramStore, InMemoryDiagramStore, StorageError};
use uuid::Uuid;

fn new_diagram(prompt: &str) -> NewDiagram {
    NewDiagram {
        prompt: prompt.to_string(),
        style: DiagramStyle::Aws,
        diagram_data: "graph TD\n  A --> B".to_string(),
    }
}

fn aged_record(user_id: Uuid, prompt: &str, minutes_ago: i64) -> DiagramRecord {
    let mut record = DiagramRecord::new(user_id, new_diagram(prompt));
    record.created_at = Utc::now() - Duration::minutes(minutes_ago);
    record
}

#[tokio::test]
async fn test_insert_and_get() {
    let store = InMemoryDiagramStore::new();
    let user_id = Uuid::new_v4();

    let saved = store.insert(user_id, new_diagram("first")).await.unwrap();
    let loaded = store.get(saved.id).await.unwrap().unwrap();

    assert_eq!(loaded, saved);
    assert_eq!(loaded.user_id, user_id);
    assert_eq!(loaded.style, DiagramStyle::Aws);
    assert!(!loaded.is_public);
    assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_is_newest_first_and_limited() {
    let store = InMemoryDiagramStore::new();
    let user_id = Uuid::new_v4();
    store.put(aged_record(user_id, "oldest", 30)).await;
    store.put(aged_record(user_id, "middle", 20)).await;
    store.put(aged_record(user_id, "newest", 10)).await;
    store.put(aged_record(Uuid::new_v4(), "someone else", 5)).await;

    let all = store.list_for_user(user_id, 20).await.unwrap();
    let prompts: Vec<&str> = all.iter().map(|r| r.prompt.as_str()).collect();
    assert_eq!(prompts, vec!["newest", "middle", "oldest"]);

    let limited = store.list_for_user(user_id, 2).await.unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].prompt, "newest");
}

#[tokio::test]
async fn test_update_sharing_by_owner() {
    let store = InMemoryDiagramStore::new();
    let user_id = Uuid::new_v4();
    let saved = store.insert(user_id, new_diagram("share me")).await.unwrap();
    let expires_at = Utc::now() + Duration::days(7);

    let updated = store
        .update_sharing(
            saved.id,
            user_id,
            SharingUpdate {
                is_public: true,
                expires_at: Some(expires_at),
            },
        )
        .await
        .unwrap();

    assert!(updated.is_public);
    assert_eq!(updated.expires_at, Some(expires_at));
    assert_eq!(updated.share_token, saved.share_token);
}

#[tokio::test]
async fn test_non_owner_mutations_are_not_found() {
    let store = InMemoryDiagramStore::new();
    let owner = Uuid::new_v4();
    let intruder = Uuid::new_v4();
    let saved = store.insert(owner, new_diagram("private")).await.unwrap();

    let update = store
        .update_sharing(
            saved.id,
            intruder,
            SharingUpdate {
                is_public: true,
                expires_at: None,
            },
        )
        .await;
    assert!(matches!(update, Err(StorageError::NotFound { .. })));

    let delete = store.delete(saved.id, intruder).await;
    assert!(matches!(delete, Err(StorageError::NotFound { .. })));

    let unchanged = store.get(saved.id).await.unwrap().unwrap();
    assert!(!unchanged.is_public);
}

#[tokio::test]
async fn test_delete_by_owner() {
    let store = InMemoryDiagramStore::new();
    let user_id = Uuid::new_v4();
    let saved = store.insert(user_id, new_diagram("short lived")).await.unwrap();

    store.delete(saved.id, user_id).await.unwrap();

    assert!(store.get(saved.id).await.unwrap().is_none());
    assert!(matches!(
        store.delete(saved.id, user_id).await,
        Err(StorageError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_find_by_share_token() {
    let store = InMemoryDiagramStore::new();
    let saved = store
        .insert(Uuid::new_v4(), new_diagram("tokened"))
        .await
        .unwrap();

    let found = store.find_by_share_token(&saved.share_token).await.unwrap();
    assert_eq!(found.map(|r| r.id), Some(saved.id));

    assert!(store.find_by_share_token("missing").await.unwrap().is_none());
}
