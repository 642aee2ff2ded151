use super::Store;
use agenda_core::{
    context::{ConversationContext, DialogState, PendingOp},
    error::AgendaError,
    task::{TaskDraft, TaskPatch, TaskStatus},
    traits::{ContextStore, TaskStore},
};
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

/// Create an in-memory store for testing.
async fn test_store() -> Store {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await
        .unwrap();
    Store::run_migrations(&pool).await.unwrap();
    Store { pool }
}

fn dt(d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 8, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

fn draft(owner: &str, title: &str, when: NaiveDateTime) -> TaskDraft {
    TaskDraft {
        owner_id: owner.to_string(),
        title: title.to_string(),
        scheduled_date: when,
        location: None,
        participants: vec![],
    }
}

#[tokio::test]
async fn test_create_and_list() {
    let store = test_store().await;
    let task = store
        .create(&draft("551199", "Dentista", dt(25, 14)))
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.scheduled_date, dt(25, 14));

    let tasks = store.list_by_owner("551199").await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Dentista");

    // Other owners see nothing.
    assert!(store.list_by_owner("550000").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_is_ordered_by_date() {
    let store = test_store().await;
    store.create(&draft("u", "B", dt(26, 9))).await.unwrap();
    store.create(&draft("u", "A", dt(22, 9))).await.unwrap();

    let tasks = store.list_by_owner("u").await.unwrap();
    let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B"]);
}

#[tokio::test]
async fn test_update_applies_only_some_fields() {
    let store = test_store().await;
    let task = store
        .create(&draft("u", "Almoço", dt(22, 13)))
        .await
        .unwrap();

    let updated = store
        .update(
            &task.id,
            "u",
            &TaskPatch {
                scheduled_date: Some(dt(22, 12)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Almoço");
    assert_eq!(updated.scheduled_date, dt(22, 12));
}

#[tokio::test]
async fn test_update_wrong_owner_is_not_found() {
    let store = test_store().await;
    let task = store.create(&draft("u", "Almoço", dt(22, 13))).await.unwrap();

    let err = store
        .update(
            &task.id,
            "intruder",
            &TaskPatch {
                title: Some("Hijack".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AgendaError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_removes_row() {
    let store = test_store().await;
    let task = store.create(&draft("u", "Almoço", dt(22, 13))).await.unwrap();

    TaskStore::delete(&store, &task.id, "u").await.unwrap();
    assert!(store.get_by_id(&task.id, "u").await.unwrap().is_none());

    let err = TaskStore::delete(&store, &task.id, "u").await.unwrap_err();
    assert!(matches!(err, AgendaError::NotFound(_)));
}

#[tokio::test]
async fn test_context_round_trip_and_upsert() {
    let store = test_store().await;
    assert!(ContextStore::get(&store, "551199").await.unwrap().is_none());

    let mut ctx = ConversationContext::new(dt(21, 10));
    ctx.state = DialogState::CollectingInfo;
    ctx.slots.title = Some("Reunião".to_string());
    store.put("551199", &ctx).await.unwrap();

    let loaded = ContextStore::get(&store, "551199").await.unwrap().unwrap();
    assert_eq!(loaded, ctx);

    // Last writer wins.
    ctx.state = DialogState::SelectingTask;
    ctx.operation = Some(PendingOp::Delete);
    store.put("551199", &ctx).await.unwrap();
    let loaded = ContextStore::get(&store, "551199").await.unwrap().unwrap();
    assert_eq!(loaded.state, DialogState::SelectingTask);

    ContextStore::delete(&store, "551199").await.unwrap();
    assert!(ContextStore::get(&store, "551199").await.unwrap().is_none());
}
