//! Integration tests for the effects runner against a scripted backend.
//!
//! Tests cover:
//! - Switch-to-latest loads, including a result queued just before it was superseded
//! - Failure actions and their notifications
//! - Creates that succeed while a sibling fails
//! - Writes to one record applied in dispatch order
//! - An update settling for a record that is gone

mod common;

use std::{sync::Arc, time::Duration};

use common::*;
use time::macros::{date, datetime};
use tokio::sync::{Notify, mpsc};

fn project(name: &str) -> Project {
    Project {
        id: ProjectId::new_v4(),
        name: name.into(),
        description: String::new(),
        status: ProjectStatus::Planning,
        priority: Priority::Low,
        start_date: date!(2024-05-01),
        end_date: None,
        budget: None,
        spent: None,
        progress: 0,
        owner_id: MemberId::new_v4(),
        owner_name: "John Doe".into(),
        team_members: vec![],
        created_at: datetime!(2024-05-01 9:00 UTC),
        updated_at: datetime!(2024-05-01 9:00 UTC),
        tags: vec![],
    }
}

fn scripted_store(backend: ScriptedBackend) -> Store {
    Store::new(AppState::default(), StoreConfig::default(), |_| backend)
}

fn store_with_project(original: &Project, backend: ScriptedBackend) -> Store {
    let initial = AppState {
        projects: projectflow::core::EntityState::with_records([original.clone()]),
        ..Default::default()
    };
    Store::new(initial, StoreConfig::default(), |_| backend)
}

fn renamed(original: &Project, name: &str) -> Project {
    Project {
        name: name.into(),
        ..original.clone()
    }
}

#[tokio::test(start_paused = true)]
async fn test_latest_load_wins() -> anyhow::Result<()> {
    // 1. The first load is slow and the second fast
    let backend = ScriptedBackend {
        projects: ScriptedService::default()
            .load_after(Duration::from_millis(500), Ok(vec![project("Stale")]))
            .load_after(Duration::from_millis(100), Ok(vec![project("Fresh")])),
        ..Default::default()
    };
    let store = scripted_store(backend);
    let handle = store.handle();

    // 2. Fire the second load while the first is in flight
    handle.dispatch(EntityAction::<Project>::Load);
    tokio::time::sleep(Duration::from_millis(10)).await;
    handle.dispatch(EntityAction::<Project>::Load);
    handle.settled().await;

    // 3. Only the newer result is applied
    let names: Vec<_> = handle
        .select(select_all::<Project>)
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, ["Fresh"]);
    assert!(!handle.state().projects.loading);

    // 4. Nothing else lands later
    tokio::time::sleep(Duration::from_secs(1)).await;
    handle.settled().await;
    assert_eq!(handle.select(select_total::<Project>), 1);

    store.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_load_failure_is_notified_once() -> anyhow::Result<()> {
    let backend = ScriptedBackend {
        tasks: ScriptedService::default().load_after(
            Duration::from_millis(100),
            Err(ServiceError::Unavailable("connection reset".into())),
        ),
        ..Default::default()
    };
    let store = scripted_store(backend);
    let handle = store.handle();
    let mut notifications = handle.notifications();

    handle.dispatch(EntityAction::<Task>::Load);
    handle.settled().await;

    let state = handle.state();
    assert!(!state.tasks.loading);
    assert_eq!(
        state.tasks.error.as_deref(),
        Some("Server Error: connection reset")
    );

    let notice = notifications.try_recv()?;
    assert_eq!(notice.level, NotificationLevel::Error);
    assert_eq!(notice.kind.label(), "Task");
    assert!(notifications.try_recv().is_err());

    store.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_creates_complete_independently() -> anyhow::Result<()> {
    // 1. The first create is rejected, the second goes through
    let backend = ScriptedBackend {
        users: ScriptedService::default()
            .fail_next(ServiceError::Rejected("email already taken".into())),
        ..Default::default()
    };
    let store = scripted_store(backend);
    let handle = store.handle();
    let mut notifications = handle.notifications();

    handle.dispatch(EntityAction::<User>::Create(make_new_user("Ada")));
    handle.dispatch(EntityAction::<User>::Create(make_new_user("Grace")));
    handle.settled().await;

    // 2. One record landed and one failure was reported
    assert_eq!(handle.select(select_total::<User>), 1);
    let notice = notifications.try_recv()?;
    assert_eq!(notice.message, "Bad Request: email already taken");
    assert!(notifications.try_recv().is_err());

    store.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_rejected_update_keeps_record() -> anyhow::Result<()> {
    let original = project("Apollo");
    let store = store_with_project(&original, ScriptedBackend::default());
    let handle = store.handle();

    let mut update = ProjectUpdate::new(original.id);
    update.name = Some("Renamed".into());
    handle.dispatch(EntityAction::<Project>::Update(update));
    handle.settled().await;

    let state = handle.state();
    assert_eq!(state.projects.store.get(&original.id), Some(&original));
    assert!(state.projects.error.is_some());

    store.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_result_queued_before_newer_load_is_dropped() -> anyhow::Result<()> {
    // 1. The first load answers on demand, the second after a short delay
    let gate = Arc::new(Notify::new());
    let backend = ScriptedBackend {
        projects: ScriptedService::default()
            .load_when(Arc::clone(&gate), Ok(vec![project("Stale")]))
            .load_after(Duration::from_millis(50), Ok(vec![project("Fresh")])),
        ..Default::default()
    };
    let store = scripted_store(backend);
    let handle = store.handle();

    let (tx, mut seen) = mpsc::unbounded_channel();
    let _subscription = handle.subscribe(
        |state: &AppState| {
            state
                .projects
                .store
                .all()
                .map(|p| p.name.clone())
                .collect::<Vec<_>>()
        },
        move |names| {
            let _ = tx.send(names.clone());
        },
    );

    // 2. The first load is in flight
    handle.dispatch(EntityAction::<Project>::Load);
    tokio::time::sleep(Duration::from_millis(10)).await;

    // 3. Its result is released in the same tick the newer load is dispatched
    gate.notify_one();
    handle.dispatch(EntityAction::<Project>::Load);
    handle.settled().await;

    // 4. Only the newer result was ever published
    let names: Vec<_> = handle
        .select(select_all::<Project>)
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, ["Fresh"]);
    assert!(!handle.state().projects.loading);

    tokio::task::yield_now().await;
    while let Ok(names) = seen.try_recv() {
        assert!(!names.iter().any(|name| name == "Stale"), "published {names:?}");
    }

    store.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_writes_to_one_record_apply_in_dispatch_order() -> anyhow::Result<()> {
    // 1. The first rename is slow, the second fast
    let original = project("Apollo");
    let backend = ScriptedBackend {
        projects: ScriptedService::default()
            .update_after(Duration::from_millis(500), Ok(renamed(&original, "first")))
            .update_after(Duration::from_millis(50), Ok(renamed(&original, "second"))),
        ..Default::default()
    };
    let store = store_with_project(&original, backend);
    let handle = store.handle();
    let name = |handle: &StoreHandle| {
        handle.select(|state| state.projects.store.get(&original.id).map(|p| p.name.clone()))
    };

    // 2. Dispatch both renames back to back
    for next in ["first", "second"] {
        let mut update = ProjectUpdate::new(original.id);
        update.name = Some(next.into());
        handle.dispatch(EntityAction::<Project>::Update(update));
    }

    // 3. The second waits for the first instead of overtaking it
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(name(&handle).as_deref(), Some("Apollo"));

    // 4. Dispatch order decides the final value
    handle.settled().await;
    assert_eq!(name(&handle).as_deref(), Some("second"));
    assert_eq!(handle.state().projects.error, None);

    store.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_update_for_vanished_record_is_notified() -> anyhow::Result<()> {
    // 1. The update settles after a load that no longer returns the record
    let original = project("Apollo");
    let backend = ScriptedBackend {
        projects: ScriptedService::default()
            .update_after(Duration::from_millis(100), Ok(renamed(&original, "Renamed")))
            .load_after(Duration::from_millis(10), Ok(vec![])),
        ..Default::default()
    };
    let store = store_with_project(&original, backend);
    let handle = store.handle();
    let mut notifications = handle.notifications();

    let mut update = ProjectUpdate::new(original.id);
    update.name = Some("Renamed".into());
    handle.dispatch(EntityAction::<Project>::Update(update));
    handle.dispatch(EntityAction::<Project>::Load);
    handle.settled().await;

    // 2. The record stays gone and the failure is reported once
    let state = handle.state();
    assert_eq!(state.projects.store.total(), 0);
    let error = state.projects.error.clone().unwrap_or_default();
    assert!(error.contains("not found"), "unexpected error: {error}");

    let notice = notifications.try_recv()?;
    assert_eq!(notice.level, NotificationLevel::Warning);
    assert_eq!(notice.message, error);
    assert!(notifications.try_recv().is_err());

    store.shutdown().await;
    Ok(())
}
