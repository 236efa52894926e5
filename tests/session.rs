mod common;

use common::{definition, MemoryStore};

use game_inventory::{
    models::{CheckedKey, Photo},
    realtime::RealtimeHub,
    session::{InventorySession, NoGameSelected, SessionRegistry},
    store::{GameStore, NotFound},
};

use std::{
    sync::{atomic::Ordering, Arc},
    time::Duration,
};

use axum::http::StatusCode;

const DEBOUNCE: Duration = Duration::from_millis(1000);

async fn store_with(items: &[&str]) -> (Arc<MemoryStore>, i64) {
    let store = Arc::new(MemoryStore::default());
    let game = store
        .insert_game(&definition("Tokaido", items), "demo_user")
        .await
        .unwrap();

    return (store, game.id);
}

fn photo(position: usize, name: &str) -> Photo {
    return Photo::uploaded(
        position,
        format!("https://res.cloudinary.com/demo/image/upload/{name}.jpg"),
        format!("boardgames/{name}"),
    );
}

#[tokio::test]
async fn operations_without_a_selection_are_conflicts() {
    let (store, _) = store_with(&["1 plateau"]).await;
    let mut session = InventorySession::new(store, DEBOUNCE);

    let err = session.toggle_item(0).await.unwrap_err();

    assert!(err.downcast_ref::<NoGameSelected>().is_some());
    assert_eq!(err.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn selecting_an_unknown_game_is_not_found() {
    let (store, _) = store_with(&["1 plateau"]).await;
    let mut session = InventorySession::new(store, DEBOUNCE);

    let err = session.select(404).await.unwrap_err();

    assert!(err.downcast_ref::<NotFound>().is_some());
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
    assert_eq!(session.selected_id(), None);
}

#[tokio::test]
async fn toggles_are_persisted() {
    let (store, id) = store_with(&["1 plateau", "2 dés"]).await;
    let mut session = InventorySession::new(store.clone(), DEBOUNCE);
    session.select(id).await.unwrap();

    assert!(session.toggle_item(1).await.unwrap());

    let stored = store.game(id).unwrap();
    assert!(stored.checked_items.is_checked(&CheckedKey::Item(1)));
    assert_eq!(session.checklist().unwrap().progress(), 50);
}

#[tokio::test]
async fn failed_write_keeps_the_previous_checklist() {
    let (store, id) = store_with(&["1 plateau", "2 dés"]).await;
    let mut session = InventorySession::new(store.clone(), DEBOUNCE);
    session.select(id).await.unwrap();
    session.toggle_item(0).await.unwrap();

    store.fail(true);
    let err = session.toggle_item(1).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let checklist = session.checklist().unwrap();
    assert!(checklist.is_item_checked(0));
    assert!(!checklist.is_item_checked(1));
    assert_eq!(checklist.progress(), 50);

    let err = session.reset().await.unwrap_err();
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(session.checklist().unwrap().is_item_checked(0));
}

#[tokio::test]
async fn group_toggle_walkthrough() {
    let (store, id) = store_with(&["8 cartes Glace", "11 cartes Chapeau", "1 plateau"]).await;
    let mut session = InventorySession::new(store.clone(), DEBOUNCE);
    session.select(id).await.unwrap();

    session.toggle_item(0).await.unwrap();
    let progress = session.checklist().unwrap().group_progress();
    assert_eq!((progress[0].checked, progress[0].total), (8, 19));

    // partially checked groups get completed first
    assert!(session.toggle_group("carte").await.unwrap());
    let checklist = session.checklist().unwrap();
    assert!(checklist.is_item_checked(0) && checklist.is_item_checked(1));
    assert!(!checklist.is_item_checked(2));
    assert!(checklist.group_progress()[0].complete);

    assert!(!session.toggle_group("carte").await.unwrap());
    assert_eq!(session.checklist().unwrap().progress(), 0);

    let stored = store.game(id).unwrap();
    assert!(!stored.checked_items.is_checked(&CheckedKey::Item(1)));

    let err = session.toggle_group("plateau").await.unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn photos_drive_the_item_flag() {
    let (store, id) = store_with(&["2 dés"]).await;
    let mut session = InventorySession::new(store.clone(), DEBOUNCE);
    session.select(id).await.unwrap();

    let (a, b) = (photo(0, "a"), photo(1, "b"));
    session
        .add_photos(0, vec![a.clone(), b.clone()])
        .await
        .unwrap();

    session.toggle_photo(0, &a.id).await.unwrap();
    assert!(!session.checklist().unwrap().is_item_checked(0));

    session.toggle_photo(0, &b.id).await.unwrap();
    assert!(session.checklist().unwrap().is_item_checked(0));

    // removing a photo leaves the rest deciding
    session.remove_photo(0, &b.id).await.unwrap();
    let stored = store.game(id).unwrap();
    assert_eq!(stored.item_details[&0usize].len(), 1);
    assert!(!stored
        .checked_items
        .is_checked(&CheckedKey::photo(0, b.id.as_str())));
    assert!(stored.checked_items.is_checked(&CheckedKey::Item(0)));
}

#[tokio::test]
async fn rotation_is_saved_immediately() {
    let (store, id) = store_with(&["2 dés"]).await;
    let mut session = InventorySession::new(store.clone(), DEBOUNCE);
    session.select(id).await.unwrap();

    let a = photo(0, "a");
    session.add_photos(0, vec![a.clone()]).await.unwrap();

    let degrees = session
        .rotate_photo(0, &a.id, game_inventory::models::RotateDirection::Left)
        .await
        .unwrap();

    assert_eq!(degrees, 270);
    assert_eq!(store.game(id).unwrap().photo_rotations[&a.id], 270);
}

#[tokio::test(start_paused = true)]
async fn quick_renames_are_saved_once() {
    let (store, id) = store_with(&["2 dés"]).await;
    let mut session = InventorySession::new(store.clone(), DEBOUNCE);
    session.select(id).await.unwrap();

    let a = photo(0, "a");
    session.add_photos(0, vec![a.clone()]).await.unwrap();

    session.rename_photo(0, &a.id, "dé ro".to_string()).unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    session.rename_photo(0, &a.id, "dé rouge".to_string()).unwrap();

    assert_eq!(session.checklist().unwrap().photos(0)[0].name, "dé rouge");
    assert_eq!(store.detail_writes.load(Ordering::SeqCst), 0);

    tokio::time::sleep(DEBOUNCE * 2).await;

    assert_eq!(store.detail_writes.load(Ordering::SeqCst), 1);
    assert_eq!(store.game(id).unwrap().item_details[&0usize][0].name, "dé rouge");
}

#[tokio::test(start_paused = true)]
async fn failed_debounced_save_is_retried_on_flush() {
    let (store, id) = store_with(&["2 dés"]).await;
    let mut session = InventorySession::new(store.clone(), DEBOUNCE);
    session.select(id).await.unwrap();

    let a = photo(0, "a");
    session.add_photos(0, vec![a.clone()]).await.unwrap();
    session.rename_photo(0, &a.id, "dé bleu".to_string()).unwrap();

    store.fail(true);
    tokio::time::sleep(DEBOUNCE * 2).await;
    assert_eq!(store.detail_writes.load(Ordering::SeqCst), 1);
    assert_eq!(store.game(id).unwrap().item_details[&0usize][0].name, "");

    store.fail(false);
    session.deselect().await.unwrap();

    assert_eq!(store.detail_writes.load(Ordering::SeqCst), 2);
    assert_eq!(store.game(id).unwrap().item_details[&0usize][0].name, "dé bleu");
}

#[tokio::test(start_paused = true)]
async fn deselecting_flushes_a_pending_rename() {
    let (store, id) = store_with(&["2 dés"]).await;
    let mut session = InventorySession::new(store.clone(), DEBOUNCE);
    session.select(id).await.unwrap();

    let a = photo(0, "a");
    session.add_photos(0, vec![a.clone()]).await.unwrap();
    session.rename_photo(0, &a.id, "boîte".to_string()).unwrap();

    session.deselect().await.unwrap();
    assert_eq!(store.game(id).unwrap().item_details[&0usize][0].name, "boîte");

    tokio::time::sleep(DEBOUNCE * 2).await;
    assert_eq!(store.detail_writes.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn sessions_follow_changes_from_other_writers() {
    let hub = RealtimeHub::default();
    let store = Arc::new(MemoryStore::with_hub(hub.clone()));
    let game = store
        .insert_game(&definition("Azul", &["100 tuiles", "1 sac"]), "demo_user")
        .await
        .unwrap();
    let other = store
        .insert_game(&definition("Catan", &["1 plateau"]), "demo_user")
        .await
        .unwrap();

    let registry = SessionRegistry::new(store.clone(), hub, DEBOUNCE);
    let mine = registry.session("mine").await;
    let theirs = registry.session("theirs").await;
    assert_eq!(registry.len().await, 2);

    mine.lock().await.select(game.id).await.unwrap();
    theirs.lock().await.select(game.id).await.unwrap();

    theirs.lock().await.toggle_item(1).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(mine.lock().await.checklist().unwrap().is_item_checked(1));

    // changes to another game leave the selection alone
    store
        .update_checked_items(other.id, &[(CheckedKey::Item(0), true)].into_iter().collect())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(mine.lock().await.selected_id(), Some(game.id));

    store.delete_game(game.id).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(mine.lock().await.selected_id(), None);

    registry.close("mine").await.unwrap();
    assert_eq!(registry.len().await, 1);
}

#[tokio::test(start_paused = true)]
async fn own_echoes_never_roll_back_later_writes() {
    let hub = RealtimeHub::default();
    let store = Arc::new(MemoryStore::with_hub(hub.clone()));
    let game = store
        .insert_game(&definition("Splendor", &["1 a", "1 b", "1 c"]), "demo_user")
        .await
        .unwrap();

    let registry = SessionRegistry::new(store.clone(), hub, DEBOUNCE);
    let session = registry.session("mine").await;
    session.lock().await.select(game.id).await.unwrap();

    let third = {
        let mut inventory = session.lock().await;
        inventory.toggle_item(0).await.unwrap();

        // the follower picks up the first write and waits for the lock
        tokio::task::yield_now().await;
        inventory.toggle_item(1).await.unwrap();

        let queued = session.clone();
        let third = tokio::spawn(async move {
            queued.lock().await.toggle_item(2).await.unwrap();
        });
        tokio::task::yield_now().await;

        third
    };
    third.await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let stored = store.game(game.id).unwrap();
    for index in 0..3 {
        assert!(
            stored.checked_items.is_checked(&CheckedKey::Item(index)),
            "item {index} is unchecked in the store"
        );
    }
    assert_eq!(stored.version, 3);

    let inventory = session.lock().await;
    let checklist = inventory.checklist().unwrap();
    assert_eq!(checklist.progress(), 100);
    assert_eq!(checklist.version(), 3);
}

#[tokio::test(start_paused = true)]
async fn remote_updates_keep_a_pending_label() {
    let hub = RealtimeHub::default();
    let store = Arc::new(MemoryStore::with_hub(hub.clone()));
    let game = store
        .insert_game(&definition("Dixit", &["84 cartes", "1 plateau"]), "demo_user")
        .await
        .unwrap();

    let registry = SessionRegistry::new(store.clone(), hub, DEBOUNCE);
    let mine = registry.session("mine").await;
    let theirs = registry.session("theirs").await;

    let a = photo(0, "a");
    {
        let mut inventory = mine.lock().await;
        inventory.select(game.id).await.unwrap();
        inventory.add_photos(0, vec![a.clone()]).await.unwrap();
        inventory.rename_photo(0, &a.id, "lapins".to_string()).unwrap();
    }

    theirs.lock().await.select(game.id).await.unwrap();
    theirs.lock().await.toggle_item(1).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    {
        let inventory = mine.lock().await;
        let checklist = inventory.checklist().unwrap();
        assert!(checklist.is_item_checked(1));
        assert_eq!(checklist.photos(0)[0].name, "lapins");
    }

    tokio::time::sleep(DEBOUNCE * 2).await;
    assert_eq!(store.game(game.id).unwrap().item_details[&0usize][0].name, "lapins");
}

#[tokio::test]
async fn registry_returns_the_same_session_per_id() {
    let (store, _) = store_with(&["1 plateau"]).await;
    let registry = SessionRegistry::new(store, RealtimeHub::default(), DEBOUNCE);

    let first = registry.session("abc").await;
    let again = registry.session("abc").await;

    assert!(Arc::ptr_eq(&first, &again));
    assert_eq!(registry.len().await, 1);
}

#[tokio::test]
async fn registry_is_bounded() {
    let (store, _) = store_with(&["1 plateau"]).await;
    let registry = SessionRegistry::with_limits(
        store,
        RealtimeHub::default(),
        DEBOUNCE,
        16,
        Duration::from_secs(3600),
    );

    for i in 0..500 {
        registry.session(&format!("one-shot-{i}")).await;
    }

    assert!(registry.len().await <= 16);
}

#[tokio::test]
async fn idle_sessions_are_evicted_and_save_their_rename() {
    let (store, id) = store_with(&["2 dés"]).await;
    let registry = SessionRegistry::with_limits(
        store.clone(),
        RealtimeHub::default(),
        Duration::from_secs(3600),
        16,
        Duration::from_millis(50),
    );

    let a = photo(0, "a");
    {
        let session = registry.session("idle").await;
        let mut inventory = session.lock().await;
        inventory.select(id).await.unwrap();
        inventory.add_photos(0, vec![a.clone()]).await.unwrap();
        inventory.rename_photo(0, &a.id, "dé vert".to_string()).unwrap();
    }

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(registry.len().await, 0);

    // eviction saves on a spawned task
    for _ in 0..20 {
        if store.detail_writes.load(Ordering::SeqCst) > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(store.game(id).unwrap().item_details[&0usize][0].name, "dé vert");
}
