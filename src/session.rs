use crate::{
    inventory::Checklist,
    models::{Game, ItemDetails, Photo, PhotoRotations, RotateDirection},
    prelude::*,
    realtime::{ChangeStream, GameChange, RealtimeHub},
    store::{GameStore, NotFound},
};

use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use moka::future::Cache;
use tokio::{sync::Mutex, task::JoinHandle};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_RENAME_DEBOUNCE: Duration = Duration::from_millis(1000);

const MAX_SESSIONS: u64 = 2000;
const SESSION_IDLE: Duration = Duration::from_secs(12 * 60 * 60);

#[derive(Debug, thiserror::Error)]
#[error("No game is selected")]
pub struct NoGameSelected;

/// Photo details waiting for the rename debounce to elapse.
struct PendingRename {
    game_id: i64,
    details: ItemDetails,
    rotations: PhotoRotations,
    cancel: CancellationToken,
    /// Resolves to whether the delayed save reached the store.
    task: JoinHandle<bool>,
}

/// What one browser session has open.
///
/// Checklist operations are applied to a copy, written to the store, and only
/// installed once the store acknowledged the write. A failed write leaves the
/// session exactly as it was. The installed row always carries the version the
/// store returned, and remote changes only replace it with a newer one.
pub struct InventorySession {
    store: Arc<dyn GameStore>,
    checklist: Option<Checklist>,
    pending_rename: Option<PendingRename>,
    rename_debounce: Duration,
    shutdown: CancellationToken,
}

impl InventorySession {
    pub fn new(store: Arc<dyn GameStore>, rename_debounce: Duration) -> Self {
        return Self {
            store,
            checklist: None,
            pending_rename: None,
            rename_debounce,
            shutdown: CancellationToken::new(),
        };
    }

    pub fn checklist(&self) -> Result<&Checklist> {
        return self.checklist.as_ref().ok_or_else(|| NoGameSelected.into());
    }

    pub fn selected_id(&self) -> Option<i64> {
        return self.checklist.as_ref().map(|checklist| checklist.game().id);
    }

    pub async fn select(&mut self, game_id: i64) -> Result<&Checklist> {
        self.flush_rename().await?;

        let game = self
            .store
            .find_game(game_id)
            .await?
            .ok_or_else(|| NotFound::game(game_id))?;

        tracing::debug!(game_id, "game selected");
        self.install(game);

        return self.checklist();
    }

    pub async fn deselect(&mut self) -> Result {
        self.flush_rename().await?;
        self.checklist = None;

        return Ok(());
    }

    pub async fn toggle_item(&mut self, index: usize) -> Result<bool> {
        return self.commit_checked(|checklist| checklist.toggle_item(index)).await;
    }

    pub async fn toggle_photo(&mut self, index: usize, photo_id: &str) -> Result<bool> {
        return self
            .commit_checked(|checklist| checklist.toggle_photo(index, photo_id))
            .await;
    }

    pub async fn toggle_group(&mut self, key: &str) -> Result<bool> {
        return self.commit_checked(|checklist| checklist.toggle_group(key)).await;
    }

    pub async fn reset(&mut self) -> Result {
        return self
            .commit_checked(|checklist| {
                checklist.reset();
                Ok(())
            })
            .await;
    }

    pub async fn add_photos(&mut self, index: usize, photos: Vec<Photo>) -> Result {
        return self
            .commit_photos(|checklist| checklist.add_photos(index, photos))
            .await;
    }

    pub async fn remove_photo(&mut self, index: usize, photo_id: &str) -> Result<Photo> {
        return self
            .commit_photos(|checklist| checklist.remove_photo(index, photo_id))
            .await;
    }

    pub async fn rotate_photo(
        &mut self,
        index: usize,
        photo_id: &str,
        direction: RotateDirection,
    ) -> Result<i32> {
        return self
            .commit_photos(|checklist| checklist.rotate_photo(index, photo_id, direction))
            .await;
    }

    /// Relabels a photo right away and saves it once no other rename follows within the debounce window.
    pub fn rename_photo(&mut self, index: usize, photo_id: &str, name: String) -> Result {
        let Some(checklist) = self.checklist.as_mut() else {
            return Err(NoGameSelected.into());
        };

        checklist.rename_photo(index, photo_id, name)?;

        let game = checklist.game();
        let (game_id, details, rotations) = (
            game.id,
            game.item_details.clone(),
            game.photo_rotations.clone(),
        );

        self.cancel_rename();

        let cancel = self.shutdown.child_token();
        let task = tokio::spawn(save_after(
            self.store.clone(),
            self.rename_debounce,
            cancel.clone(),
            game_id,
            details.clone(),
            rotations.clone(),
        ));

        self.pending_rename = Some(PendingRename {
            game_id,
            details,
            rotations,
            cancel,
            task,
        });

        return Ok(());
    }

    /// Saves a pending rename now instead of waiting for its timer.
    pub async fn flush_rename(&mut self) -> Result {
        let Some(pending) = self.pending_rename.take() else {
            return Ok(());
        };

        pending.cancel.cancel();
        if pending.task.is_finished() && matches!(pending.task.await, Ok(true)) {
            return Ok(());
        }

        self.store
            .update_item_details(pending.game_id, &pending.details, &pending.rotations)
            .await?;

        return Ok(());
    }

    /// Applies a change pushed by another writer. The remote row wins over local state.
    pub fn apply_change(&mut self, change: &GameChange) -> bool {
        if self.selected_id() != Some(change.game_id()) {
            return false;
        }

        match change {
            GameChange::Insert { .. } => return false,
            GameChange::Update { game } => {
                // echoes of our own writes and changes older than them
                if self
                    .checklist
                    .as_ref()
                    .is_some_and(|checklist| checklist.version() >= game.version)
                {
                    return false;
                }

                tracing::debug!(
                    game_id = game.id,
                    version = game.version,
                    "selected game replaced by remote change"
                );
                self.install(game.clone());
            }
            GameChange::Delete { id } => {
                tracing::debug!(game_id = id, "selected game deleted remotely");
                self.cancel_rename();
                self.checklist = None;
            }
        }

        return true;
    }

    async fn commit_checked<T, F>(&mut self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Checklist) -> std::result::Result<T, crate::inventory::ChecklistError>,
    {
        let mut candidate = self.checklist()?.clone();
        let out = op(&mut candidate)?;

        let game = candidate.game();
        let stored = self
            .store
            .update_checked_items(game.id, &game.checked_items)
            .await?;

        self.install(stored);

        return Ok(out);
    }

    async fn commit_photos<T, F>(&mut self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Checklist) -> std::result::Result<T, crate::inventory::ChecklistError>,
    {
        let mut candidate = self.checklist()?.clone();
        let out = op(&mut candidate)?;

        let game = candidate.game();
        let stored = self
            .store
            .update_photos(
                game.id,
                &game.checked_items,
                &game.item_details,
                &game.photo_rotations,
            )
            .await?;

        // the write above already carries any pending label
        self.cancel_rename();
        self.install(stored);

        return Ok(out);
    }

    /// Installs a stored row, keeping labels whose save is still pending.
    fn install(&mut self, game: Game) {
        let mut checklist = Checklist::new(game);

        if let Some(pending) = &self.pending_rename {
            for (index, photos) in &pending.details {
                for photo in photos {
                    // photos removed since the rename no longer take a label
                    let _ = checklist.rename_photo(*index, &photo.id, photo.name.clone());
                }
            }
        }

        self.checklist = Some(checklist);
    }

    fn cancel_rename(&mut self) {
        if let Some(pending) = self.pending_rename.take() {
            pending.cancel.cancel();
        }
    }
}

impl Drop for InventorySession {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn save_after(
    store: Arc<dyn GameStore>,
    delay: Duration,
    cancel: CancellationToken,
    game_id: i64,
    details: ItemDetails,
    rotations: PhotoRotations,
) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => return false,
        _ = tokio::time::sleep(delay) => {}
    }

    return match store.update_item_details(game_id, &details, &rotations).await {
        Ok(_) => {
            tracing::info!(game_id, "photo names saved");
            true
        }
        Err(e) => {
            tracing::error!(game_id, error = %e, "failed to save photo names");
            false
        }
    };
}

pub type SharedSession = Arc<Mutex<InventorySession>>;

#[derive(Clone)]
struct RegistryEntry {
    session: SharedSession,
    shutdown: CancellationToken,
}

impl RegistryEntry {
    async fn shut_down(self) {
        if let Err(e) = self.session.lock().await.flush_rename().await {
            tracing::error!(error = %e, "failed to save photo names of an evicted session");
        }

        self.shutdown.cancel();
    }
}

/// Sessions keyed by browser-session id, each following the realtime hub.
///
/// Bounded in size and idle time. An evicted session saves its pending rename
/// and stops following changes.
pub struct SessionRegistry {
    store: Arc<dyn GameStore>,
    hub: RealtimeHub,
    rename_debounce: Duration,
    sessions: Cache<String, RegistryEntry>,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn GameStore>, hub: RealtimeHub, rename_debounce: Duration) -> Self {
        return Self::with_limits(store, hub, rename_debounce, MAX_SESSIONS, SESSION_IDLE);
    }

    pub fn with_limits(
        store: Arc<dyn GameStore>,
        hub: RealtimeHub,
        rename_debounce: Duration,
        capacity: u64,
        idle: Duration,
    ) -> Self {
        let sessions = Cache::builder()
            .max_capacity(capacity)
            .time_to_idle(idle)
            .eviction_listener(|sid: Arc<String>, entry: RegistryEntry, cause| {
                if !cause.was_evicted() {
                    return;
                }

                tracing::debug!(sid = %sid, ?cause, "inventory session evicted");

                match tokio::runtime::Handle::try_current() {
                    Ok(runtime) => {
                        runtime.spawn(entry.shut_down());
                    }
                    Err(_) => entry.shutdown.cancel(),
                }
            })
            .build();

        return Self {
            store,
            hub,
            rename_debounce,
            sessions,
        };
    }

    pub async fn session(&self, sid: &str) -> SharedSession {
        let entry = self
            .sessions
            .entry(sid.to_string())
            .or_insert_with(async { self.open() })
            .await
            .into_value();

        return entry.session;
    }

    fn open(&self) -> RegistryEntry {
        let session = InventorySession::new(self.store.clone(), self.rename_debounce);
        let shutdown = session.shutdown.clone();
        let session = Arc::new(Mutex::new(session));

        tokio::spawn(follow_changes(
            Arc::downgrade(&session),
            self.hub.subscribe(),
            shutdown.clone(),
        ));

        return RegistryEntry { session, shutdown };
    }

    /// Tears a session down, saving any pending rename first.
    pub async fn close(&self, sid: &str) -> Result {
        let Some(entry) = self.sessions.remove(sid).await else {
            return Ok(());
        };

        entry.session.lock().await.flush_rename().await?;
        entry.shutdown.cancel();

        return Ok(());
    }

    pub async fn len(&self) -> usize {
        self.sessions.run_pending_tasks().await;

        return self.sessions.entry_count() as usize;
    }
}

async fn follow_changes(
    session: Weak<Mutex<InventorySession>>,
    mut changes: ChangeStream,
    shutdown: CancellationToken,
) {
    loop {
        let change = tokio::select! {
            _ = shutdown.cancelled() => break,
            change = changes.next() => change,
        };

        let Some(change) = change else {
            break;
        };

        let Some(session) = session.upgrade() else {
            break;
        };

        session.lock().await.apply_change(&change);
    }
}
