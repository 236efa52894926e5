#![allow(dead_code)]

use game_inventory::{
    models::{CheckedItems, Evaluation, Game, GameDefinition, ItemDetails, PhotoRotations},
    realtime::{GameChange, RealtimeHub},
    store::{EvaluationStore, GameStore, NotFound},
    Result,
};

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use chrono::Utc;

/// In-memory stand-in for the Postgres store. Publishes to the hub like the real one.
#[derive(Default)]
pub struct MemoryStore {
    pub hub: RealtimeHub,
    games: Mutex<BTreeMap<i64, Game>>,
    evaluations: Mutex<Vec<Evaluation>>,
    next_id: AtomicUsize,
    pub fail_writes: AtomicBool,
    pub detail_writes: AtomicUsize,
}

impl MemoryStore {
    pub fn with_hub(hub: RealtimeHub) -> Self {
        return Self {
            hub,
            ..Default::default()
        };
    }

    pub fn game(&self, id: i64) -> Option<Game> {
        return self.games.lock().unwrap().get(&id).cloned();
    }

    pub fn fail(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("connection refused").into());
        }

        return Ok(());
    }

    fn update(&self, id: i64, apply: impl FnOnce(&mut Game)) -> Result<Game> {
        self.check_writable()?;

        let game = {
            let mut games = self.games.lock().unwrap();
            let game = games.get_mut(&id).ok_or_else(|| NotFound::game(id))?;
            apply(game);
            game.version += 1;
            game.clone()
        };

        self.hub.publish(GameChange::Update { game: game.clone() });

        return Ok(game);
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn list_games(&self) -> Result<Vec<Game>> {
        let mut games: Vec<Game> = self.games.lock().unwrap().values().cloned().collect();
        games.sort_by(|a, b| a.name.cmp(&b.name));

        return Ok(games);
    }

    async fn find_game(&self, id: i64) -> Result<Option<Game>> {
        return Ok(self.game(id));
    }

    async fn insert_game(&self, definition: &GameDefinition, created_by: &str) -> Result<Game> {
        self.check_writable()?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        let game = Game {
            id,
            name: definition.name.clone(),
            search_name: definition.search_name.clone(),
            items: definition.items.clone(),
            checked_items: CheckedItems::new(),
            item_details: ItemDetails::new(),
            photo_rotations: PhotoRotations::new(),
            version: 0,
            created_by: created_by.to_string(),
            created_at: Utc::now(),
        };

        self.games.lock().unwrap().insert(id, game.clone());
        self.hub.publish(GameChange::Insert { game: game.clone() });

        return Ok(game);
    }

    async fn update_definition(&self, id: i64, definition: &GameDefinition) -> Result<Game> {
        return self.update(id, |game| {
            game.name = definition.name.clone();
            game.search_name = definition.search_name.clone();
            game.items = definition.items.clone();
            game.checked_items.clear();
        });
    }

    async fn update_checked_items(&self, id: i64, checked: &CheckedItems) -> Result<Game> {
        return self.update(id, |game| game.checked_items = checked.clone());
    }

    async fn update_item_details(
        &self,
        id: i64,
        details: &ItemDetails,
        rotations: &PhotoRotations,
    ) -> Result<Game> {
        self.detail_writes.fetch_add(1, Ordering::SeqCst);

        return self.update(id, |game| {
            game.item_details = details.clone();
            game.photo_rotations = rotations.clone();
        });
    }

    async fn update_photos(
        &self,
        id: i64,
        checked: &CheckedItems,
        details: &ItemDetails,
        rotations: &PhotoRotations,
    ) -> Result<Game> {
        return self.update(id, |game| {
            game.checked_items = checked.clone();
            game.item_details = details.clone();
            game.photo_rotations = rotations.clone();
        });
    }

    async fn delete_game(&self, id: i64) -> Result {
        self.check_writable()?;

        if self.games.lock().unwrap().remove(&id).is_none() {
            return Err(NotFound::game(id).into());
        }

        self.hub.publish(GameChange::Delete { id });

        return Ok(());
    }
}

#[async_trait]
impl EvaluationStore for MemoryStore {
    async fn list_evaluations(&self) -> Result<Vec<Evaluation>> {
        let mut evaluations = self.evaluations.lock().unwrap().clone();
        evaluations.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        return Ok(evaluations);
    }

    async fn insert_evaluation(&self, evaluation: &Evaluation) -> Result {
        self.check_writable()?;
        self.evaluations.lock().unwrap().push(evaluation.clone());

        return Ok(());
    }

    async fn delete_evaluation(&self, id: &str) -> Result {
        let mut evaluations = self.evaluations.lock().unwrap();
        let before = evaluations.len();
        evaluations.retain(|evaluation| evaluation.id != id);

        if evaluations.len() == before {
            return Err(NotFound::evaluation(id).into());
        }

        return Ok(());
    }

    async fn delete_all_evaluations(&self) -> Result<u64> {
        let mut evaluations = self.evaluations.lock().unwrap();
        let deleted = evaluations.len() as u64;
        evaluations.clear();

        return Ok(deleted);
    }
}

pub fn definition(name: &str, items: &[&str]) -> GameDefinition {
    return GameDefinition {
        name: name.to_string(),
        search_name: name.to_lowercase(),
        items: items.iter().map(|item| item.to_string()).collect(),
    };
}
