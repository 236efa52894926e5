mod postgres;
pub use postgres::PgStore;

use crate::{
    models::{CheckedItems, Evaluation, Game, GameDefinition, ItemDetails, PhotoRotations},
    prelude::*,
};

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
#[error("{table} row {id} not found")]
pub struct NotFound {
    pub table: &'static str,
    pub id: String,
}

impl NotFound {
    pub fn game(id: i64) -> Self {
        return Self {
            table: "games",
            id: id.to_string(),
        };
    }

    pub fn evaluation(id: &str) -> Self {
        return Self {
            table: "game_evaluations",
            id: id.to_string(),
        };
    }
}

/// The `games` collection. Every successful write is broadcast as a [`crate::realtime::GameChange`].
///
/// Updates patch only the columns they name, so a checklist write never
/// clobbers photo details and vice versa.
#[async_trait]
pub trait GameStore: Send + Sync + 'static {
    /// All games, ordered by name.
    async fn list_games(&self) -> Result<Vec<Game>>;

    async fn find_game(&self, id: i64) -> Result<Option<Game>>;

    async fn insert_game(&self, definition: &GameDefinition, created_by: &str) -> Result<Game>;

    /// Replaces name and items and clears the checked map.
    async fn update_definition(&self, id: i64, definition: &GameDefinition) -> Result<Game>;

    async fn update_checked_items(&self, id: i64, checked: &CheckedItems) -> Result<Game>;

    async fn update_item_details(
        &self,
        id: i64,
        details: &ItemDetails,
        rotations: &PhotoRotations,
    ) -> Result<Game>;

    /// Checked map, details and rotations in one statement.
    async fn update_photos(
        &self,
        id: i64,
        checked: &CheckedItems,
        details: &ItemDetails,
        rotations: &PhotoRotations,
    ) -> Result<Game>;

    async fn delete_game(&self, id: i64) -> Result;
}

/// The `game_evaluations` collection.
#[async_trait]
pub trait EvaluationStore: Send + Sync + 'static {
    /// All evaluations, newest first.
    async fn list_evaluations(&self) -> Result<Vec<Evaluation>>;

    async fn insert_evaluation(&self, evaluation: &Evaluation) -> Result;

    async fn delete_evaluation(&self, id: &str) -> Result;

    async fn delete_all_evaluations(&self) -> Result<u64>;
}
