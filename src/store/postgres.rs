use super::{EvaluationStore, GameStore, NotFound};

use crate::{
    models::{CheckedItems, Evaluation, Game, GameDefinition, ItemDetails, PhotoRotations},
    prelude::*,
    realtime::{GameChange, RealtimeHub},
};

use async_trait::async_trait;
use sqlx::{types::Json, PgPool};

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
    hub: RealtimeHub,
}

impl PgStore {
    pub fn new(db: PgPool, hub: RealtimeHub) -> Self {
        return Self { db, hub };
    }

    fn updated(&self, id: i64, game: Option<Game>) -> Result<Game> {
        let Some(game) = game else {
            return Err(NotFound::game(id).into());
        };

        self.hub.publish(GameChange::Update { game: game.clone() });

        return Ok(game);
    }
}

#[async_trait]
impl GameStore for PgStore {
    async fn list_games(&self) -> Result<Vec<Game>> {
        let games: Vec<Game> = sqlx::query_as("SELECT * FROM games ORDER BY name ASC")
            .fetch_all(&self.db)
            .await?;

        return Ok(games);
    }

    async fn find_game(&self, id: i64) -> Result<Option<Game>> {
        let game: Option<Game> = sqlx::query_as("SELECT * FROM games WHERE id = $1 LIMIT 1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        return Ok(game);
    }

    async fn insert_game(&self, definition: &GameDefinition, created_by: &str) -> Result<Game> {
        let game: Game = sqlx::query_as(
            "INSERT INTO games (name, search_name, items, created_by) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&definition.name)
        .bind(&definition.search_name)
        .bind(Json(&definition.items))
        .bind(created_by)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(game_id = game.id, name = %game.name, "game created");
        self.hub.publish(GameChange::Insert { game: game.clone() });

        return Ok(game);
    }

    async fn update_definition(&self, id: i64, definition: &GameDefinition) -> Result<Game> {
        let game: Option<Game> = sqlx::query_as(
            "UPDATE games SET name = $1, search_name = $2, items = $3, checked_items = '{}'::jsonb, version = version + 1 WHERE id = $4 RETURNING *",
        )
        .bind(&definition.name)
        .bind(&definition.search_name)
        .bind(Json(&definition.items))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        return self.updated(id, game);
    }

    async fn update_checked_items(&self, id: i64, checked: &CheckedItems) -> Result<Game> {
        let game: Option<Game> =
            sqlx::query_as("UPDATE games SET checked_items = $1, version = version + 1 WHERE id = $2 RETURNING *")
                .bind(Json(checked))
                .bind(id)
                .fetch_optional(&self.db)
                .await?;

        return self.updated(id, game);
    }

    async fn update_item_details(
        &self,
        id: i64,
        details: &ItemDetails,
        rotations: &PhotoRotations,
    ) -> Result<Game> {
        let game: Option<Game> = sqlx::query_as(
            "UPDATE games SET item_details = $1, photo_rotations = $2, version = version + 1 WHERE id = $3 RETURNING *",
        )
        .bind(Json(details))
        .bind(Json(rotations))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        return self.updated(id, game);
    }

    async fn update_photos(
        &self,
        id: i64,
        checked: &CheckedItems,
        details: &ItemDetails,
        rotations: &PhotoRotations,
    ) -> Result<Game> {
        let game: Option<Game> = sqlx::query_as(
            "UPDATE games SET checked_items = $1, item_details = $2, photo_rotations = $3, version = version + 1 WHERE id = $4 RETURNING *",
        )
        .bind(Json(checked))
        .bind(Json(details))
        .bind(Json(rotations))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        return self.updated(id, game);
    }

    async fn delete_game(&self, id: i64) -> Result {
        let deleted = sqlx::query("DELETE FROM games WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(NotFound::game(id).into());
        }

        tracing::info!(game_id = id, "game deleted");
        self.hub.publish(GameChange::Delete { id });

        return Ok(());
    }
}

#[async_trait]
impl EvaluationStore for PgStore {
    async fn list_evaluations(&self) -> Result<Vec<Evaluation>> {
        let evaluations: Vec<Evaluation> =
            sqlx::query_as("SELECT * FROM game_evaluations ORDER BY created_at DESC")
                .fetch_all(&self.db)
                .await?;

        return Ok(evaluations);
    }

    async fn insert_evaluation(&self, evaluation: &Evaluation) -> Result {
        sqlx::query("INSERT INTO game_evaluations (id, game_id, game_name, rating, sender_name, comment, created_by, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)")
            .bind(&evaluation.id)
            .bind(evaluation.game_id)
            .bind(&evaluation.game_name)
            .bind(evaluation.rating)
            .bind(&evaluation.sender_name)
            .bind(&evaluation.comment)
            .bind(&evaluation.created_by)
            .bind(evaluation.created_at)
            .execute(&self.db)
            .await?;

        return Ok(());
    }

    async fn delete_evaluation(&self, id: &str) -> Result {
        let deleted = sqlx::query("DELETE FROM game_evaluations WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(NotFound::evaluation(id).into());
        }

        return Ok(());
    }

    async fn delete_all_evaluations(&self) -> Result<u64> {
        let deleted = sqlx::query("DELETE FROM game_evaluations")
            .execute(&self.db)
            .await?
            .rows_affected();

        tracing::info!(deleted, "evaluations cleared");

        return Ok(deleted);
    }
}
