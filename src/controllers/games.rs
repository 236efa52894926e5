use super::{checklist::ChecklistView, utils};

use crate::{
    inventory::{Checklist, SortOrder},
    models::{search_games, Game, GameForm},
    prelude::*,
    store::NotFound,
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tower_sessions::Session;

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    return router
        .route("/games", get(games).post(post_game))
        .route("/games/search", get(search))
        .route("/games/:game_id", get(game).put(put_game).delete(delete_game));
}

async fn games(State(state): State<AppState>) -> Result<Json<Vec<Game>>> {
    let games = state.games.list_games().await?;

    return Ok(Json(games));
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

async fn search(
    Query(params): Query<SearchParams>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Game>>> {
    let query = params.q.unwrap_or_default();

    let games = state.games.list_games().await?;
    let found = search_games(&games, &query).into_iter().cloned().collect();

    return Ok(Json(found));
}

/// Creates a game and opens it in the caller's session.
async fn post_game(
    session: Session,
    State(state): State<AppState>,
    Json(form): Json<GameForm>,
) -> Result<impl IntoResponse> {
    let definition = form.validate()?;

    let game = state
        .games
        .insert_game(&definition, &state.cfg.username)
        .await?;

    let inventory = utils::inventory_session(&state, &session).await?;
    inventory.lock().await.select(game.id).await?;

    return Ok((StatusCode::CREATED, Json(game)));
}

#[derive(Debug, Deserialize)]
struct GameParams {
    #[serde(default)]
    order: SortOrder,
}

async fn game(
    Path(game_id): Path<i64>,
    Query(params): Query<GameParams>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let game = state
        .games
        .find_game(game_id)
        .await?
        .ok_or_else(|| NotFound::game(game_id))?;

    let checklist = Checklist::new(game);

    return Ok(Json(ChecklistView::new(&checklist, params.order)).into_response());
}

/// Renames a game and replaces its manifest. Item indices shift, so its checklist starts over.
async fn put_game(
    Path(game_id): Path<i64>,
    State(state): State<AppState>,
    Json(form): Json<GameForm>,
) -> Result<Json<Game>> {
    let definition = form.validate()?;

    let game = state.games.update_definition(game_id, &definition).await?;

    return Ok(Json(game));
}

async fn delete_game(Path(game_id): Path<i64>, State(state): State<AppState>) -> Result<StatusCode> {
    state.games.delete_game(game_id).await?;

    return Ok(StatusCode::NO_CONTENT);
}
