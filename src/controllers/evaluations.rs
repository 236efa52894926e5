use crate::{
    models::{Evaluation, EvaluationForm},
    prelude::*,
    store::NotFound,
};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use serde::Serialize;

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    return router
        .route(
            "/evaluations",
            get(evaluations).post(post_evaluation).delete(delete_all),
        )
        .route("/evaluations/:evaluation_id", delete(delete_evaluation));
}

async fn evaluations(State(state): State<AppState>) -> Result<Json<Vec<Evaluation>>> {
    let evaluations = state.evaluations.list_evaluations().await?;

    return Ok(Json(evaluations));
}

async fn post_evaluation(
    State(state): State<AppState>,
    Json(form): Json<EvaluationForm>,
) -> Result<impl IntoResponse> {
    let valid = form.validate()?;

    let game = state
        .games
        .find_game(valid.game_id)
        .await?
        .ok_or_else(|| NotFound::game(valid.game_id))?;

    let evaluation = valid.into_evaluation(game.name, state.cfg.username.clone());
    state.evaluations.insert_evaluation(&evaluation).await?;

    tracing::info!(
        evaluation_id = %evaluation.id,
        game_id = evaluation.game_id,
        rating = evaluation.rating,
        "evaluation saved"
    );

    return Ok((StatusCode::CREATED, Json(evaluation)));
}

async fn delete_evaluation(
    Path(evaluation_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode> {
    state.evaluations.delete_evaluation(&evaluation_id).await?;

    return Ok(StatusCode::NO_CONTENT);
}

#[derive(Serialize)]
struct Deleted {
    deleted: u64,
}

async fn delete_all(State(state): State<AppState>) -> Result<Json<Deleted>> {
    let deleted = state.evaluations.delete_all_evaluations().await?;

    return Ok(Json(Deleted { deleted }));
}
