use super::utils;

use crate::{
    inventory::{Checklist, GroupProgress, SortOrder},
    media::{self, optimized_url, UploadFile},
    models::{Game, Photo, RotateDirection},
    prelude::*,
    session::NoGameSelected,
};

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

const KB: usize = 1024;
const MB: usize = 1024 * KB;

const THUMBNAIL_WIDTH: u32 = 400;

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    let router = router
        .route("/session/items/:index/photos", post(upload_photos))
        .route_layer(DefaultBodyLimit::max(50 * MB));

    return router
        .route("/session", get(current).delete(close))
        .route("/session/select", delete(deselect))
        .route("/session/select/:game_id", post(select))
        .route("/session/items/:index/toggle", post(toggle_item))
        .route(
            "/session/items/:index/photos/:photo_id",
            patch(rename_photo).delete(remove_photo),
        )
        .route(
            "/session/items/:index/photos/:photo_id/toggle",
            post(toggle_photo),
        )
        .route(
            "/session/items/:index/photos/:photo_id/rotate/:direction",
            post(rotate_photo),
        )
        .route("/session/groups/:key/toggle", post(toggle_group))
        .route("/session/reset", post(reset));
}

#[derive(Serialize)]
pub struct PhotoView<'a> {
    #[serde(flatten)]
    photo: &'a Photo,
    thumbnail: Option<String>,
    rotation: i32,
    checked: bool,
}

#[derive(Serialize)]
pub struct ItemView<'a> {
    index: usize,
    text: &'a str,
    checked: bool,
    photos: Vec<PhotoView<'a>>,
}

/// A game as the inventory screen shows it.
#[derive(Serialize)]
pub struct ChecklistView<'a> {
    game: &'a Game,
    items: Vec<ItemView<'a>>,
    groups: Vec<GroupProgress>,
    progress: u8,
}

impl<'a> ChecklistView<'a> {
    pub fn new(checklist: &'a Checklist, order: SortOrder) -> Self {
        let items = checklist
            .sorted_items(order)
            .into_iter()
            .map(|item| ItemView {
                index: item.index,
                text: item.text,
                checked: checklist.is_item_checked(item.index),
                photos: checklist
                    .photos(item.index)
                    .iter()
                    .map(|photo| PhotoView {
                        photo,
                        thumbnail: photo
                            .image
                            .as_deref()
                            .map(|url| optimized_url(url, THUMBNAIL_WIDTH)),
                        rotation: checklist.rotation(&photo.id),
                        checked: checklist.is_photo_checked(item.index, &photo.id),
                    })
                    .collect(),
            })
            .collect();

        return Self {
            game: checklist.game(),
            items,
            groups: checklist.group_progress(),
            progress: checklist.progress(),
        };
    }
}

#[derive(Debug, Deserialize)]
struct ViewParams {
    #[serde(default)]
    order: SortOrder,
}

#[derive(Serialize)]
struct Toggled {
    checked: bool,
    progress: u8,
}

async fn current(
    Query(params): Query<ViewParams>,
    session: Session,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let inventory = utils::inventory_session(&state, &session).await?;
    let inventory = inventory.lock().await;

    return Ok(Json(ChecklistView::new(inventory.checklist()?, params.order)).into_response());
}

async fn select(
    Path(game_id): Path<i64>,
    session: Session,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let inventory = utils::inventory_session(&state, &session).await?;
    let mut inventory = inventory.lock().await;

    let checklist = inventory.select(game_id).await?;

    return Ok(Json(ChecklistView::new(checklist, SortOrder::Default)).into_response());
}

async fn deselect(session: Session, State(state): State<AppState>) -> Result<StatusCode> {
    let inventory = utils::inventory_session(&state, &session).await?;
    inventory.lock().await.deselect().await?;

    return Ok(StatusCode::NO_CONTENT);
}

async fn close(session: Session, State(state): State<AppState>) -> Result<StatusCode> {
    let sid = utils::session_id(&session)?;
    state.sessions.close(&sid).await?;

    return Ok(StatusCode::NO_CONTENT);
}

async fn toggle_item(
    Path(index): Path<usize>,
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<Toggled>> {
    let inventory = utils::inventory_session(&state, &session).await?;
    let mut inventory = inventory.lock().await;

    let checked = inventory.toggle_item(index).await?;

    return Ok(Json(Toggled {
        checked,
        progress: inventory.checklist()?.progress(),
    }));
}

async fn toggle_photo(
    Path((index, photo_id)): Path<(usize, String)>,
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<Toggled>> {
    let inventory = utils::inventory_session(&state, &session).await?;
    let mut inventory = inventory.lock().await;

    let checked = inventory.toggle_photo(index, &photo_id).await?;

    return Ok(Json(Toggled {
        checked,
        progress: inventory.checklist()?.progress(),
    }));
}

async fn toggle_group(
    Path(key): Path<String>,
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<Toggled>> {
    let inventory = utils::inventory_session(&state, &session).await?;
    let mut inventory = inventory.lock().await;

    let checked = inventory.toggle_group(&key).await?;

    return Ok(Json(Toggled {
        checked,
        progress: inventory.checklist()?.progress(),
    }));
}

async fn reset(session: Session, State(state): State<AppState>) -> Result<StatusCode> {
    let inventory = utils::inventory_session(&state, &session).await?;
    inventory.lock().await.reset().await?;

    return Ok(StatusCode::NO_CONTENT);
}

async fn upload_photos(
    Path(index): Path<usize>,
    session: Session,
    State(state): State<AppState>,
    mut files: Multipart,
) -> Result<impl IntoResponse> {
    let inventory = utils::inventory_session(&state, &session).await?;
    let mut inventory = inventory.lock().await;

    let game_id = inventory.selected_id().ok_or(NoGameSelected)?;
    if index >= inventory.checklist()?.items().len() {
        return Err(crate::inventory::ChecklistError::UnknownItem(index).into());
    }

    let mut uploads = vec![];
    while let Some(file) = files.next_field().await? {
        let file_name = match file.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        let content_type = file.content_type().map(str::to_string);

        let data = file.bytes().await?;

        uploads.push(UploadFile {
            file_name,
            content_type,
            data: data.to_vec(),
        });
    }

    let outcome =
        media::upload_batch(state.media.as_ref(), uploads, &media::item_folder(game_id, index))
            .await;

    if !outcome.photos.is_empty() {
        inventory.add_photos(index, outcome.photos.clone()).await?;
    }

    return Ok((StatusCode::CREATED, Json(outcome)));
}

#[derive(Debug, Deserialize)]
struct RenamePhoto {
    name: String,
}

async fn rename_photo(
    Path((index, photo_id)): Path<(usize, String)>,
    session: Session,
    State(state): State<AppState>,
    Json(body): Json<RenamePhoto>,
) -> Result<StatusCode> {
    let inventory = utils::inventory_session(&state, &session).await?;
    inventory
        .lock()
        .await
        .rename_photo(index, &photo_id, body.name)?;

    return Ok(StatusCode::ACCEPTED);
}

async fn remove_photo(
    Path((index, photo_id)): Path<(usize, String)>,
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<Photo>> {
    let inventory = utils::inventory_session(&state, &session).await?;
    let removed = inventory.lock().await.remove_photo(index, &photo_id).await?;

    return Ok(Json(removed));
}

#[derive(Serialize)]
struct Rotated {
    rotation: i32,
}

async fn rotate_photo(
    Path((index, photo_id, direction)): Path<(usize, String, RotateDirection)>,
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<Rotated>> {
    let inventory = utils::inventory_session(&state, &session).await?;
    let rotation = inventory
        .lock()
        .await
        .rotate_photo(index, &photo_id, direction)
        .await?;

    return Ok(Json(Rotated { rotation }));
}
