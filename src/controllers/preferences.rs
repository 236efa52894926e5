use crate::prelude::*;

use axum::{routing::get, routing::post, Json, Router};
use serde::Serialize;
use tower_sessions::Session;

const DARK_MODE_KEY: &str = "dark_mode";

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    return router
        .route("/preferences", get(preferences))
        .route("/preferences/dark-mode/toggle", post(toggle_dark_mode));
}

#[derive(Serialize)]
struct Preferences {
    dark_mode: bool,
}

fn dark_mode(session: &Session) -> Result<bool> {
    return Ok(session.get::<bool>(DARK_MODE_KEY)?.unwrap_or(true));
}

async fn preferences(session: Session) -> Result<Json<Preferences>> {
    return Ok(Json(Preferences {
        dark_mode: dark_mode(&session)?,
    }));
}

async fn toggle_dark_mode(session: Session) -> Result<Json<Preferences>> {
    let dark_mode = !dark_mode(&session)?;
    session.insert(DARK_MODE_KEY, dark_mode)?;

    return Ok(Json(Preferences { dark_mode }));
}
