mod checklist;
mod evaluations;
mod events;
mod games;
mod preferences;
mod utils;

use crate::prelude::*;

use axum::{http::StatusCode, routing::get, Router};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    let router = checklist::add_routes(router);
    let router = games::add_routes(router);
    let router = evaluations::add_routes(router);
    let router = preferences::add_routes(router);
    let router = events::add_routes(router);

    return router.route("/health", get(|| async { StatusCode::NO_CONTENT }));
}
