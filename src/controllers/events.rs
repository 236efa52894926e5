use crate::{prelude::*, realtime::GameChange};

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures_util::Stream;
use tokio_stream::StreamExt;

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    return router.route("/events", get(events));
}

fn event_name(change: &GameChange) -> &'static str {
    return match change {
        GameChange::Insert { .. } => "insert",
        GameChange::Update { .. } => "update",
        GameChange::Delete { .. } => "delete",
    };
}

/// Game changes as server-sent events, for clients that keep a game list open.
async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let stream = state.hub.stream().filter_map(|change| match change {
        Ok(change) => Event::default()
            .event(event_name(&change))
            .json_data(&change)
            .map_err(|e| tracing::error!(error = %e, "unserializable game change"))
            .ok()
            .map(Ok),
        Err(e) => {
            tracing::warn!(error = %e, "event stream lagged");
            None
        }
    });

    return Sse::new(stream).keep_alive(KeepAlive::default());
}
