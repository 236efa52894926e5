use game_inventory::{
    config, controllers,
    init::{db::init_pg_pool, media::init_media_host, session::init_session_layer},
    realtime::RealtimeHub,
    session::SessionRegistry,
    store::PgStore,
    AppState, Result,
};

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    error_handling::HandleErrorLayer,
    http::{header::CONTENT_TYPE, Method, StatusCode},
    Router,
};
use tokio::signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    timeout::TimeoutLayer,
};
use tracing_subscriber::{fmt, EnvFilter};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    return run().await.map_err(|e| e.0);
}

async fn run() -> Result {
    let cfg = config::build()?;

    let db = init_pg_pool(&cfg).await?;
    let hub = RealtimeHub::default();
    let store = Arc::new(PgStore::new(db, hub.clone()));
    let media = init_media_host(&cfg)?;

    let sessions = SessionRegistry::new(store.clone(), hub.clone(), cfg.rename_debounce);

    let state = AppState {
        cfg: Arc::new(cfg),
        games: store.clone(),
        evaluations: store,
        media,
        hub,
        sessions: Arc::new(sessions),
    };

    let session_service = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|_| async {
            return StatusCode::BAD_REQUEST;
        }))
        .layer(init_session_layer());

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let router = Router::new();

    // dynamic paths
    let router = controllers::add_routes(router);

    // static assets
    let router = router
        .route_service("/favicon.ico", ServeFile::new("assets/favicon.ico"))
        .nest_service("/assets", ServeDir::new("assets"));

    let address = SocketAddr::from(([0, 0, 0, 0], state.cfg.server_port));

    let router = router
        .with_state(state)
        .layer(session_service)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(cors);

    tracing::info!(%address, "server running");

    axum::Server::bind(&address)
        .serve(router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shut down");

    return Ok(());
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }

        tracing::info!("received ctrl+c, shutting down");
    };

    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                tracing::info!("received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for terminate signal");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
