//! Board game inventory service.
//!
//! Users pick a game, check its components off against the manifest, attach
//! photos per component and leave star-rated evaluations. Games and
//! evaluations live in Postgres, photos on a managed image host, and every
//! write to a game is pushed to the other open sessions.

pub mod config;
pub mod controllers;
pub mod init;
pub mod inventory;
pub mod media;
pub mod models;
pub mod realtime;
pub mod result;
pub mod session;
pub mod store;

pub use crate::result::Result;

use std::sync::Arc;

pub mod prelude {
    pub use crate::{
        config::Config,
        result::{AppError, Result},
        AppState,
    };
}

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<config::Config>,
    pub games: Arc<dyn store::GameStore>,
    pub evaluations: Arc<dyn store::EvaluationStore>,
    pub media: Arc<dyn media::MediaHost>,
    pub hub: realtime::RealtimeHub,
    pub sessions: Arc<session::SessionRegistry>,
}
