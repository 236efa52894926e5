use crate::prelude::*;

use sqlx::{postgres::PgPoolOptions, PgPool};

const MAX_CONNECTIONS: u32 = 10;

pub async fn init_pg_pool(cfg: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect(&cfg.db_connection_url)
        .await?;

    sqlx::migrate!().run(&pool).await?;

    tracing::info!("database migrated");

    return Ok(pool);
}
