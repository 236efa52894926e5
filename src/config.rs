use crate::session::DEFAULT_RENAME_DEBOUNCE;

use std::{env, time::Duration};

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,

    pub db_connection_url: String,

    /// Recorded as `created_by` on games and evaluations.
    pub username: String,

    pub media: MediaConfig,

    pub rename_debounce: Duration,
}

#[derive(Debug, Clone)]
pub enum MediaConfig {
    Cloudinary {
        cloud_name: String,
        upload_preset: String,
    },
    Bucket {
        r2_account_id: String,
        r2_bucket: String,
        r2_s3_access_key_id: String,
        r2_s3_secret_access_key: String,
        r2_bucket_public_url: String,
    },
}

pub fn build() -> anyhow::Result<Config> {
    // a missing .env is fine, the variables may come from the environment
    let _ = dotenv::dotenv();

    let server_port = optional("SERVER_PORT")
        .unwrap_or_else(|| "8000".to_string())
        .parse()
        .context("SERVER_PORT must be a port number")?;

    let rename_debounce = match optional("RENAME_DEBOUNCE_MS") {
        Some(ms) => Duration::from_millis(ms.parse().context("RENAME_DEBOUNCE_MS must be an integer")?),
        None => DEFAULT_RENAME_DEBOUNCE,
    };

    let media = match optional("MEDIA_PROVIDER").as_deref() {
        None | Some("cloudinary") => MediaConfig::Cloudinary {
            cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
            upload_preset: required("CLOUDINARY_UPLOAD_PRESET")?,
        },
        Some("bucket") => MediaConfig::Bucket {
            r2_account_id: required("R2_ACCOUNT_ID")?,
            r2_bucket: required("R2_BUCKET")?,
            r2_s3_access_key_id: required("R2_S3_ACCESS_KEY_ID")?,
            r2_s3_secret_access_key: required("R2_S3_SECRET_ACCESS_KEY")?,
            r2_bucket_public_url: required("R2_BUCKET_PUBLIC_URL")?,
        },
        Some(other) => anyhow::bail!("unknown MEDIA_PROVIDER {other:?}, expected cloudinary or bucket"),
    };

    return Ok(Config {
        server_port,
        db_connection_url: required("DATABASE_URL")?,
        username: optional("INVENTORY_USERNAME").unwrap_or_else(|| "demo_user".to_string()),
        media,
        rename_debounce,
    });
}

fn optional(key: &str) -> Option<String> {
    return env::var(key).ok().filter(|value| !value.trim().is_empty());
}

fn required(key: &str) -> anyhow::Result<String> {
    return optional(key).with_context(|| format!("{key} is not set"));
}
