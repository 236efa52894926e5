use super::s3::init_s3_bucket;

use crate::{
    config::MediaConfig,
    media::{BucketHost, CloudinaryHost, MediaHost},
    prelude::*,
};

use std::sync::Arc;

pub fn init_media_host(cfg: &Config) -> Result<Arc<dyn MediaHost>> {
    let host: Arc<dyn MediaHost> = match &cfg.media {
        MediaConfig::Cloudinary {
            cloud_name,
            upload_preset,
        } => {
            tracing::info!(cloud_name = %cloud_name, "uploading photos to cloudinary");
            Arc::new(CloudinaryHost::new(cloud_name.clone(), upload_preset.clone()))
        }
        MediaConfig::Bucket {
            r2_account_id,
            r2_bucket,
            r2_s3_access_key_id,
            r2_s3_secret_access_key,
            r2_bucket_public_url,
        } => {
            let bucket = init_s3_bucket(
                r2_account_id,
                r2_bucket,
                r2_s3_access_key_id,
                r2_s3_secret_access_key,
            )?;

            tracing::info!(r2_bucket = %r2_bucket, "uploading photos to bucket");
            Arc::new(BucketHost::new(bucket, r2_bucket_public_url.clone()))
        }
    };

    return Ok(host);
}
