use crate::prelude::*;

use s3::{creds::Credentials, Bucket, Region};

pub fn init_s3_bucket(
    r2_account_id: &str,
    r2_bucket: &str,
    r2_s3_access_key_id: &str,
    r2_s3_secret_access_key: &str,
) -> Result<Bucket> {
    let bucket = Bucket::new(
        r2_bucket,
        Region::R2 {
            account_id: r2_account_id.to_string(),
        },
        Credentials::new(
            Some(r2_s3_access_key_id),
            Some(r2_s3_secret_access_key),
            None,
            None,
            None,
        )?,
    )?
    .with_path_style();

    return Ok(bucket);
}
