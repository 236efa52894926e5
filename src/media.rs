use crate::{models::Photo, prelude::*};

use async_trait::async_trait;
use futures::future::join_all;
use nanoid::nanoid;
use s3::Bucket;
use serde::{Deserialize, Serialize};

const KB: usize = 1024;
const MB: usize = 1024 * KB;

pub const MAX_UPLOAD_BYTES: usize = 10 * MB;

const ROOT_FOLDER: &str = "boardgames";

#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UploadedMedia {
    pub url: String,
    pub public_id: String,
}

/// A managed image host. Returned URLs are durable; the service never edits media after upload.
#[async_trait]
pub trait MediaHost: Send + Sync + 'static {
    async fn upload(&self, file: &UploadFile, folder: &str) -> Result<UploadedMedia>;
}

pub struct CloudinaryHost {
    client: reqwest::Client,
    cloud_name: String,
    upload_preset: String,
}

#[derive(Deserialize)]
struct CloudinaryResponse {
    secure_url: String,
    public_id: String,
}

impl CloudinaryHost {
    pub fn new(cloud_name: String, upload_preset: String) -> Self {
        return Self {
            client: reqwest::Client::new(),
            cloud_name,
            upload_preset,
        };
    }
}

#[async_trait]
impl MediaHost for CloudinaryHost {
    async fn upload(&self, file: &UploadFile, folder: &str) -> Result<UploadedMedia> {
        let mut part =
            reqwest::multipart::Part::bytes(file.data.clone()).file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type)?;
        }

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone())
            .text("folder", folder.to_string());

        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.cloud_name
        );

        let response: CloudinaryResponse = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        return Ok(UploadedMedia {
            url: response.secure_url,
            public_id: response.public_id,
        });
    }
}

/// S3-compatible bucket (Cloudflare R2) served from a public URL.
pub struct BucketHost {
    bucket: Bucket,
    public_url: String,
}

impl BucketHost {
    pub fn new(bucket: Bucket, public_url: String) -> Self {
        return Self { bucket, public_url };
    }
}

#[async_trait]
impl MediaHost for BucketHost {
    async fn upload(&self, file: &UploadFile, folder: &str) -> Result<UploadedMedia> {
        let key = format!("{folder}/{}_{}", nanoid!(), file.file_name);
        let content_type = file
            .content_type
            .as_deref()
            .unwrap_or("application/octet-stream");

        let response = self
            .bucket
            .put_object_with_content_type(&key, &file.data, content_type)
            .await?;

        if response.status_code() != 200 {
            return Err(anyhow::anyhow!(
                "bucket upload of {key} failed with {}",
                response.status_code()
            )
            .into());
        }

        return Ok(UploadedMedia {
            url: format!("{}/{key}", self.public_url.trim_end_matches('/')),
            public_id: key,
        });
    }
}

/// Outcome of a multi-file upload. Files in `failed` and `skipped` are not part of `photos`.
#[derive(Serialize, Debug, Default)]
pub struct BatchOutcome {
    pub photos: Vec<Photo>,
    pub failed: Vec<String>,
    pub skipped: Vec<String>,
}

pub fn item_folder(game_id: i64, item_index: usize) -> String {
    return format!("{ROOT_FOLDER}/{game_id}/{item_index}");
}

pub fn is_uploadable(file: &UploadFile) -> bool {
    return !file.data.is_empty()
        && file.data.len() <= MAX_UPLOAD_BYTES
        && image::guess_format(&file.data).is_ok();
}

/// Uploads every acceptable file concurrently. One failure does not affect the others.
pub async fn upload_batch(host: &dyn MediaHost, files: Vec<UploadFile>, folder: &str) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    let (accepted, rejected): (Vec<_>, Vec<_>) = files.into_iter().partition(is_uploadable);
    outcome.skipped = rejected.into_iter().map(|file| file.file_name).collect();

    let uploads = accepted.iter().map(|file| host.upload(file, folder));
    let results = join_all(uploads).await;

    for (position, (file, result)) in accepted.iter().zip(results).enumerate() {
        match result {
            Ok(media) => outcome
                .photos
                .push(Photo::uploaded(position, media.url, media.public_id)),
            Err(e) => {
                tracing::error!(file = %file.file_name, error = %e, "photo upload failed");
                outcome.failed.push(file.file_name.clone());
            }
        }
    }

    tracing::info!(
        folder,
        uploaded = outcome.photos.len(),
        failed = outcome.failed.len(),
        skipped = outcome.skipped.len(),
        "photo batch finished"
    );

    return outcome;
}

/// Cloudinary delivery URL resized to `width` with automatic quality and format.
pub fn optimized_url(url: &str, width: u32) -> String {
    return url.replacen("/upload/", &format!("/upload/w_{width},q_auto,f_auto/"), 1);
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    struct FlakyHost {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MediaHost for FlakyHost {
        async fn upload(&self, file: &UploadFile, folder: &str) -> Result<UploadedMedia> {
            self.seen.lock().unwrap().push(file.file_name.clone());

            if file.file_name.starts_with("bad") {
                return Err(anyhow::anyhow!("host rejected {}", file.file_name).into());
            }

            return Ok(UploadedMedia {
                url: format!("https://media/{folder}/{}", file.file_name),
                public_id: format!("{folder}/{}", file.file_name),
            });
        }
    }

    fn png(name: &str) -> UploadFile {
        return UploadFile {
            file_name: name.to_string(),
            content_type: Some("image/png".to_string()),
            data: PNG_HEADER.to_vec(),
        };
    }

    #[tokio::test]
    async fn failed_upload_does_not_sink_the_batch() {
        let host = FlakyHost {
            seen: Mutex::new(vec![]),
        };

        let outcome = upload_batch(
            &host,
            vec![png("a.png"), png("bad.png"), png("c.png")],
            &item_folder(3, 1),
        )
        .await;

        assert_eq!(outcome.failed, vec!["bad.png"]);
        assert_eq!(outcome.photos.len(), 2);
        assert_eq!(
            outcome.photos[0].image.as_deref(),
            Some("https://media/boardgames/3/1/a.png")
        );
        assert_eq!(
            outcome.photos[1].public_id.as_deref(),
            Some("boardgames/3/1/c.png")
        );
        assert_ne!(outcome.photos[0].id, outcome.photos[1].id);
        assert_eq!(host.seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn oversized_and_non_image_files_are_skipped() {
        let host = FlakyHost {
            seen: Mutex::new(vec![]),
        };

        let mut huge = png("huge.png");
        huge.data.resize(MAX_UPLOAD_BYTES + 1, 0);

        let notes = UploadFile {
            file_name: "notes.txt".to_string(),
            content_type: Some("text/plain".to_string()),
            data: b"pas une image".to_vec(),
        };

        let outcome = upload_batch(&host, vec![huge, notes, png("ok.png")], "boardgames/demo").await;

        assert_eq!(outcome.skipped, vec!["huge.png", "notes.txt"]);
        assert_eq!(outcome.photos.len(), 1);
        assert_eq!(*host.seen.lock().unwrap(), vec!["ok.png"]);
    }

    #[test]
    fn optimized_url_inserts_transformation() {
        assert_eq!(
            optimized_url("https://res.cloudinary.com/demo/image/upload/v1/boardgames/a.jpg", 400),
            "https://res.cloudinary.com/demo/image/upload/w_400,q_auto,f_auto/v1/boardgames/a.jpg"
        );
        assert_eq!(optimized_url("https://media/x.jpg", 400), "https://media/x.jpg");
    }
}
