// Publishing layer - lands fetched media and its feed entry in the repo

pub mod errors;
pub mod github;
pub mod index;
pub mod naming;

pub use errors::PublishError;
pub use github::GithubClient;
pub use index::ReelEntry;

/// The GitHub contents API refuses blobs larger than this
pub const MAX_UPLOAD_BYTES: usize = 95 * 1024 * 1024;

/// Everything needed to land one media object and its feed entry
pub struct UploadRequest {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub datetime: String,
}

pub struct PublishReceipt {
    pub media_path: String,
    pub raw_url: String,
    pub entry: ReelEntry,
}

/// Upload the media blob, then append the feed entry. The size ceiling is
/// checked before any network call so an oversized fetch never half-lands.
pub async fn publish_media(
    github: &GithubClient,
    upload: UploadRequest,
) -> Result<PublishReceipt, PublishError> {
    if upload.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(PublishError::TooLarge {
            size: upload.bytes.len(),
        });
    }

    let media_path = format!("{}/{}", github.config().media_dir, upload.file_name);
    let message = format!("feat(media): add {}", upload.file_name);
    eprintln!(
        "[Publish] Uploading {} ({} bytes)",
        media_path,
        upload.bytes.len()
    );
    github
        .put_file(&media_path, &message, &upload.bytes, None)
        .await?;

    // Cache-bust so feed players pick up the new object immediately.
    let src = format!("{}?v={}", github.raw_url(&media_path), upload.datetime);
    let entry = index::record_entry(
        github,
        &upload.file_name,
        src,
        upload.caption,
        upload.hashtags,
        upload.datetime,
    )
    .await?;

    Ok(PublishReceipt {
        raw_url: github.raw_url(&media_path),
        media_path,
        entry,
    })
}
