//! Storage provider integration
//!
//! Delegates media persistence to Cloudflare Images: uploads file records,
//! attaches delivery URLs and metadata, and deletes or checks remote images
//! by their stored identifier.

pub mod client;
pub mod mock;

pub use client::CloudflareImagesProvider;
pub use mock::MockStorageProvider;

use crate::models::{
    FileRecord, FlexibleExamples, FormatDescriptor, Formats, ProviderMetadata, UploadResult,
    THUMBNAIL_PREFIX,
};
use crate::variants::{thumbnail_url, THUMBNAIL_HEIGHT, THUMBNAIL_WIDTH};
use crate::{FileUrl, Result};
use async_trait::async_trait;

#[async_trait]
pub trait StorageProvider: Send + Sync {
    async fn upload(&self, file: &mut FileRecord) -> Result<()>;

    async fn upload_stream(&self, file: &mut FileRecord) -> Result<()> {
        self.upload(file).await
    }

    async fn delete(&self, file: &FileRecord) -> Result<()>;

    /// Advisory check. Failures are reported as `false`, never as an error.
    async fn check_file_existence(&self, file: &FileRecord) -> bool;
}

/// Why a delete call can be skipped without contacting the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeleteSkip {
    ThumbnailName,
    ThumbnailMetadata,
    MissingId,
}

/// Remote id to delete, or the reason the record has nothing on the remote side.
pub(crate) fn delete_target(file: &FileRecord) -> std::result::Result<&str, DeleteSkip> {
    if file.is_thumbnail() {
        return Err(DeleteSkip::ThumbnailName);
    }
    if file.provider_metadata.as_ref().is_some_and(|m| m.is_thumbnail) {
        return Err(DeleteSkip::ThumbnailMetadata);
    }
    file.remote_id().ok_or(DeleteSkip::MissingId)
}

pub(crate) fn log_delete_skip(file: &FileRecord, reason: DeleteSkip) {
    match reason {
        DeleteSkip::ThumbnailName => {
            tracing::info!("Skipping thumbnail deletion (never uploaded): {}", file.name)
        }
        DeleteSkip::ThumbnailMetadata => {
            tracing::info!("Skipping thumbnail deletion from metadata: {}", file.name)
        }
        DeleteSkip::MissingId => tracing::warn!(
            "No Cloudflare ID found for file deletion, skipping: {}",
            file.name
        ),
    }
}

/// Writes the delivery URL, thumbnail format and provider metadata for a
/// successful upload onto the record.
pub(crate) fn apply_upload_result(
    file: &mut FileRecord,
    images_domain: &str,
    account_hash: &str,
    result: UploadResult,
) {
    let base_url = format!("{}/{}", images_domain, result.id);

    let thumbnail = FormatDescriptor {
        name: format!("{}{}", THUMBNAIL_PREFIX, file.name),
        hash: format!("{}{}", THUMBNAIL_PREFIX, file.hash),
        ext: file.ext.clone(),
        mime: file.mime.clone(),
        width: THUMBNAIL_WIDTH,
        height: THUMBNAIL_HEIGHT,
        size: (file.size as f64 * 0.1).round() as u64,
        url: thumbnail_url(&base_url),
        provider_metadata: ProviderMetadata {
            cloudflare_id: Some(result.id.clone()),
            is_thumbnail: true,
            base_url: Some(base_url.clone()),
            ..ProviderMetadata::default()
        },
    };

    file.url = Some(FileUrl::new(base_url.clone()));
    file.formats = Some(Formats { thumbnail });
    file.provider_metadata = Some(ProviderMetadata {
        cloudflare_id: Some(result.id),
        is_thumbnail: false,
        uploaded_at: result.uploaded,
        filename: result.filename,
        base_url: Some(base_url.clone()),
        images_domain: Some(images_domain.to_string()),
        account_hash: Some(account_hash.to_string()),
        flexible_examples: Some(FlexibleExamples::for_base_url(&base_url)),
    });
}
