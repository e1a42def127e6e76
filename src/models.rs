//! Data models and structures
//!
//! Defines the file record the host hands to the provider, the fields the
//! provider attaches after an upload, and the Cloudflare Images API payloads.

use bytes::Bytes;
use futures_util::stream::Stream;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::pin::Pin;

pub const THUMBNAIL_PREFIX: &str = "thumbnail_";

/// `Sync` so records can be shared by reference across `.await` points.
pub type ByteStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send + Sync>>;

/// File contents as supplied by the host: a readable stream or an in-memory buffer.
pub enum FilePayload {
    Stream(ByteStream),
    Buffer(Bytes),
}

impl fmt::Debug for FilePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilePayload::Stream(_) => f.write_str("Stream(..)"),
            FilePayload::Buffer(bytes) => write!(f, "Buffer({} bytes)", bytes.len()),
        }
    }
}

/// Public delivery URL of an uploaded image.
///
/// Fixed at construction. There is no way to change or extend it afterwards,
/// and both `as_str` and `Display` yield exactly the stored base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileUrl(String);

impl FileUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FileUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileRecord {
    pub name: String,
    pub hash: String,
    pub ext: String,
    /// Size in bytes.
    pub size: u64,
    pub mime: String,
    #[serde(skip)]
    pub payload: Option<FilePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<FileUrl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formats: Option<Formats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_metadata: Option<ProviderMetadata>,
}

impl FileRecord {
    pub fn new(name: impl Into<String>, size: u64, mime: impl Into<String>) -> Self {
        let name = name.into();
        let path = Path::new(&name);
        let hash = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.clone());
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        Self {
            name,
            hash,
            ext,
            size,
            mime: mime.into(),
            payload: None,
            url: None,
            formats: None,
            provider_metadata: None,
        }
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = hash.into();
        self
    }

    pub fn with_ext(mut self, ext: impl Into<String>) -> Self {
        self.ext = ext.into();
        self
    }

    pub fn with_buffer(mut self, buffer: impl Into<Bytes>) -> Self {
        self.payload = Some(FilePayload::Buffer(buffer.into()));
        self
    }

    pub fn with_stream(mut self, stream: ByteStream) -> Self {
        self.payload = Some(FilePayload::Stream(stream));
        self
    }

    pub fn with_provider_metadata(mut self, metadata: ProviderMetadata) -> Self {
        self.provider_metadata = Some(metadata);
        self
    }

    /// True for derived thumbnail variants the host asks us to persist.
    pub fn is_thumbnail(&self) -> bool {
        self.name.starts_with(THUMBNAIL_PREFIX)
    }

    /// Stored Cloudflare image id. An empty id counts as absent.
    pub fn remote_id(&self) -> Option<&str> {
        self.provider_metadata
            .as_ref()
            .and_then(|m| m.cloudflare_id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formats {
    pub thumbnail: FormatDescriptor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    pub name: String,
    pub hash: String,
    pub ext: String,
    pub mime: String,
    pub width: u32,
    pub height: u32,
    pub size: u64,
    pub url: String,
    pub provider_metadata: ProviderMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloudflare_id: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_thumbnail: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flexible_examples: Option<FlexibleExamples>,
}

impl ProviderMetadata {
    pub fn with_cloudflare_id(id: impl Into<String>) -> Self {
        Self {
            cloudflare_id: Some(id.into()),
            ..Self::default()
        }
    }
}

/// Ready-made transform URLs for downstream consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlexibleExamples {
    pub webp: String,
    pub quality: String,
    pub resize: String,
    pub combined: String,
    pub thumbnail: String,
    pub mobile: String,
    pub desktop: String,
}

// Cloudflare Images API models
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMetadata {
    pub original_name: String,
    pub uploaded_at: String,
    pub strapi_provider: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub result: Option<UploadResult>,
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResult {
    pub id: String,
    pub uploaded: Option<String>,
    pub filename: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_derives_hash_and_ext() {
        let record = FileRecord::new("holiday.photo.jpg", 1000, "image/jpeg");
        assert_eq!(record.hash, "holiday.photo");
        assert_eq!(record.ext, ".jpg");
        assert!(record.payload.is_none());
        assert!(!record.is_thumbnail());
    }

    #[test]
    fn test_thumbnail_prefix_detection() {
        let record = FileRecord::new("thumbnail_cat.png", 10, "image/png");
        assert!(record.is_thumbnail());
    }

    #[test]
    fn test_remote_id_from_metadata() {
        let record = FileRecord::new("cat.png", 10, "image/png")
            .with_provider_metadata(ProviderMetadata::with_cloudflare_id("abc123"));
        assert_eq!(record.remote_id(), Some("abc123"));
        assert_eq!(FileRecord::new("cat.png", 10, "image/png").remote_id(), None);

        let empty = FileRecord::new("cat.png", 10, "image/png")
            .with_provider_metadata(ProviderMetadata::with_cloudflare_id(""));
        assert_eq!(empty.remote_id(), None);
    }

    #[test]
    fn test_file_url_display_is_fixed() {
        let url = FileUrl::new("https://imagedelivery.net/abc123");
        assert_eq!(url.to_string(), "https://imagedelivery.net/abc123");
        assert_eq!(url.as_str(), "https://imagedelivery.net/abc123");
        assert_eq!(url.clone(), url);
        assert_eq!(
            serde_json::to_string(&url).unwrap(),
            "\"https://imagedelivery.net/abc123\""
        );
    }

    #[test]
    fn test_record_json_shape() {
        let record = FileRecord::new("cat.png", 10, "image/png")
            .with_buffer(vec![1, 2, 3])
            .with_provider_metadata(ProviderMetadata::with_cloudflare_id("abc123"));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["provider_metadata"]["cloudflare_id"], "abc123");
        assert!(json.get("payload").is_none());
        assert!(json["provider_metadata"].get("is_thumbnail").is_none());

        let restored: FileRecord = serde_json::from_value(json).unwrap();
        assert_eq!(restored.remote_id(), Some("abc123"));
        assert!(restored.payload.is_none());
    }

    #[test]
    fn test_upload_response_without_errors_field() {
        let response: UploadResponse = serde_json::from_str(
            r#"{"success":true,"result":{"id":"abc","uploaded":"2024-01-01T00:00:00Z","filename":"a.png","variants":[]}}"#,
        )
        .unwrap();
        assert!(response.success);
        assert_eq!(response.result.unwrap().id, "abc");
        assert!(response.errors.is_none());
    }

    #[test]
    fn test_upload_metadata_uses_camel_case() {
        let metadata = UploadMetadata {
            original_name: "a.png".to_string(),
            uploaded_at: "2024-01-01T00:00:00Z".to_string(),
            strapi_provider: "cloudflare-images".to_string(),
        };
        let json = serde_json::to_string(&metadata).unwrap();
        assert!(json.contains("\"originalName\":\"a.png\""));
        assert!(json.contains("\"strapiProvider\":\"cloudflare-images\""));
    }
}
