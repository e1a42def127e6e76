use super::{apply_upload_result, delete_target, log_delete_skip, StorageProvider};
use crate::config::ProviderConfig;
use crate::mime::FALLBACK_MIME;
use crate::models::{FilePayload, FileRecord, UploadMetadata, UploadResponse};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, StatusCode};

const PROVIDER_TAG: &str = "cloudflare-images";

/// Cloudflare Images backed storage provider.
///
/// Holds only the validated configuration and a shared HTTP client, so one
/// instance can serve concurrent calls for different files.
#[derive(Debug)]
pub struct CloudflareImagesProvider {
    client: Client,
    config: ProviderConfig,
}

impl CloudflareImagesProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        Self::new_with_client(config, Client::new())
    }

    pub fn new_with_client(config: ProviderConfig, client: Client) -> Result<Self> {
        config.validate()?;

        tracing::info!("Cloudflare Images provider initialized");
        tracing::info!("  - Account ID: {}", config.account_id);
        tracing::info!("  - Images domain: {}", config.images_domain);
        tracing::info!("  - Signed URLs: {}", config.require_signed_urls);
        tracing::info!("  - Using flexible variants (no fixed variants)");

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn build_form(&self, file: &mut FileRecord) -> Result<Form> {
        // Checked before the payload is taken so a stream is never lost on error.
        let content_type = content_type_for(&file.mime);

        let part = match file.payload.take() {
            Some(FilePayload::Stream(stream)) => Part::stream(Body::wrap_stream(stream)),
            Some(FilePayload::Buffer(bytes)) => {
                let len = bytes.len() as u64;
                file.payload = Some(FilePayload::Buffer(bytes.clone()));
                Part::stream_with_length(Body::from(bytes), len)
            }
            None => return Err(Error::MissingPayload(file.name.clone())),
        };
        let part = part.file_name(file.name.clone()).mime_str(content_type)?;

        let metadata = UploadMetadata {
            original_name: file.name.clone(),
            uploaded_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            strapi_provider: PROVIDER_TAG.to_string(),
        };

        Ok(Form::new()
            .part("file", part)
            .text("requireSignedURLs", self.config.require_signed_urls.to_string())
            .text("metadata", serde_json::to_string(&metadata)?))
    }
}

/// Content type for the `file` part. Values that do not parse as a MIME type
/// are sent as `application/octet-stream`.
fn content_type_for(mime: &str) -> &str {
    match mime.parse::<::mime::Mime>() {
        Ok(_) => mime,
        Err(e) => {
            tracing::warn!(
                "Invalid MIME type '{}' ({}), sending as {}",
                mime,
                e,
                FALLBACK_MIME
            );
            FALLBACK_MIME
        }
    }
}

#[async_trait]
impl StorageProvider for CloudflareImagesProvider {
    async fn upload(&self, file: &mut FileRecord) -> Result<()> {
        if file.is_thumbnail() {
            tracing::info!("Skipping thumbnail upload: {}", file.name);
            return Ok(());
        }

        let form = self.build_form(file)?;

        tracing::info!(
            "Uploading {} ({} bytes) to Cloudflare Images...",
            file.name,
            file.size
        );

        let response = self
            .client
            .post(self.config.images_endpoint())
            .bearer_auth(&self.config.access_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send upload request to Cloudflare Images: {}", e);
                e
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!("Upload failed: {} - {}", status, body);
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let data: UploadResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse response JSON: {}\nBody: {}", e, body);
            Error::InvalidResponse {
                status: status.as_u16(),
                body: body.clone(),
            }
        })?;

        if !data.success {
            let errors = data
                .errors
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Unknown error".to_string());
            tracing::error!("Cloudflare API returned error: {}", errors);
            return Err(Error::Api {
                status: status.as_u16(),
                body: errors,
            });
        }

        let result = data.result.ok_or_else(|| Error::InvalidResponse {
            status: status.as_u16(),
            body: body.clone(),
        })?;

        apply_upload_result(
            file,
            &self.config.images_domain,
            self.config.account_hash(),
            result,
        );

        if let (Some(url), Some(formats)) = (&file.url, &file.formats) {
            tracing::info!("File uploaded: {}", file.name);
            tracing::info!("Base URL: {}", url);
            tracing::info!("Thumbnail URL: {}", formats.thumbnail.url);
            tracing::debug!(
                "Example usage: {}/format=webp,width=800,height=600,fit=cover,quality=85",
                url
            );
        }

        Ok(())
    }

    async fn delete(&self, file: &FileRecord) -> Result<()> {
        let image_id = match delete_target(file) {
            Ok(image_id) => image_id,
            Err(reason) => {
                log_delete_skip(file, reason);
                return Ok(());
            }
        };

        let response = self
            .client
            .delete(self.config.image_endpoint(image_id))
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send delete request to Cloudflare Images: {}", e);
                e
            })?;

        let status = response.status();
        if status.is_success() {
            tracing::info!("File deleted from Cloudflare Images: {}", file.name);
            return Ok(());
        }
        if status == StatusCode::NOT_FOUND {
            tracing::info!("File already deleted from Cloudflare Images: {}", file.name);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_else(|e| {
            tracing::error!("Failed to read delete response body: {}", e);
            String::new()
        });
        tracing::error!("Cloudflare Images delete failed: {} - {}", status, body);
        Err(Error::Api {
            status: status.as_u16(),
            body,
        })
    }

    async fn check_file_existence(&self, file: &FileRecord) -> bool {
        let Some(image_id) = file.remote_id() else {
            return false;
        };

        match self
            .client
            .get(self.config.image_endpoint(image_id))
            .bearer_auth(&self.config.access_token)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::error!("Error checking file existence: {}", e);
                false
            }
        }
    }
}
