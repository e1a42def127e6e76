use super::{apply_upload_result, delete_target, log_delete_skip, StorageProvider};
use crate::config::DEFAULT_IMAGES_DOMAIN;
use crate::models::{FileRecord, UploadResult};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// In-memory stand-in for [`super::CloudflareImagesProvider`].
///
/// Applies the same skip rules and record augmentation, without the network.
#[derive(Clone)]
pub struct MockStorageProvider {
    images: Arc<Mutex<HashSet<String>>>,
    images_domain: String,
    next_id: Arc<Mutex<usize>>,
    upload_count: Arc<Mutex<usize>>,
    delete_count: Arc<Mutex<usize>>,
    check_count: Arc<Mutex<usize>>,
}

impl MockStorageProvider {
    pub fn new() -> Self {
        Self {
            images: Arc::new(Mutex::new(HashSet::new())),
            images_domain: DEFAULT_IMAGES_DOMAIN.to_string(),
            next_id: Arc::new(Mutex::new(0)),
            upload_count: Arc::new(Mutex::new(0)),
            delete_count: Arc::new(Mutex::new(0)),
            check_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_images_domain(mut self, images_domain: String) -> Self {
        self.images_domain = images_domain.trim_end_matches('/').to_string();
        self
    }

    pub fn with_image(self, image_id: String) -> Self {
        self.images.lock().unwrap().insert(image_id);
        self
    }

    pub fn get_upload_count(&self) -> usize {
        *self.upload_count.lock().unwrap()
    }

    pub fn get_delete_count(&self) -> usize {
        *self.delete_count.lock().unwrap()
    }

    pub fn get_check_count(&self) -> usize {
        *self.check_count.lock().unwrap()
    }

    pub fn get_images(&self) -> HashSet<String> {
        self.images.lock().unwrap().clone()
    }

    fn account_hash(&self) -> &str {
        self.images_domain
            .rsplit('/')
            .next()
            .unwrap_or(&self.images_domain)
    }
}

impl Default for MockStorageProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageProvider for MockStorageProvider {
    async fn upload(&self, file: &mut FileRecord) -> Result<()> {
        if file.is_thumbnail() {
            return Ok(());
        }
        if file.payload.is_none() {
            return Err(Error::MissingPayload(file.name.clone()));
        }

        *self.upload_count.lock().unwrap() += 1;

        let id = {
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            format!("mock-image-{}", *next_id)
        };
        self.images.lock().unwrap().insert(id.clone());

        let result = UploadResult {
            id,
            uploaded: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            filename: Some(file.name.clone()),
        };
        let account_hash = self.account_hash().to_string();
        apply_upload_result(file, &self.images_domain, &account_hash, result);
        Ok(())
    }

    async fn delete(&self, file: &FileRecord) -> Result<()> {
        let id = match delete_target(file) {
            Ok(id) => id,
            Err(reason) => {
                log_delete_skip(file, reason);
                return Ok(());
            }
        };

        *self.delete_count.lock().unwrap() += 1;
        self.images.lock().unwrap().remove(id);
        Ok(())
    }

    async fn check_file_existence(&self, file: &FileRecord) -> bool {
        let Some(id) = file.remote_id() else {
            return false;
        };

        *self.check_count.lock().unwrap() += 1;
        self.images.lock().unwrap().contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProviderMetadata;

    #[tokio::test]
    async fn test_mock_upload_and_delete() {
        let provider = MockStorageProvider::new();
        let mut file = FileRecord::new("cat.png", 100, "image/png").with_buffer(vec![1]);

        provider.upload(&mut file).await.unwrap();

        assert_eq!(provider.get_upload_count(), 1);
        assert_eq!(file.remote_id(), Some("mock-image-1"));
        assert_eq!(
            file.url.as_ref().unwrap().as_str(),
            "https://imagedelivery.net/mock-image-1"
        );
        assert!(provider.check_file_existence(&file).await);

        provider.delete(&file).await.unwrap();
        assert_eq!(provider.get_delete_count(), 1);
        assert!(!provider.check_file_existence(&file).await);
    }

    #[tokio::test]
    async fn test_mock_skips_thumbnail_upload() {
        let provider = MockStorageProvider::new();
        let mut file = FileRecord::new("thumbnail_cat.png", 10, "image/png").with_buffer(vec![1]);

        provider.upload(&mut file).await.unwrap();

        assert_eq!(provider.get_upload_count(), 0);
        assert!(file.url.is_none());
    }

    #[tokio::test]
    async fn test_mock_rejects_missing_payload() {
        let provider = MockStorageProvider::new();
        let mut file = FileRecord::new("cat.png", 10, "image/png");

        let result = provider.upload(&mut file).await;
        assert!(matches!(result, Err(Error::MissingPayload(_))));
    }

    #[tokio::test]
    async fn test_mock_existing_image() {
        let provider = MockStorageProvider::new().with_image("known".to_string());
        let file = FileRecord::new("a.png", 1, "image/png")
            .with_provider_metadata(ProviderMetadata::with_cloudflare_id("known"));

        assert!(provider.check_file_existence(&file).await);
        assert!(
            !provider
                .check_file_existence(&FileRecord::new("b.png", 1, "image/png"))
                .await
        );
        assert_eq!(provider.get_check_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_custom_domain() {
        let provider = MockStorageProvider::new()
            .with_images_domain("https://imagedelivery.net/hash42/".to_string());
        let mut file = FileRecord::new("cat.png", 10, "image/png").with_buffer(vec![1]);

        provider.upload(&mut file).await.unwrap();

        let metadata = file.provider_metadata.unwrap();
        assert_eq!(metadata.account_hash.as_deref(), Some("hash42"));
        assert_eq!(
            metadata.base_url.as_deref(),
            Some("https://imagedelivery.net/hash42/mock-image-1")
        );
    }

    #[tokio::test]
    async fn test_mock_ignores_empty_id() {
        let provider = MockStorageProvider::new().with_image(String::new());
        let file = FileRecord::new("a.png", 1, "image/png")
            .with_provider_metadata(ProviderMetadata::with_cloudflare_id(""));

        provider.delete(&file).await.unwrap();
        assert!(!provider.check_file_existence(&file).await);
        assert_eq!(provider.get_delete_count(), 0);
        assert_eq!(provider.get_check_count(), 0);
    }
}
