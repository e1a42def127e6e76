//! Cloudflare Images storage provider for a media library host
//!
//! Uploads host file records to Cloudflare Images, rewrites them with
//! flexible-variant delivery URLs, and deletes or checks remote images by the
//! identifier stored on the record.

pub mod config;
pub mod error;
pub mod local;
pub mod mime;
pub mod models;
pub mod provider;
pub mod variants;

pub use config::ProviderConfig;
pub use error::{Error, Result};
pub use models::{FilePayload, FileRecord, FileUrl, ProviderMetadata};
pub use provider::{CloudflareImagesProvider, MockStorageProvider, StorageProvider};
