//! Provider configuration
//!
//! Holds the Cloudflare credentials and delivery settings the provider is
//! initialized with. The value is read-only once the provider is built.

use crate::{Error, Result};
use std::fmt;

pub const DEFAULT_IMAGES_DOMAIN: &str = "https://imagedelivery.net";
pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudflare.com";

#[derive(Clone)]
pub struct ProviderConfig {
    pub access_token: String,
    pub account_id: String,
    pub images_domain: String,
    pub require_signed_urls: bool,
    pub api_base_url: String,
}

impl ProviderConfig {
    pub fn new(access_token: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            account_id: account_id.into(),
            images_domain: DEFAULT_IMAGES_DOMAIN.to_string(),
            require_signed_urls: false,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    pub fn with_images_domain(mut self, images_domain: impl Into<String>) -> Self {
        self.images_domain = images_domain.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_require_signed_urls(mut self, require_signed_urls: bool) -> Self {
        self.require_signed_urls = require_signed_urls;
        self
    }

    /// Points API calls at another host. Only useful against a local mock server.
    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.access_token.is_empty() {
            return Err(Error::Config(
                "Cloudflare Images access token is required".to_string(),
            ));
        }
        if self.account_id.is_empty() {
            return Err(Error::Config(
                "Cloudflare account ID is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Last path segment of the images domain, e.g. the account hash in
    /// `https://imagedelivery.net/<hash>`.
    pub fn account_hash(&self) -> &str {
        self.images_domain
            .rsplit('/')
            .next()
            .unwrap_or(&self.images_domain)
    }

    pub fn images_endpoint(&self) -> String {
        format!(
            "{}/client/v4/accounts/{}/images/v1",
            self.api_base_url, self.account_id
        )
    }

    pub fn image_endpoint(&self, image_id: &str) -> String {
        format!("{}/{}", self.images_endpoint(), image_id)
    }

    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_token = lookup("CLOUDFLARE_API_TOKEN")
            .ok_or_else(|| Error::Config("CLOUDFLARE_API_TOKEN not set".to_string()))?;
        let account_id = lookup("CLOUDFLARE_ACCOUNT_ID")
            .ok_or_else(|| Error::Config("CLOUDFLARE_ACCOUNT_ID not set".to_string()))?;

        let mut config = Self::new(access_token, account_id);

        if let Some(domain) = lookup("CLOUDFLARE_IMAGES_DOMAIN") {
            config = config.with_images_domain(domain);
        }
        if let Some(flag) = lookup("CLOUDFLARE_REQUIRE_SIGNED_URLS") {
            config = config.with_require_signed_urls(parse_bool(&flag)?);
        }
        if let Some(base_url) = lookup("CLOUDFLARE_API_BASE_URL") {
            config = config.with_api_base_url(base_url);
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(Error::Config(format!(
            "CLOUDFLARE_REQUIRE_SIGNED_URLS must be true or false, got '{}'",
            other
        ))),
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("access_token", &"<redacted>")
            .field("account_id", &self.account_id)
            .field("images_domain", &self.images_domain)
            .field("require_signed_urls", &self.require_signed_urls)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}
