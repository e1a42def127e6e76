//! Error handling and custom error types
//!
//! Provides unified error handling across the provider using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No file stream or buffer available for {0}")]
    MissingPayload(String),

    #[error("Cloudflare Images API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Invalid JSON response (status {status}): {body}")]
    InvalidResponse { status: u16, body: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message_embeds_status_and_body() {
        let err = Error::Api {
            status: 400,
            body: "[\"bad token\"]".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("400"));
        assert!(message.contains("bad token"));
    }

    #[test]
    fn test_missing_payload_names_file() {
        let err = Error::MissingPayload("cat.png".to_string());
        assert_eq!(
            err.to_string(),
            "No file stream or buffer available for cat.png"
        );
    }
}
