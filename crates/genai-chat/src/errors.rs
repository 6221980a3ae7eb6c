use std::path::PathBuf;

use image::{ImageError, ImageFormat};
use thiserror::Error;

const AUTHORIZATION_BODY: &str = "Please open the app from the studio that deployed it.\n\n\
Or, obtain the key from the \"Manage App\" dialog and append it to the url as \"?key=SECRET_KEY\".";

/// Raised by the access guard when a request does not carry the shared secret
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("no key provided")]
    MissingKey,

    #[error("invalid key: {0}")]
    InvalidKey(String),
}

impl AuthorizationError {
    /// Title shown in the error dialog
    pub fn title(&self) -> String {
        match self {
            AuthorizationError::MissingKey => {
                "[Authorization error] No secret key provided in the URL".to_string()
            }
            AuthorizationError::InvalidKey(key) => {
                format!("[Authorization error] The provided key (\"{}\") is invalid.", key)
            }
        }
    }

    /// Fixed explanation of how to obtain access
    pub fn body(&self) -> &'static str {
        AUTHORIZATION_BODY
    }
}

/// Failures while converting between UI payloads and model content
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode image as {format:?}: {source}")]
    EncodeImage {
        format: ImageFormat,
        #[source]
        source: ImageError,
    },

    #[error("Failed to decode image: {0}")]
    DecodeImage(#[from] ImageError),

    #[error("Invalid inline data: {0}")]
    InvalidInlineData(String),

    #[error("Not an available upload: {}", .0.display())]
    InvalidUpload(PathBuf),
}

pub type AdapterResult<T> = Result<T, AdapterError>;
