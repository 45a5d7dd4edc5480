//! Cloud Storage for Firebase module.
//!
//! Uploads, download URLs and deletes through the Firebase Storage REST API.
//! Objects are addressed by their path inside the project's bucket.
//!
//! # Examples
//!
//! ```rust,ignore
//! # use backend_providers::FirebaseApp;
//! # async fn run(app: FirebaseApp) {
//! let storage = app.storage();
//! let file = storage.file("avatars/alice.png");
//! let metadata = file.save(vec![0u8; 16], "image/png").await.unwrap();
//! let url = file.download_url().await.unwrap();
//! # }
//! ```

pub mod file;

use crate::core::middleware::SessionMiddleware;
use crate::FirebaseApp;
use file::File;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use thiserror::Error;

/// Errors that can occur during Storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Wrapper for `reqwest::Error`.
    #[error("HTTP Request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    /// Wrapper for `reqwest_middleware::Error`.
    #[error("Middleware error: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),
    /// Errors returned by the Storage API.
    #[error("API error: {0}")]
    ApiError(String),
    /// Wrapper for `serde_json::Error`.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    /// No object exists at the given path.
    #[error("Object not found: {0}")]
    ObjectNotFound(String),
    /// The object has no download token, so no download URL can be built.
    #[error("Object has no download token: {0}")]
    NoDownloadToken(String),
    /// An object URL could not be built.
    #[error("Invalid object URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Client for interacting with Cloud Storage for Firebase.
#[derive(Clone)]
pub struct FirebaseStorage {
    client: ClientWithMiddleware,
    base_url: String,
    bucket: String,
}

impl FirebaseStorage {
    /// Creates a new `FirebaseStorage` instance.
    ///
    /// This is typically called via `FirebaseApp::storage()`.
    pub fn new(app: &FirebaseApp) -> Self {
        let options = app.options();
        let client = ClientBuilder::new(app.http_client())
            .with(SessionMiddleware::new(app.session().clone()))
            .build();

        Self {
            client,
            base_url: options.endpoints.storage.trim_end_matches('/').to_string(),
            bucket: options.storage_bucket(),
        }
    }

    /// The bucket objects are stored in.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Gets a `File` instance that refers to the object at the specified path.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the object within the bucket (e.g., "images/profile.png").
    pub fn file(&self, path: &str) -> File {
        File::new(
            self.client.clone(),
            self.base_url.clone(),
            self.bucket.clone(),
            path.trim_start_matches('/').to_string(),
        )
    }
}

#[cfg(test)]
mod tests;
