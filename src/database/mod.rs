//! Firebase Realtime Database module.
//!
//! Reads and writes JSON nodes through the database's REST interface. Each
//! node is addressed by a slash-separated path and maps to `{path}.json`.

pub mod reference;

#[cfg(test)]
mod tests;

use crate::auth::session::Session;
use crate::FirebaseApp;
use reference::DatabaseReference;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur during Realtime Database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Wrapper for `reqwest::Error`.
    #[error("HTTP Request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    /// Wrapper for `reqwest_middleware::Error`.
    #[error("Middleware error: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),
    /// Errors returned by the database, e.g. "Permission denied".
    #[error("API error: {0}")]
    ApiError(String),
    /// Wrapper for `serde_json::Error`.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    /// A node URL could not be built.
    #[error("Invalid node URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// The database answers failures with `{"error": "..."}`.
#[derive(Debug, Deserialize)]
pub(crate) struct DatabaseErrorResponse {
    pub error: String,
}

/// Client for interacting with the Firebase Realtime Database.
#[derive(Clone)]
pub struct FirebaseDatabase {
    client: ClientWithMiddleware,
    base_url: String,
    session: Session,
}

impl FirebaseDatabase {
    /// Creates a new `FirebaseDatabase` instance.
    ///
    /// This is typically called via `FirebaseApp::database()`.
    pub fn new(app: &FirebaseApp) -> Self {
        let client = ClientBuilder::new(app.http_client()).build();

        Self {
            client,
            base_url: app.options().database_url(),
            session: app.session().clone(),
        }
    }

    /// Gets a `DatabaseReference` for the node at `path` (e.g. "users/alice").
    /// An empty path refers to the root.
    pub fn reference(&self, path: &str) -> DatabaseReference<'_> {
        DatabaseReference {
            client: &self.client,
            base_url: &self.base_url,
            session: &self.session,
            path: path.trim_matches('/').to_string(),
        }
    }
}
