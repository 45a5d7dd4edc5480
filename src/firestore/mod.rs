//! Cloud Firestore module.
//!
//! Document reads and writes through the Firestore REST API, using
//! `CollectionReference` and `DocumentReference` handles in the style of the
//! Firebase client SDKs. Documents travel as `serde_json` values and are
//! converted to and from Firestore's typed value encoding.

pub mod models;
pub mod reference;
pub mod snapshot;


use self::reference::{CollectionReference, DocumentReference};
use crate::core::encode_path_segment;
use crate::core::middleware::{ApiKeyMiddleware, SessionMiddleware};
use crate::FirebaseApp;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use thiserror::Error;

const FIRESTORE_DOCUMENTS_PATH: &str = "projects/{project_id}/databases/(default)/documents";

/// Errors that can occur during Firestore operations.
#[derive(Error, Debug)]
pub enum FirestoreError {
    /// Wrapper for `reqwest::Error`.
    #[error("HTTP Request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    /// Wrapper for `reqwest_middleware::Error`.
    #[error("Middleware error: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),
    /// Errors returned by the Firestore API.
    #[error("API error: {0}")]
    ApiError(String),
    /// An update targeted a document that does not exist.
    #[error("Document not found: {0}")]
    NotFound(String),
    /// Wrapper for `serde_json::Error`.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    /// A document URL could not be built.
    #[error("Invalid document URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Client for interacting with Cloud Firestore.
#[derive(Clone)]
pub struct FirebaseFirestore {
    client: ClientWithMiddleware,
    base_url: String,
}

impl FirebaseFirestore {
    /// Creates a new `FirebaseFirestore` instance.
    ///
    /// This is typically called via `FirebaseApp::firestore()`.
    pub fn new(app: &FirebaseApp) -> Self {
        let options = app.options();
        let client = ClientBuilder::new(app.http_client())
            .with(ApiKeyMiddleware::new(options.api_key.clone()))
            .with(SessionMiddleware::new(app.session().clone()))
            .build();

        let base_url = format!(
            "{}/{}",
            options.endpoints.firestore.trim_end_matches('/'),
            FIRESTORE_DOCUMENTS_PATH.replace("{project_id}", &options.project_id)
        );

        Self { client, base_url }
    }

    /// Gets a `CollectionReference` instance that refers to the collection at the specified path.
    ///
    /// # Arguments
    ///
    /// * `collection_id` - The ID of the collection (e.g., "users").
    pub fn collection(&self, collection_id: &str) -> CollectionReference<'_> {
        CollectionReference {
            client: &self.client,
            path: format!("{}/{}", self.base_url, encode_document_path(collection_id)),
            id: collection_id.rsplit('/').next().unwrap_or(collection_id).to_string(),
        }
    }

    /// Gets a `DocumentReference` instance that refers to the document at the specified path.
    ///
    /// # Arguments
    ///
    /// * `document_path` - The slash-separated path to the document (e.g., "users/user1").
    pub fn doc(&self, document_path: &str) -> DocumentReference<'_> {
        DocumentReference {
            client: &self.client,
            path: format!("{}/{}", self.base_url, encode_document_path(document_path)),
            id: document_path.rsplit('/').next().unwrap_or(document_path).to_string(),
        }
    }
}

/// Percent-encodes every segment of a slash-separated document path.
pub(crate) fn encode_document_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(encode_path_segment)
        .collect::<Vec<_>>()
        .join("/")
}
