//! Firebase project configuration.
//!
//! `FirebaseOptions` enumerates every option the providers recognize. Options are
//! validated eagerly by [`FirebaseApp::initialize`](crate::FirebaseApp::initialize),
//! so a misconfigured project fails at startup rather than on the first request.
//!
//! # Examples
//!
//! ```rust,no_run
//! # use backend_providers::config::FirebaseOptions;
//! let options = FirebaseOptions::new("my-project", "AIza...")
//!     .with_storage_bucket("my-project.appspot.com")
//!     .with_messaging_sender_id("1234567890");
//! ```

use crate::messaging::models::PushSubscription;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const IDENTITY_TOOLKIT_V1_API: &str = "https://identitytoolkit.googleapis.com/v1";
const FIRESTORE_V1_API: &str = "https://firestore.googleapis.com/v1";
const STORAGE_V0_API: &str = "https://firebasestorage.googleapis.com/v0";
const INSTALLATIONS_V1_API: &str = "https://firebaseinstallations.googleapis.com/v1";
const FCM_REGISTRATIONS_V1_API: &str = "https://fcmregistrations.googleapis.com/v1";

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required option is empty.
    #[error("Missing required option: {0}")]
    MissingField(&'static str),
    /// An option holds a value the backend can never accept.
    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
    /// A URL option failed to parse.
    #[error("Invalid URL for {field}: {source}")]
    InvalidUrl {
        field: &'static str,
        #[source]
        source: url::ParseError,
    },
    /// A required environment variable is not set.
    #[error("Environment variable {0} is not set")]
    MissingEnv(&'static str),
    /// Wrapper for `toml::de::Error`.
    #[error("Failed to parse TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Base URLs of the Firebase REST APIs.
///
/// The defaults point at Google's production endpoints. Override them to target
/// the local emulator suite or a mock server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub identity_toolkit: String,
    pub firestore: String,
    pub storage: String,
    pub installations: String,
    pub fcm_registrations: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            identity_toolkit: IDENTITY_TOOLKIT_V1_API.to_string(),
            firestore: FIRESTORE_V1_API.to_string(),
            storage: STORAGE_V0_API.to_string(),
            installations: INSTALLATIONS_V1_API.to_string(),
            fcm_registrations: FCM_REGISTRATIONS_V1_API.to_string(),
        }
    }
}

impl Endpoints {
    /// Points every API at the same root, e.g. a single mock server.
    pub fn all_at(root: &str) -> Self {
        let root = root.trim_end_matches('/');
        Self {
            identity_toolkit: format!("{}/identitytoolkit/v1", root),
            firestore: format!("{}/firestore/v1", root),
            storage: format!("{}/storage/v0", root),
            installations: format!("{}/installations/v1", root),
            fcm_registrations: format!("{}/fcmregistrations/v1", root),
        }
    }
}

/// Configuration for a Firebase project.
#[derive(Debug, Clone, Deserialize)]
pub struct FirebaseOptions {
    /// The Firebase project ID.
    pub project_id: String,
    /// The Web API key of the project.
    pub api_key: SecretString,
    /// The Cloud Storage bucket. Defaults to `{project_id}.appspot.com`.
    #[serde(default)]
    pub storage_bucket: Option<String>,
    /// Sender ID used by Cloud Messaging. Messaging is disabled without it.
    #[serde(default)]
    pub messaging_sender_id: Option<String>,
    /// The Firebase App ID (`1:1234:web:abcd`). Messaging is disabled without it.
    #[serde(default)]
    pub app_id: Option<String>,
    /// Realtime Database URL. Defaults to `https://{project_id}-default-rtdb.firebaseio.com`.
    #[serde(default)]
    pub database_url: Option<String>,
    /// Web push subscription to register for Cloud Messaging.
    #[serde(default)]
    pub web_push: Option<PushSubscription>,
    #[serde(default)]
    pub endpoints: Endpoints,
}

impl FirebaseOptions {
    pub fn new(project_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            api_key: SecretString::new(api_key.into()),
            storage_bucket: None,
            messaging_sender_id: None,
            app_id: None,
            database_url: None,
            web_push: None,
            endpoints: Endpoints::default(),
        }
    }

    /// Loads options from `FIREBASE_*` environment variables.
    ///
    /// Reads:
    /// - `FIREBASE_PROJECT_ID` (required)
    /// - `FIREBASE_API_KEY` (required)
    /// - `FIREBASE_STORAGE_BUCKET`, `FIREBASE_MESSAGING_SENDER_ID`,
    ///   `FIREBASE_APP_ID`, `FIREBASE_DATABASE_URL` (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        let project_id = std::env::var("FIREBASE_PROJECT_ID")
            .map_err(|_| ConfigError::MissingEnv("FIREBASE_PROJECT_ID"))?;
        let api_key = std::env::var("FIREBASE_API_KEY")
            .map_err(|_| ConfigError::MissingEnv("FIREBASE_API_KEY"))?;

        let mut options = Self::new(project_id, api_key);
        options.storage_bucket = std::env::var("FIREBASE_STORAGE_BUCKET").ok();
        options.messaging_sender_id = std::env::var("FIREBASE_MESSAGING_SENDER_ID").ok();
        options.app_id = std::env::var("FIREBASE_APP_ID").ok();
        options.database_url = std::env::var("FIREBASE_DATABASE_URL").ok();
        Ok(options)
    }

    /// Parses options from a TOML document.
    ///
    /// ```toml
    /// project_id = "my-project"
    /// api_key = "AIza..."
    /// storage_bucket = "my-project.appspot.com"
    ///
    /// [endpoints]
    /// firestore = "http://localhost:8080/v1"
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn with_storage_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.storage_bucket = Some(bucket.into());
        self
    }

    pub fn with_messaging_sender_id(mut self, sender_id: impl Into<String>) -> Self {
        self.messaging_sender_id = Some(sender_id.into());
        self
    }

    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn with_web_push(mut self, subscription: PushSubscription) -> Self {
        self.web_push = Some(subscription);
        self
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// The storage bucket, falling back to the project's default bucket.
    pub fn storage_bucket(&self) -> String {
        match &self.storage_bucket {
            Some(bucket) => bucket.clone(),
            None => format!("{}.appspot.com", self.project_id),
        }
    }

    /// The Realtime Database URL, falling back to the project's default instance.
    pub fn database_url(&self) -> String {
        match &self.database_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}-default-rtdb.firebaseio.com", self.project_id),
        }
    }

    /// Checks every option the backends cannot accept.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project_id.trim().is_empty() {
            return Err(ConfigError::MissingField("project_id"));
        }
        if self.project_id.contains('/') {
            return Err(ConfigError::InvalidField {
                field: "project_id",
                reason: "must not contain '/'".to_string(),
            });
        }
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(ConfigError::MissingField("api_key"));
        }
        if matches!(&self.storage_bucket, Some(bucket) if bucket.trim().is_empty()) {
            return Err(ConfigError::MissingField("storage_bucket"));
        }

        let urls = [
            ("database_url", self.database_url()),
            ("endpoints.identity_toolkit", self.endpoints.identity_toolkit.clone()),
            ("endpoints.firestore", self.endpoints.firestore.clone()),
            ("endpoints.storage", self.endpoints.storage.clone()),
            ("endpoints.installations", self.endpoints.installations.clone()),
            ("endpoints.fcm_registrations", self.endpoints.fcm_registrations.clone()),
        ];
        for (field, value) in urls {
            Url::parse(&value).map_err(|source| ConfigError::InvalidUrl { field, source })?;
        }

        Ok(())
    }
}
