//! The Firebase backend adapter.
//!
//! [`FirebaseProvider`] puts Firestore, Authentication, Storage, the Realtime
//! Database and Cloud Messaging behind one object with plain pass-through
//! methods. Documents travel as [`DocumentData`] maps with the document id
//! merged in under `"id"`.
//!
//! # Examples
//!
//! ```rust,ignore
//! use backend_providers::{FirebaseApp, FirebaseOptions, FirebaseProvider};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let app = FirebaseApp::initialize(FirebaseOptions::from_env()?)?;
//! let provider = FirebaseProvider::new(&app);
//!
//! let data = json!({ "title": "Hello" }).as_object().cloned().unwrap_or_default();
//! let post = provider.add_document("posts", data).await?;
//! println!("created post {}", post["id"]);
//! # Ok(())
//! # }
//! ```


use crate::auth::models::User;
use crate::auth::{AuthError, FirebaseAuth};
use crate::database::{DatabaseError, FirebaseDatabase};
use crate::firestore::models::DocumentData;
use crate::firestore::{FirebaseFirestore, FirestoreError};
use crate::messaging::models::MessagePayload;
use crate::messaging::subscription::MessageSubscription;
use crate::messaging::{FirebaseMessaging, MessagingError};
use crate::storage::{FirebaseStorage, StorageError};
use crate::FirebaseApp;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

const USERS_COLLECTION: &str = "users";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Errors returned by [`FirebaseProvider`].
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Firestore(#[from] FirestoreError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Messaging(#[from] MessagingError),
    /// Messaging could not be set up for this app.
    #[error("Messaging not initialized.")]
    MessagingNotInitialized,
}

/// The result of [`FirebaseProvider::upload_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub path: String,
    pub url: String,
}

/// Firebase document, auth, file, realtime and messaging operations behind
/// a single adapter.
#[derive(Clone)]
pub struct FirebaseProvider {
    app: FirebaseApp,
    auth: FirebaseAuth,
    firestore: FirebaseFirestore,
    storage: FirebaseStorage,
    database: FirebaseDatabase,
    messaging: Option<FirebaseMessaging>,
}

impl FirebaseProvider {
    pub const VERSION: &'static str = "1.0.0";
    pub const ICON: &'static str = "https://cdn.brandfetch.io/idS725vGg6/w/400/h/400/theme/dark/icon.png?c=1bxid64Mup7aczewSAYMX&t=1760226348459";

    /// Builds the adapter on top of an initialized app.
    ///
    /// Messaging is optional: when the app's options cannot support it, a
    /// warning is logged and the messaging operations fail with
    /// [`ProviderError::MessagingNotInitialized`].
    pub fn new(app: &FirebaseApp) -> Self {
        let messaging = match app.messaging() {
            Ok(messaging) => Some(messaging),
            Err(e) => {
                tracing::warn!(error = %e, "Firebase Messaging not supported in this environment");
                None
            }
        };

        Self {
            app: app.clone(),
            auth: app.auth(),
            firestore: app.firestore(),
            storage: app.storage(),
            database: app.database(),
            messaging,
        }
    }

    /// The app this provider was built from.
    pub fn app(&self) -> &FirebaseApp {
        &self.app
    }

    // Firestore

    /// Adds a document with a backend-assigned id; returns `data` with that id.
    pub async fn add_document(
        &self,
        collection: &str,
        data: DocumentData,
    ) -> Result<DocumentData, ProviderError> {
        let snapshot = self.firestore.collection(collection).add(&data).await?;
        Ok(with_id(data, snapshot.id()))
    }

    /// Reads a document. A missing document is `None`.
    pub async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<DocumentData>, ProviderError> {
        let snapshot = self.firestore.collection(collection).doc(id).get().await?;
        Ok(snapshot.data_with_id()?)
    }

    /// Updates the fields present in `partial`, leaving the others untouched.
    ///
    /// Fails with the backend's NOT_FOUND error when the document does not exist.
    pub async fn update_document(
        &self,
        collection: &str,
        id: &str,
        partial: DocumentData,
    ) -> Result<DocumentData, ProviderError> {
        self.firestore.collection(collection).doc(id).update(&partial).await?;
        Ok(with_id(partial, id))
    }

    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<(), ProviderError> {
        self.firestore.collection(collection).doc(id).delete().await?;
        Ok(())
    }

    /// Lists every document in the collection.
    pub async fn list_documents(&self, collection: &str) -> Result<Vec<DocumentData>, ProviderError> {
        let snapshots = self.firestore.collection(collection).list_documents().await?;

        let mut documents = Vec::with_capacity(snapshots.len());
        for snapshot in &snapshots {
            if let Some(data) = snapshot.data_with_id()? {
                documents.push(data);
            }
        }
        Ok(documents)
    }

    // Auth

    /// Creates an email/password account and signs it in.
    ///
    /// A non-empty `display_name` is stored as `displayName` on the `users/{uid}` document.
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<User, ProviderError> {
        let mut user = self
            .auth
            .create_user_with_email_and_password(email, password)
            .await?;

        if let Some(name) = display_name.filter(|name| !name.is_empty()) {
            let mut profile = DocumentData::new();
            profile.insert("displayName".to_string(), Value::String(name.to_string()));
            self.firestore
                .collection(USERS_COLLECTION)
                .doc(&user.uid)
                .merge(&profile)
                .await?;

            user.display_name = Some(name.to_string());
            self.app.session().set(user.clone()).await;
        }

        Ok(user)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<User, ProviderError> {
        Ok(self.auth.sign_in_with_email_and_password(email, password).await?)
    }

    /// Deletes the signed-in user's account.
    pub async fn delete_user_account(&self) -> Result<(), ProviderError> {
        Ok(self.auth.delete_current_user().await?)
    }

    // Storage

    /// Uploads `content` to `path` and returns its download URL.
    pub async fn upload_file(
        &self,
        path: &str,
        content: impl Into<reqwest::Body>,
        content_type: Option<&str>,
    ) -> Result<UploadedFile, ProviderError> {
        let file = self.storage.file(path);
        let metadata = file
            .save(content, content_type.unwrap_or(DEFAULT_CONTENT_TYPE))
            .await?;
        let url = file.download_url_from(&metadata)?;

        Ok(UploadedFile {
            path: path.to_string(),
            url,
        })
    }

    pub async fn get_file_url(&self, path: &str) -> Result<String, ProviderError> {
        Ok(self.storage.file(path).download_url().await?)
    }

    pub async fn delete_file(&self, path: &str) -> Result<(), ProviderError> {
        Ok(self.storage.file(path).delete().await?)
    }

    // Realtime Database

    /// Overwrites the node at `path`.
    pub async fn set_realtime_data<T: Serialize + ?Sized>(
        &self,
        path: &str,
        value: &T,
    ) -> Result<(), ProviderError> {
        Ok(self.database.reference(path).set(value).await?)
    }

    /// Reads the node at `path`. A missing node is `None`.
    pub async fn get_realtime_data(&self, path: &str) -> Result<Option<Value>, ProviderError> {
        Ok(self.database.reference(path).get().await?)
    }

    pub async fn delete_realtime_data(&self, path: &str) -> Result<(), ProviderError> {
        Ok(self.database.reference(path).remove().await?)
    }

    // Cloud Messaging

    /// Returns an FCM registration token. `vapid_key` defaults to Firebase's public key.
    pub async fn get_messaging_token(&self, vapid_key: Option<&str>) -> Result<String, ProviderError> {
        let messaging = self.messaging()?;
        Ok(messaging.get_token(vapid_key).await?)
    }

    /// Registers `callback` for inbound messages until the returned
    /// subscription is dropped or unsubscribed.
    pub fn on_message<F>(&self, callback: F) -> Result<MessageSubscription, ProviderError>
    where
        F: FnMut(MessagePayload) + Send + 'static,
    {
        let messaging = self.messaging()?;
        Ok(messaging.on_message(callback)?)
    }

    /// The messaging client, if messaging is available.
    pub fn messaging(&self) -> Result<&FirebaseMessaging, ProviderError> {
        self.messaging
            .as_ref()
            .ok_or(ProviderError::MessagingNotInitialized)
    }
}

fn with_id(mut data: DocumentData, id: &str) -> DocumentData {
    data.insert("id".to_string(), Value::String(id.to_string()));
    data
}
