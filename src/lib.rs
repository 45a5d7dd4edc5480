//! Thin adapters for Firebase and Stripe.
//!
//! - [`FirebaseProvider`] forwards document, auth, file, realtime and messaging
//!   calls to the Firebase REST APIs (feature `firebase`).
//! - [`StripeProvider`] creates Stripe payment links (feature `stripe`).
//!
//! A [`FirebaseApp`] is built once from [`FirebaseOptions`] and shared by every
//! client and provider made from it, along with its HTTP connection pool and the
//! signed-in user.
//!
//! ```rust,ignore
//! use backend_providers::{FirebaseApp, FirebaseOptions, FirebaseProvider};
//!
//! let app = FirebaseApp::initialize(FirebaseOptions::from_env()?)?;
//! let provider = FirebaseProvider::new(&app);
//! let user = provider.login_user("alice@example.com", "secret1").await?;
//! ```

#[cfg(feature = "firebase")]
pub mod auth;
#[cfg(feature = "firebase")]
pub mod config;
#[cfg(feature = "firebase")]
pub mod core;
#[cfg(feature = "firebase")]
pub mod database;
#[cfg(feature = "firebase")]
pub mod firestore;
#[cfg(feature = "firebase")]
pub mod messaging;
#[cfg(feature = "firebase")]
pub mod provider;
#[cfg(feature = "firebase")]
pub mod storage;
#[cfg(feature = "stripe")]
pub mod stripe;

#[cfg(feature = "firebase")]
pub use app::FirebaseApp;
#[cfg(feature = "firebase")]
pub use config::{ConfigError, FirebaseOptions};
#[cfg(feature = "firebase")]
pub use provider::{FirebaseProvider, ProviderError, UploadedFile};
#[cfg(feature = "stripe")]
pub use stripe::{config::StripeConfig, StripeError, StripeProvider};

#[cfg(feature = "firebase")]
mod app {
    use crate::auth::session::Session;
    use crate::auth::FirebaseAuth;
    use crate::config::{ConfigError, FirebaseOptions};
    use crate::database::FirebaseDatabase;
    use crate::firestore::FirebaseFirestore;
    use crate::messaging::{FirebaseMessaging, MessagingError};
    use crate::storage::FirebaseStorage;
    use std::sync::Arc;

    /// An initialized Firebase app.
    ///
    /// Cloning is cheap; clones share the same options, HTTP client and session.
    #[derive(Clone)]
    pub struct FirebaseApp {
        inner: Arc<AppInner>,
    }

    struct AppInner {
        options: FirebaseOptions,
        http: reqwest::Client,
        session: Session,
        /// The shared messaging client, or why messaging is unavailable.
        messaging: Result<FirebaseMessaging, String>,
    }

    impl FirebaseApp {
        /// Validates `options` and creates the app.
        pub fn initialize(options: FirebaseOptions) -> Result<Self, ConfigError> {
            options.validate()?;
            tracing::debug!(project_id = %options.project_id, "initialized Firebase app");

            let http = reqwest::Client::new();
            let messaging = FirebaseMessaging::from_options(&options, http.clone()).map_err(
                |e| match e {
                    MessagingError::Unsupported(reason) => reason,
                    other => other.to_string(),
                },
            );

            Ok(Self {
                inner: Arc::new(AppInner {
                    options,
                    http,
                    session: Session::new(),
                    messaging,
                }),
            })
        }

        pub fn options(&self) -> &FirebaseOptions {
            &self.inner.options
        }

        pub fn project_id(&self) -> &str {
            &self.inner.options.project_id
        }

        /// Returns `true` if both handles refer to the same app.
        pub fn ptr_eq(&self, other: &FirebaseApp) -> bool {
            Arc::ptr_eq(&self.inner, &other.inner)
        }

        pub(crate) fn http_client(&self) -> reqwest::Client {
            self.inner.http.clone()
        }

        pub(crate) fn session(&self) -> &Session {
            &self.inner.session
        }

        pub fn auth(&self) -> FirebaseAuth {
            FirebaseAuth::new(self)
        }

        pub fn firestore(&self) -> FirebaseFirestore {
            FirebaseFirestore::new(self)
        }

        pub fn storage(&self) -> FirebaseStorage {
            FirebaseStorage::new(self)
        }

        pub fn database(&self) -> FirebaseDatabase {
            FirebaseDatabase::new(self)
        }

        /// The app's messaging client; clones share installations and inbound messages.
        ///
        /// Fails with [`MessagingError::Unsupported`] when the options lack
        /// the sender ID, app ID or push subscription.
        pub fn messaging(&self) -> Result<FirebaseMessaging, MessagingError> {
            match &self.inner.messaging {
                Ok(messaging) => Ok(messaging.clone()),
                Err(reason) => Err(MessagingError::Unsupported(reason.clone())),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_initialize_rejects_empty_project() {
            let result = FirebaseApp::initialize(FirebaseOptions::new("", "key"));
            assert!(matches!(result, Err(ConfigError::MissingField("project_id"))));
        }

        #[test]
        fn test_clones_share_app() {
            let app = FirebaseApp::initialize(FirebaseOptions::new("demo", "key")).unwrap();
            let other = FirebaseApp::initialize(FirebaseOptions::new("demo", "key")).unwrap();

            assert!(app.ptr_eq(&app.clone()));
            assert!(!app.ptr_eq(&other));
            assert_eq!(app.project_id(), "demo");
        }

        #[tokio::test]
        async fn test_session_is_shared_between_clones() {
            let app = FirebaseApp::initialize(FirebaseOptions::new("demo", "key")).unwrap();
            let clone = app.clone();

            assert!(clone.auth().current_user().await.is_none());
            assert!(std::ptr::eq(app.session(), clone.session()));
        }
    }
}
