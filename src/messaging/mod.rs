//! Firebase Cloud Messaging module.
//!
//! Client-side messaging: obtaining a registration token for a Web Push
//! subscription, and dispatching inbound messages to registered callbacks.
//!
//! Token retrieval first registers a Firebase installation (once per client),
//! then exchanges the installation's auth token and the push subscription for
//! an FCM registration token.

pub mod models;
pub mod subscription;

#[cfg(test)]
mod tests;

use crate::config::FirebaseOptions;
use crate::core::middleware::ApiKeyMiddleware;
use crate::core::parse_error_response;
use crate::messaging::models::{
    CreateInstallationRequest, InstallationResponse, MessagePayload, PushSubscription,
    RegistrationRequest, RegistrationResponse, WebRegistration,
};
use crate::messaging::subscription::MessageSubscription;
use crate::FirebaseApp;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use reqwest::header;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::OnceCell;

/// The public VAPID key Firebase uses when the app does not supply its own.
pub const DEFAULT_VAPID_KEY: &str =
    "BDOU99-h67HcA6JeFXHbSNMu7e2yNNu3RzoMj8TM4W88jITfq7ZmPvIM1Iv-4_l2LxQcYwhqby2xGpWwzjfAnG4";

const INSTALLATIONS_AUTH_HEADER: &str = "x-goog-firebase-installations-auth";
const INSTALLATIONS_AUTH_VERSION: &str = "FIS_v2";
const INSTALLATIONS_SDK_VERSION: &str = "w:0.6.4";
const INBOUND_CAPACITY: usize = 64;

#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("HTTP Request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Middleware error: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    /// The configuration lacks something messaging needs.
    #[error("Messaging is not supported in this environment: {0}")]
    Unsupported(String),
    /// Callbacks can only be registered from within a tokio runtime.
    #[error("No tokio runtime available to dispatch messages")]
    NoRuntime,
}

#[derive(Clone)]
pub struct FirebaseMessaging {
    client: ClientWithMiddleware,
    installations_url: String,
    registrations_url: String,
    app_id: String,
    sender_id: String,
    push_subscription: PushSubscription,
    installation: Arc<OnceCell<InstallationResponse>>,
    inbound: broadcast::Sender<MessagePayload>,
}

impl FirebaseMessaging {
    /// Returns the app's messaging client.
    ///
    /// Every call for the same app yields a handle to the same client, so
    /// installations and inbound messages are shared. Fails with
    /// [`MessagingError::Unsupported`] when the options carry no messaging
    /// sender ID, app ID or Web Push subscription.
    pub fn new(app: &FirebaseApp) -> Result<Self, MessagingError> {
        app.messaging()
    }

    /// Builds a messaging client. Called once per app, at initialization.
    pub(crate) fn from_options(
        options: &FirebaseOptions,
        http: reqwest::Client,
    ) -> Result<Self, MessagingError> {
        let sender_id = options
            .messaging_sender_id
            .clone()
            .ok_or_else(|| MessagingError::Unsupported("messaging_sender_id is not set".into()))?;
        let app_id = options
            .app_id
            .clone()
            .ok_or_else(|| MessagingError::Unsupported("app_id is not set".into()))?;
        let push_subscription = options
            .web_push
            .clone()
            .ok_or_else(|| MessagingError::Unsupported("no Web Push subscription".into()))?;

        let client = ClientBuilder::new(http)
            .with(ApiKeyMiddleware::new(options.api_key.clone()))
            .build();

        let installations_url = format!(
            "{}/projects/{}/installations",
            options.endpoints.installations.trim_end_matches('/'),
            options.project_id
        );
        let registrations_url = format!(
            "{}/projects/{}/registrations",
            options.endpoints.fcm_registrations.trim_end_matches('/'),
            options.project_id
        );
        let (inbound, _) = broadcast::channel(INBOUND_CAPACITY);

        Ok(Self {
            client,
            installations_url,
            registrations_url,
            app_id,
            sender_id,
            push_subscription,
            installation: Arc::new(OnceCell::new()),
            inbound,
        })
    }

    pub fn sender_id(&self) -> &str {
        &self.sender_id
    }

    /// Returns an FCM registration token for the configured push subscription.
    ///
    /// # Arguments
    ///
    /// * `vapid_key` - The application server key. Defaults to [`DEFAULT_VAPID_KEY`].
    pub async fn get_token(&self, vapid_key: Option<&str>) -> Result<String, MessagingError> {
        let installation = self
            .installation
            .get_or_try_init(|| self.create_installation())
            .await?;

        let request = RegistrationRequest {
            web: WebRegistration {
                endpoint: &self.push_subscription.endpoint,
                auth: &self.push_subscription.auth,
                p256dh: &self.push_subscription.p256dh,
                application_pub_key: vapid_key.filter(|key| *key != DEFAULT_VAPID_KEY),
            },
        };

        let response = self
            .client
            .post(&self.registrations_url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(
                INSTALLATIONS_AUTH_HEADER,
                format!("FIS {}", installation.auth_token.token),
            )
            .body(serde_json::to_vec(&request)?)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MessagingError::ApiError(
                parse_error_response(response, "FCM registration failed").await,
            ));
        }

        let result: RegistrationResponse = response.json().await?;
        Ok(result.token)
    }

    async fn create_installation(&self) -> Result<InstallationResponse, MessagingError> {
        let fid = generate_fid();
        let request = CreateInstallationRequest {
            fid: &fid,
            auth_version: INSTALLATIONS_AUTH_VERSION,
            app_id: &self.app_id,
            sdk_version: INSTALLATIONS_SDK_VERSION,
        };

        let response = self
            .client
            .post(&self.installations_url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(&request)?)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MessagingError::ApiError(
                parse_error_response(response, "Create installation failed").await,
            ));
        }

        let installation: InstallationResponse = response.json().await?;
        tracing::debug!(fid = %installation.fid, "registered Firebase installation");
        Ok(installation)
    }

    /// Registers `callback` for every inbound message.
    ///
    /// Messages are passed to the callback one at a time, in arrival order. The
    /// registration lasts as long as the returned [`MessageSubscription`].
    pub fn on_message<F>(&self, mut callback: F) -> Result<MessageSubscription, MessagingError>
    where
        F: FnMut(MessagePayload) + Send + 'static,
    {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| MessagingError::NoRuntime)?;
        let mut receiver = self.inbound.subscribe();

        let task = handle.spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(payload) => callback(payload),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "message subscriber lagged, messages dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        Ok(MessageSubscription::new(task))
    }

    /// Hands an inbound message to every registered callback.
    ///
    /// Returns the number of subscriptions that will receive it.
    pub fn deliver(&self, payload: MessagePayload) -> usize {
        self.inbound.send(payload).unwrap_or(0)
    }
}

/// Generates a Firebase installation ID: 17 random bytes with the `0111`
/// prefix, base64url-encoded and cut to 22 characters.
fn generate_fid() -> String {
    let mut bytes: [u8; 17] = rand::random();
    bytes[0] = 0b0111_0000 | (bytes[0] & 0b0000_1111);
    let mut fid = URL_SAFE_NO_PAD.encode(bytes);
    fid.truncate(22);
    fid
}
