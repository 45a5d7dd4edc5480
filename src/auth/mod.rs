//! Firebase Authentication module.
//!
//! Email/password accounts through the Identity Toolkit REST API. A successful
//! sign-up or sign-in becomes the app's current session; the Firestore, Storage
//! and Realtime Database clients built from the same `FirebaseApp` then act as
//! that user.

pub mod models;
pub mod session;

#[cfg(test)]
mod tests;

use crate::auth::models::{AuthResponse, DeleteAccountRequest, EmailPasswordRequest, User};
use crate::auth::session::Session;
use crate::core::middleware::ApiKeyMiddleware;
use crate::core::FirebaseErrorResponse;
use crate::FirebaseApp;
use reqwest::header;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use thiserror::Error;

/// Backend codes reported for a wrong email or password.
const INVALID_CREDENTIAL_CODES: [&str; 3] =
    ["EMAIL_NOT_FOUND", "INVALID_PASSWORD", "INVALID_LOGIN_CREDENTIALS"];

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("HTTP Request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Middleware error: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),
    #[error("No user currently signed in.")]
    NoUserSignedIn,
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct FirebaseAuth {
    client: ClientWithMiddleware,
    base_url: String,
    session: Session,
}

impl FirebaseAuth {
    /// Creates a new `FirebaseAuth` instance.
    ///
    /// This is typically called via `FirebaseApp::auth()`.
    pub fn new(app: &FirebaseApp) -> Self {
        let options = app.options();
        let client = ClientBuilder::new(app.http_client())
            .with(ApiKeyMiddleware::new(options.api_key.clone()))
            .build();

        Self {
            client,
            base_url: options.endpoints.identity_toolkit.trim_end_matches('/').to_string(),
            session: app.session().clone(),
        }
    }

    /// The currently signed-in user, if any.
    pub async fn current_user(&self) -> Option<User> {
        self.session.current_user().await
    }

    /// Forgets the current session locally.
    pub async fn sign_out(&self) {
        if let Some(user) = self.session.clear().await {
            tracing::debug!(uid = %user.uid, "signed out");
        }
    }

    /// Creates an email/password account and signs it in.
    pub async fn create_user_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let user = self.email_password_call("accounts:signUp", email, password).await?;
        tracing::debug!(uid = %user.uid, "created user");
        Ok(user)
    }

    /// Signs in an existing email/password account.
    ///
    /// A wrong email or password fails with [`AuthError::InvalidCredentials`].
    pub async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let user = self
            .email_password_call("accounts:signInWithPassword", email, password)
            .await?;
        tracing::debug!(uid = %user.uid, "signed in");
        Ok(user)
    }

    /// Deletes the signed-in user's account and ends the session.
    pub async fn delete_current_user(&self) -> Result<(), AuthError> {
        let user = self.session.current_user().await.ok_or(AuthError::NoUserSignedIn)?;
        let url = format!("{}/accounts:delete", self.base_url);
        let request = DeleteAccountRequest { id_token: &user.id_token };

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(&request)?)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response, "Delete user failed").await);
        }

        self.session.clear().await;
        tracing::debug!(uid = %user.uid, "deleted user");
        Ok(())
    }

    async fn email_password_call(
        &self,
        method: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let url = format!("{}/{}", self.base_url, method);
        let request = EmailPasswordRequest {
            email,
            password,
            return_secure_token: true,
        };

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(&request)?)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response, method).await);
        }

        let result: AuthResponse = response.json().await?;
        let user = result.into_user();
        self.session.set(user.clone()).await;
        Ok(user)
    }

    async fn api_error(response: reqwest::Response, context: &str) -> AuthError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        match serde_json::from_str::<FirebaseErrorResponse>(&text) {
            Ok(error) if INVALID_CREDENTIAL_CODES.iter().any(|code| *code == error.error_code()) => {
                AuthError::InvalidCredentials(error.display_message())
            }
            Ok(error) => {
                tracing::error!(context, message = %error.error.message, "auth request rejected");
                AuthError::ApiError(error.display_message())
            }
            Err(_) => AuthError::ApiError(format!("{} {}: {}", context, status, text)),
        }
    }
}
