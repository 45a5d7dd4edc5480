use crate::auth::session::Session;
use http::Extensions;
use reqwest::header::{self, HeaderValue};
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};
use secrecy::{ExposeSecret, SecretString};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Attaches the project's Web API key to every request.
#[derive(Clone)]
pub struct ApiKeyMiddleware {
    api_key: SecretString,
}

impl ApiKeyMiddleware {
    pub fn new(api_key: SecretString) -> Self {
        Self { api_key }
    }
}

#[async_trait::async_trait]
impl Middleware for ApiKeyMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let mut value = HeaderValue::from_str(self.api_key.expose_secret()).map_err(|e| {
            reqwest_middleware::Error::Middleware(anyhow::anyhow!("Invalid API key: {}", e))
        })?;
        value.set_sensitive(true);
        req.headers_mut().insert(API_KEY_HEADER, value);

        tracing::debug!(method = %req.method(), path = req.url().path(), "firebase request");

        next.run(req, extensions).await
    }
}

/// Sends the signed-in user's ID token as a bearer token, if a user is signed in.
#[derive(Clone)]
pub struct SessionMiddleware {
    session: Session,
}

impl SessionMiddleware {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait::async_trait]
impl Middleware for SessionMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        if let Some(token) = self.session.id_token().await {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
                reqwest_middleware::Error::Middleware(anyhow::anyhow!("Invalid ID token: {}", e))
            })?;
            value.set_sensitive(true);
            req.headers_mut().insert(header::AUTHORIZATION, value);
        }

        next.run(req, extensions).await
    }
}
