use http::Extensions;
use reqwest::header::{self, HeaderValue};
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};
use secrecy::{ExposeSecret, SecretString};

const STRIPE_VERSION_HEADER: &str = "stripe-version";

/// Authenticates requests with the secret key and pins the API version.
#[derive(Clone)]
pub struct StripeAuthMiddleware {
    api_key: SecretString,
    api_version: Option<String>,
}

impl StripeAuthMiddleware {
    pub fn new(api_key: SecretString, api_version: Option<String>) -> Self {
        Self {
            api_key,
            api_version,
        }
    }
}

#[async_trait::async_trait]
impl Middleware for StripeAuthMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let bearer = format!("Bearer {}", self.api_key.expose_secret());
        let mut auth_value = HeaderValue::from_str(&bearer).map_err(|e| {
            reqwest_middleware::Error::Middleware(anyhow::anyhow!("Invalid API key: {}", e))
        })?;
        auth_value.set_sensitive(true);
        req.headers_mut().insert(header::AUTHORIZATION, auth_value);

        if let Some(version) = &self.api_version {
            let value = HeaderValue::from_str(version).map_err(|e| {
                reqwest_middleware::Error::Middleware(anyhow::anyhow!(
                    "Invalid Stripe API version: {}",
                    e
                ))
            })?;
            req.headers_mut().insert(STRIPE_VERSION_HEADER, value);
        }

        tracing::debug!(method = %req.method(), path = req.url().path(), "stripe request");

        next.run(req, extensions).await
    }
}
