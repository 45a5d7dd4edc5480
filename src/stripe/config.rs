use super::StripeError;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    pub(crate) api_key: SecretString,

    /// Base URL for the Stripe API (default: https://api.stripe.com).
    pub(crate) api_base_url: String,

    /// Pinned API version, sent as `Stripe-Version`.
    pub(crate) api_version: Option<String>,
}

impl StripeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: None,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads:
    /// - `STRIPE_API_KEY`
    /// - `STRIPE_API_VERSION` (optional)
    pub fn from_env() -> Result<Self, StripeError> {
        let api_key = std::env::var("STRIPE_API_KEY")
            .map_err(|_| StripeError::Config("STRIPE_API_KEY is not set".to_string()))?;
        let api_version = std::env::var("STRIPE_API_VERSION")
            .ok()
            .filter(|v| !v.trim().is_empty());

        Ok(Self {
            api_version,
            ..Self::new(api_key)
        })
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Rejects an empty API key or an unparseable base URL.
    pub fn validate(&self) -> Result<(), StripeError> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(StripeError::Config("api_key is empty".to_string()));
        }
        Url::parse(&self.api_base_url).map_err(|e| {
            StripeError::Config(format!("invalid api_base_url '{}': {}", self.api_base_url, e))
        })?;
        if matches!(&self.api_version, Some(version) if version.trim().is_empty()) {
            return Err(StripeError::Config("api_version is empty".to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}
