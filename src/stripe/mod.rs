//! The Stripe payment-link adapter.
//!
//! [`StripeProvider`] creates payment links through the Stripe REST API.
//! Requests are form-encoded and authenticated with the secret key by
//! [`middleware::StripeAuthMiddleware`].
//!
//! # Configuration
//!
//! ```ignore
//! let provider = StripeProvider::new(StripeConfig::from_env()?)?;
//! let url = provider
//!     .generate_payment_link(&PaymentLinkOptions::new(vec![LineItem::new("price_123", 2)]))
//!     .await?;
//! ```

pub mod config;
pub mod middleware;
pub mod models;


use crate::stripe::config::StripeConfig;
use crate::stripe::middleware::StripeAuthMiddleware;
use crate::stripe::models::{PaymentLink, PaymentLinkOptions, StripeErrorResponse};
use reqwest::header;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StripeError {
    #[error("HTTP Request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Middleware error: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    /// Stripe rejected the request.
    #[error("Stripe API error ({status}): {message}")]
    Api {
        status: u16,
        error_type: String,
        code: Option<String>,
        message: String,
        param: Option<String>,
    },
    #[error("Invalid line items: {0}")]
    InvalidLineItems(String),
    /// The configuration cannot be used to reach Stripe.
    #[error("Invalid Stripe configuration: {0}")]
    Config(String),
}

/// Creates Stripe payment links.
#[derive(Clone)]
pub struct StripeProvider {
    client: ClientWithMiddleware,
    base_url: String,
}

impl StripeProvider {
    pub const VERSION: &'static str = "1.0.0";
    pub const ICON: &'static str = "https://cdn.brandfetch.io/idxAg10C0L/w/480/h/480/theme/dark/icon.jpeg?c=1bxid64Mup7aczewSAYMX&t=1761194563315";

    /// Validates `config` and builds the provider.
    pub fn new(config: StripeConfig) -> Result<Self, StripeError> {
        config.validate()?;

        let client = ClientBuilder::new(reqwest::Client::new())
            .with(StripeAuthMiddleware::new(
                config.api_key.clone(),
                config.api_version.clone(),
            ))
            .build();

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    /// Creates a payment link and returns its shareable URL.
    pub async fn generate_payment_link(
        &self,
        options: &PaymentLinkOptions,
    ) -> Result<String, StripeError> {
        Ok(self.create_payment_link(options).await?.url)
    }

    /// Creates a payment link.
    ///
    /// Only the shape of `options` is checked locally; prices and quantity
    /// limits are validated by Stripe.
    pub async fn create_payment_link(
        &self,
        options: &PaymentLinkOptions,
    ) -> Result<PaymentLink, StripeError> {
        validate_line_items(options)?;

        let url = format!("{}/v1/payment_links", self.base_url);
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(options.form_pairs())
            .finish();

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let link: PaymentLink = response.json().await?;
        tracing::debug!(id = %link.id, "created payment link");
        Ok(link)
    }
}

fn validate_line_items(options: &PaymentLinkOptions) -> Result<(), StripeError> {
    if options.line_items.is_empty() {
        return Err(StripeError::InvalidLineItems(
            "at least one line item is required".to_string(),
        ));
    }
    if let Some(index) = options.line_items.iter().position(|item| item.quantity == 0) {
        return Err(StripeError::InvalidLineItems(format!(
            "line item {index} has a zero quantity"
        )));
    }
    Ok(())
}

async fn api_error(response: reqwest::Response) -> StripeError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    let error = match serde_json::from_str::<StripeErrorResponse>(&text) {
        Ok(body) => StripeError::Api {
            status: status.as_u16(),
            message: body.error.message.unwrap_or_else(|| status.to_string()),
            error_type: body.error.error_type,
            code: body.error.code,
            param: body.error.param,
        },
        Err(_) => StripeError::Api {
            status: status.as_u16(),
            error_type: "api_error".to_string(),
            code: None,
            message: text,
            param: None,
        },
    };

    tracing::error!(error = %error, "Stripe create_payment_link failed");
    error
}
