use serde::Deserialize;

/// One price and quantity in a payment link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    /// The Stripe price id (`price_...`).
    pub price: String,
    pub quantity: u64,
}

impl LineItem {
    pub fn new(price: impl Into<String>, quantity: u64) -> Self {
        Self {
            price: price.into(),
            quantity,
        }
    }
}

/// What the customer sees after paying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AfterCompletion {
    /// Send the customer to `url`.
    Redirect { url: String },
    /// Show Stripe's confirmation page, optionally with a custom message.
    HostedConfirmation { custom_message: Option<String> },
}

/// Parameters for a new payment link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentLinkOptions {
    pub line_items: Vec<LineItem>,
    pub allow_promotion_codes: Option<bool>,
    pub after_completion: Option<AfterCompletion>,
}

impl PaymentLinkOptions {
    pub fn new(line_items: Vec<LineItem>) -> Self {
        Self {
            line_items,
            ..Default::default()
        }
    }

    pub fn allow_promotion_codes(mut self, allow: bool) -> Self {
        self.allow_promotion_codes = Some(allow);
        self
    }

    pub fn after_completion(mut self, after_completion: AfterCompletion) -> Self {
        self.after_completion = Some(after_completion);
        self
    }

    /// Flattens the options into Stripe's bracketed form fields,
    /// e.g. `line_items[0][price]`.
    pub(crate) fn form_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.line_items.len() * 2 + 3);

        for (i, item) in self.line_items.iter().enumerate() {
            pairs.push((format!("line_items[{i}][price]"), item.price.clone()));
            pairs.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
        }

        if let Some(allow) = self.allow_promotion_codes {
            pairs.push(("allow_promotion_codes".to_string(), allow.to_string()));
        }

        match &self.after_completion {
            Some(AfterCompletion::Redirect { url }) => {
                pairs.push(("after_completion[type]".to_string(), "redirect".to_string()));
                pairs.push(("after_completion[redirect][url]".to_string(), url.clone()));
            }
            Some(AfterCompletion::HostedConfirmation { custom_message }) => {
                pairs.push((
                    "after_completion[type]".to_string(),
                    "hosted_confirmation".to_string(),
                ));
                if let Some(message) = custom_message {
                    pairs.push((
                        "after_completion[hosted_confirmation][custom_message]".to_string(),
                        message.clone(),
                    ));
                }
            }
            None => {}
        }

        pairs
    }
}

/// A created payment link.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PaymentLink {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StripeErrorResponse {
    pub error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StripeErrorBody {
    #[serde(rename = "type")]
    pub error_type: String,
    pub code: Option<String>,
    pub message: Option<String>,
    pub param: Option<String>,
}
