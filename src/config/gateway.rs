//! Payment gateway configuration (Stripe)

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Payment gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Gateway API key (`sk_test_…` or `sk_live_…`)
    pub api_key: SecretString,

    /// Webhook signing secret (`whsec_…`)
    pub webhook_secret: SecretString,

    /// Gateway API base URL; overridden in tests to point at a stub
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Outbound request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Where the gateway sends the buyer after successful checkout
    pub checkout_success_url: String,

    /// Where the gateway sends the buyer after abandoning checkout
    pub checkout_cancel_url: String,
}

impl GatewayConfig {
    /// Check if using gateway test mode
    pub fn is_test_mode(&self) -> bool {
        self.api_key.expose_secret().starts_with("sk_test_")
    }

    /// Check if using gateway live mode
    pub fn is_live_mode(&self) -> bool {
        self.api_key.expose_secret().starts_with("sk_live_")
    }

    /// Validate gateway configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_API_KEY"));
        }
        if self.webhook_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_WEBHOOK_SECRET"));
        }

        // Verify key prefixes for safety
        if !self.api_key.expose_secret().starts_with("sk_") {
            return Err(ValidationError::InvalidGatewayKey);
        }
        if !self.webhook_secret.expose_secret().starts_with("whsec_") {
            return Err(ValidationError::InvalidWebhookSecret);
        }

        for url in [&self.checkout_success_url, &self.checkout_cancel_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidCheckoutUrl);
            }
        }

        Ok(())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: SecretString::new(String::new()),
            webhook_secret: SecretString::new(String::new()),
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout(),
            checkout_success_url: String::new(),
            checkout_cancel_url: String::new(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_request_timeout() -> u64 {
    15
}
