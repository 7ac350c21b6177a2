//! Stripe gateway client.
//!
//! Implements the `PaymentGateway` port against the Stripe REST API.
//! A checkout is three sequential calls: create a product (so the hosted
//! page shows the item name), create a price pinned to the record's amount,
//! then open the session itself. The internal payment id rides along as
//! session metadata and as payment-intent metadata, which is what lets
//! webhooks and polls find their way back to the payment record.
//!
//! # Security
//!
//! - API key held in `secrecy::SecretString`, sent via HTTP basic auth
//! - Webhook signature verification lives in the domain layer, not here;
//!   this client only performs outbound calls

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::config::GatewayConfig;
use crate::ports::{
    CreateCheckoutSessionRequest, GatewayError, GatewayErrorCode, PaymentGateway, SessionHandle,
    SessionSnapshot,
};

use super::types::{StripeCheckoutSession, StripeErrorResponse, StripePrice, StripeProduct};

/// Stripe implementation of the payment gateway port.
pub struct StripeGatewayClient {
    api_key: SecretString,
    api_base_url: String,
    success_url: String,
    cancel_url: String,
    request_timeout: Duration,
    http_client: reqwest::Client,
}

impl StripeGatewayClient {
    /// Create a new client from the gateway configuration.
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            success_url: config.checkout_success_url.clone(),
            cancel_url: config.checkout_cancel_url.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            http_client: reqwest::Client::new(),
        }
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.api_base_url, path);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.api_key.expose_secret(), Option::<&str>::None)
            .timeout(self.request_timeout)
            .form(params)
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        self.read_response(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.api_base_url, path);

        let response = self
            .http_client
            .get(&url)
            .basic_auth(self.api_key.expose_secret(), Option::<&str>::None)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        self.read_response(response).await
    }

    async fn read_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                body = %body,
                "Gateway request failed"
            );
            return Err(map_error(status.as_u16(), &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::provider(format!("Failed to parse gateway response: {}", e)))
    }
}

#[async_trait]
impl PaymentGateway for StripeGatewayClient {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutSessionRequest,
    ) -> Result<SessionHandle, GatewayError> {
        let payment_id = request.payment_id.to_string();

        // 1. Product, so the hosted page shows what is being bought
        let product: StripeProduct = self
            .post_form(
                "/v1/products",
                &[
                    ("name", request.item_name.clone()),
                    ("metadata[payment_id]", payment_id.clone()),
                ],
            )
            .await?;

        // 2. Price pinned to the record's amount and currency
        let price: StripePrice = self
            .post_form(
                "/v1/prices",
                &[
                    ("product", product.id.clone()),
                    ("unit_amount", request.amount.minor_units().to_string()),
                    ("currency", request.amount.currency().as_str().to_string()),
                ],
            )
            .await?;

        // 3. The session itself. The payment id goes into both the session
        //    metadata and the payment-intent metadata so that every webhook
        //    shape can be correlated back to the record.
        let mut params = vec![
            ("mode", "payment".to_string()),
            ("line_items[0][price]", price.id.clone()),
            ("line_items[0][quantity]", "1".to_string()),
            ("success_url", success_url_with_session(&self.success_url)),
            ("cancel_url", self.cancel_url.clone()),
            ("metadata[payment_id]", payment_id.clone()),
            ("metadata[buyer_id]", request.buyer_id.to_string()),
            (
                "payment_intent_data[metadata][payment_id]",
                payment_id.clone(),
            ),
        ];

        if let Some(email) = &request.customer_email {
            params.push(("customer_email", email.clone()));
        }

        let session: StripeCheckoutSession =
            self.post_form("/v1/checkout/sessions", &params).await?;

        let url = session
            .url
            .clone()
            .ok_or_else(|| GatewayError::provider("Checkout session created without a URL"))?;

        tracing::info!(
            session_id = %session.id,
            payment_id = %payment_id,
            amount_minor = request.amount.minor_units(),
            "Checkout session created"
        );

        Ok(SessionHandle {
            id: session.id,
            url,
            customer_id: session.customer,
            expires_at: session.expires_at,
            metadata: session.metadata,
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionSnapshot, GatewayError> {
        let path = format!("/v1/checkout/sessions/{}", session_id);
        let session: StripeCheckoutSession = self.get_json(&path).await?;

        tracing::debug!(
            session_id = %session.id,
            status = %session.status,
            payment_status = %session.payment_status,
            "Retrieved checkout session"
        );

        Ok(session.into_snapshot())
    }
}

/// Append the session-id placeholder Stripe substitutes on redirect.
///
/// The literal `{CHECKOUT_SESSION_ID}` is replaced by Stripe with the real
/// session id, which the success page forwards to the status poll route.
fn success_url_with_session(base: &str) -> String {
    if base.contains('?') {
        format!("{}&session_id={{CHECKOUT_SESSION_ID}}", base)
    } else {
        format!("{}?session_id={{CHECKOUT_SESSION_ID}}", base)
    }
}

/// Map a non-2xx Stripe response to a gateway error.
fn map_error(status: u16, body: &str) -> GatewayError {
    let detail = serde_json::from_str::<StripeErrorResponse>(body)
        .map(|e| e.error)
        .unwrap_or_default();

    let message = detail
        .message
        .clone()
        .unwrap_or_else(|| format!("Gateway returned HTTP {}", status));

    let mut err = match status {
        401 | 403 => GatewayError::authentication(message),
        400 | 402 => GatewayError::invalid_request(message),
        404 => GatewayError::new(GatewayErrorCode::NotFound, message),
        429 => GatewayError::new(GatewayErrorCode::RateLimitExceeded, message),
        500..=599 => {
            // Stripe 5xx responses are transient
            let mut e = GatewayError::provider(message);
            e.retryable = true;
            e
        }
        _ => GatewayError::new(GatewayErrorCode::Unknown, message),
    };

    if let Some(code) = detail.code.or(detail.error_type) {
        err = err.with_provider_code(code);
    }

    err
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> GatewayConfig {
        GatewayConfig {
            api_key: SecretString::new("sk_test_key".to_string()),
            webhook_secret: SecretString::new("whsec_test".to_string()),
            api_base_url: "https://api.stripe.com/".to_string(),
            request_timeout_secs: 15,
            checkout_success_url: "https://app.example.com/payments/success".to_string(),
            checkout_cancel_url: "https://app.example.com/payments/cancel".to_string(),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Construction
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn new_trims_trailing_slash_from_base_url() {
        let client = StripeGatewayClient::new(&test_config());
        assert_eq!(client.api_base_url, "https://api.stripe.com");
    }

    #[test]
    fn new_carries_checkout_urls() {
        let client = StripeGatewayClient::new(&test_config());
        assert_eq!(
            client.success_url,
            "https://app.example.com/payments/success"
        );
        assert_eq!(client.cancel_url, "https://app.example.com/payments/cancel");
        assert_eq!(client.request_timeout, Duration::from_secs(15));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Success URL Placeholder
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn success_url_appends_placeholder() {
        let url = success_url_with_session("https://app.example.com/success");
        assert_eq!(
            url,
            "https://app.example.com/success?session_id={CHECKOUT_SESSION_ID}"
        );
    }

    #[test]
    fn success_url_appends_with_ampersand_when_query_exists() {
        let url = success_url_with_session("https://app.example.com/success?lang=en");
        assert_eq!(
            url,
            "https://app.example.com/success?lang=en&session_id={CHECKOUT_SESSION_ID}"
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Error Mapping
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn map_error_unauthorized() {
        let err = map_error(401, r#"{"error": {"type": "invalid_request_error", "message": "Invalid API Key provided"}}"#);
        assert_eq!(err.code, GatewayErrorCode::AuthenticationError);
        assert!(err.message.contains("Invalid API Key"));
        assert!(!err.retryable);
    }

    #[test]
    fn map_error_bad_request_carries_provider_code() {
        let err = map_error(
            400,
            r#"{"error": {"type": "invalid_request_error", "code": "parameter_missing", "message": "Missing required param: line_items.", "param": "line_items"}}"#,
        );
        assert_eq!(err.code, GatewayErrorCode::InvalidRequest);
        assert_eq!(err.provider_code, Some("parameter_missing".to_string()));
    }

    #[test]
    fn map_error_not_found() {
        let err = map_error(
            404,
            r#"{"error": {"type": "invalid_request_error", "message": "No such checkout session: cs_missing"}}"#,
        );
        assert_eq!(err.code, GatewayErrorCode::NotFound);
        assert!(!err.retryable);
    }

    #[test]
    fn map_error_rate_limited_is_retryable() {
        let err = map_error(429, r#"{"error": {"type": "rate_limit_error"}}"#);
        assert_eq!(err.code, GatewayErrorCode::RateLimitExceeded);
        assert!(err.retryable);
        assert_eq!(err.provider_code, Some("rate_limit_error".to_string()));
    }

    #[test]
    fn map_error_server_error_is_retryable() {
        let err = map_error(503, r#"{"error": {"type": "api_error"}}"#);
        assert_eq!(err.code, GatewayErrorCode::ProviderError);
        assert!(err.retryable);
    }

    #[test]
    fn map_error_unparseable_body_falls_back_to_status() {
        let err = map_error(500, "<html>Bad Gateway</html>");
        assert_eq!(err.code, GatewayErrorCode::ProviderError);
        assert!(err.message.contains("HTTP 500"));
        assert!(err.provider_code.is_none());
    }
}
