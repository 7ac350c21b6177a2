//! Resend adapter for transactional email.
//!
//! Implements the `EmailSender` port against the Resend HTTP API. One call
//! per message; recipients share a single send.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::config::EmailConfig;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{EmailMessage, EmailSender};

const RESEND_API_URL: &str = "https://api.resend.com/emails";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Email sender backed by the Resend API.
pub struct ResendEmailSender {
    api_key: SecretString,
    from: String,
    http_client: reqwest::Client,
}

impl ResendEmailSender {
    /// Create a sender from email configuration.
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            api_key: config.resend_api_key.clone(),
            from: config.from_header(),
            http_client: reqwest::Client::new(),
        }
    }
}

/// Request body for the Resend send endpoint.
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), DomainError> {
        let request = SendRequest {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            html: &message.html_body,
            text: message.text_body.as_deref(),
        };

        let response = self
            .http_client
            .post(RESEND_API_URL)
            .bearer_auth(self.api_key.expose_secret())
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::EmailDeliveryError,
                    format!("Failed to reach email provider: {}", e),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                body = %body,
                "Email provider rejected send"
            );
            return Err(DomainError::new(
                ErrorCode::EmailDeliveryError,
                format!("Email provider returned HTTP {}", status.as_u16()),
            ));
        }

        tracing::debug!(
            recipients = message.to.len(),
            subject = %message.subject,
            "Email sent"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> EmailConfig {
        EmailConfig {
            resend_api_key: SecretString::new("re_test_key".to_string()),
            from_email: "noreply@eduledger.example".to_string(),
            from_name: "EduLedger".to_string(),
        }
    }

    #[test]
    fn sender_uses_configured_from_header() {
        let sender = ResendEmailSender::new(&test_config());
        assert_eq!(sender.from, "EduLedger <noreply@eduledger.example>");
    }

    #[test]
    fn send_request_omits_missing_text_body() {
        let to = vec!["a@example.com".to_string()];
        let request = SendRequest {
            from: "EduLedger <noreply@eduledger.example>",
            to: &to,
            subject: "Course updated",
            html: "<p>Hi</p>",
            text: None,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("\"text\""));
        assert!(json.contains("\"to\":[\"a@example.com\"]"));
    }

    #[test]
    fn send_request_includes_text_body_when_present() {
        let to = vec!["a@example.com".to_string()];
        let request = SendRequest {
            from: "EduLedger <noreply@eduledger.example>",
            to: &to,
            subject: "Course updated",
            html: "<p>Hi</p>",
            text: Some("Hi"),
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"text\":\"Hi\""));
    }
}
