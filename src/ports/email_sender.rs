//! Email sender port for transactional mail.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

/// An outbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Recipient addresses.
    pub to: Vec<String>,

    /// Subject line.
    pub subject: String,

    /// HTML body.
    pub html_body: String,

    /// Plain-text alternative, when provided.
    pub text_body: Option<String>,
}

impl EmailMessage {
    pub fn new(
        to: Vec<String>,
        subject: impl Into<String>,
        html_body: impl Into<String>,
    ) -> Self {
        Self {
            to,
            subject: subject.into(),
            html_body: html_body.into(),
            text_body: None,
        }
    }

    pub fn with_text_body(mut self, text_body: impl Into<String>) -> Self {
        self.text_body = Some(text_body.into());
        self
    }
}

/// Port for sending transactional email.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send a message.
    ///
    /// # Errors
    ///
    /// - `EmailDeliveryError` when the provider rejects or cannot be reached
    async fn send(&self, message: &EmailMessage) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_optional_text_body() {
        let msg = EmailMessage::new(vec!["a@example.com".to_string()], "Hi", "<p>Hi</p>")
            .with_text_body("Hi");
        assert_eq!(msg.text_body.as_deref(), Some("Hi"));
    }

    // Trait object safety test
    #[test]
    fn email_sender_is_object_safe() {
        fn _accepts_dyn(_sender: &dyn EmailSender) {}
    }
}
