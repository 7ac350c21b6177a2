//! Token verification port for bearer authentication.
//!
//! The port is scheme-agnostic. The production adapter verifies locally
//! signed JWTs; a test double can hand out fixed identities.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Validates bearer tokens and extracts user identity.
///
/// HTTP middleware uses this to turn an `Authorization: Bearer` header
/// into an [`AuthenticatedUser`].
///
/// # Contract
///
/// Implementations must:
/// - Validate the token signature and expiry
/// - Return `AuthError::InvalidToken` for malformed or badly signed tokens
/// - Return `AuthError::TokenExpired` for expired tokens
/// - Return `AuthError::InvalidSubject` when the subject claim is unusable
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Validate a raw token (without the "Bearer " prefix).
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;

    struct FixedVerifier;

    #[async_trait]
    impl TokenVerifier for FixedVerifier {
        async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
            if token == "good" {
                Ok(AuthenticatedUser::new(
                    UserId::new("tg-501").unwrap(),
                    None,
                    None,
                ))
            } else {
                Err(AuthError::InvalidToken)
            }
        }
    }

    #[tokio::test]
    async fn trait_is_usable_as_object() {
        let verifier: Box<dyn TokenVerifier> = Box::new(FixedVerifier);

        assert!(verifier.verify("good").await.is_ok());
        assert!(matches!(
            verifier.verify("bad").await,
            Err(AuthError::InvalidToken)
        ));
    }
}
