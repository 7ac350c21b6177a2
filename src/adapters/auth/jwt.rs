//! HS256 JWT adapter for token verification.
//!
//! This adapter implements the `TokenVerifier` port for tokens signed with
//! the platform's shared HMAC secret. Validation checks the signature and
//! expiry, then maps the claims to the domain `AuthenticatedUser` type.

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::ExposeSecret;
use serde::Deserialize;

use crate::config::AuthConfig;
use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::TokenVerifier;

/// Claims carried by platform-issued tokens.
#[derive(Debug, Deserialize)]
struct Claims {
    /// Subject - the user ID.
    sub: String,

    /// Expiry timestamp (Unix epoch seconds).
    #[allow(dead_code)]
    exp: i64,

    /// Email address, when issued with one.
    #[serde(default)]
    email: Option<String>,

    /// Display name, when issued with one.
    #[serde(default)]
    name: Option<String>,
}

/// JWT verifier backed by the shared HMAC secret.
pub struct JwtTokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenVerifier {
    /// Create a verifier from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_secs;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key,
            validation,
        }
    }
}

#[async_trait]
impl TokenVerifier for JwtTokenVerifier {
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => {
                        tracing::debug!("Token expired");
                        AuthError::TokenExpired
                    }
                    _ => {
                        tracing::debug!("Token validation failed: {}", e);
                        AuthError::InvalidToken
                    }
                }
            })?;

        let claims = token_data.claims;

        let user_id = UserId::new(&claims.sub).map_err(|_| {
            tracing::warn!("Unusable subject in token: {:?}", claims.sub);
            AuthError::InvalidSubject
        })?;

        Ok(AuthenticatedUser::new(user_id, claims.email, claims.name))
    }
}
