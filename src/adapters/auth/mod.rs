//! Authentication adapters.
//!
//! Implementations of the `TokenVerifier` port:
//! - `JwtTokenVerifier` - HS256 JWTs signed with the platform's shared secret

mod jwt;

pub use jwt::JwtTokenVerifier;
