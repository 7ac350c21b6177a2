//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - JWT bearer token verification
//! - `email` - Transactional mail via the Resend API
//! - `http` - axum routers, handlers, and middleware
//! - `postgres` - sqlx persistence for the store ports
//! - `stripe` - Hosted checkout gateway client
//! - `worker` - Background task execution

pub mod auth;
pub mod email;
pub mod http;
pub mod postgres;
pub mod stripe;
pub mod worker;

pub use worker::TaskWorker;
