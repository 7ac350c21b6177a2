//! HTTP adapters - REST API implementations.
//!
//! Each domain module has its own HTTP adapter for endpoint exposure.
//! `server` assembles the feature routers into the application router.

pub mod catalog;
pub mod error;
pub mod middleware;
pub mod payments;
pub mod profile;
pub mod server;

// Re-export key types for convenience
pub use catalog::CatalogAppState;
pub use error::{ApiError, ErrorResponse};
pub use payments::PaymentsAppState;
pub use profile::ProfileAppState;
pub use server::api_router;
