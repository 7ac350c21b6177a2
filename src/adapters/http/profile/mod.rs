//! HTTP adapter for profile endpoints.
//!
//! Exposes user profiles via REST API:
//! - `GET /api/users/:id` - View a profile (owner view includes email and
//!   payment history)

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::ProfileResponse;
pub use handlers::ProfileAppState;
pub use routes::profile_routes;
