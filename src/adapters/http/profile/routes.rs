//! Axum router configuration for profile endpoints.

use axum::{routing::get, Router};

use super::handlers::{get_profile, ProfileAppState};

/// Create the profile API router.
///
/// # Routes
///
/// ## User Endpoints (require authentication)
/// - `GET /:id` - View a profile, shaped for the requesting viewer
pub fn profile_routes() -> Router<ProfileAppState> {
    Router::new().route("/:id", get(get_profile))
}
