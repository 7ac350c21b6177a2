//! Axum router configuration for catalog endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{get_course, toggle_subscription, update_course, CatalogAppState};

/// Create the catalog API router.
///
/// # Routes
///
/// ## Public Endpoints
/// - `GET /:id` - Course page
///
/// ## User Endpoints (require authentication)
/// - `PATCH /:id` - Edit a course (owner or moderator)
/// - `POST /:id/subscribe` - Toggle update-email subscription
pub fn course_routes() -> Router<CatalogAppState> {
    Router::new()
        .route("/:id", get(get_course).patch(update_course))
        .route("/:id/subscribe", post(toggle_subscription))
}
