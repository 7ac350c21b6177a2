//! HTTP adapter for catalog endpoints.
//!
//! Exposes the course catalog via REST API:
//! - `GET /api/courses/:id` - Public course page
//! - `PATCH /api/courses/:id` - Edit a course (owner or moderator)
//! - `POST /api/courses/:id/subscribe` - Toggle update-email subscription

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{CourseResponse, SubscriptionResponse, UpdateCourseRequest};
pub use handlers::CatalogAppState;
pub use routes::course_routes;
