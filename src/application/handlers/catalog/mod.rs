//! Catalog handlers.
//!
//! ## Commands
//! - Editing a course (owner or moderator), with subscriber notification
//! - Toggling a user's subscription to a course's update emails
//!
//! ## Queries
//! - Get a course's public listing

mod get_course;
mod toggle_subscription;
mod update_course;

// Commands
pub use toggle_subscription::{
    ToggleSubscriptionCommand, ToggleSubscriptionHandler, ToggleSubscriptionResult,
};
pub use update_course::{UpdateCourseCommand, UpdateCourseHandler, UpdateCourseResult};

// Queries
pub use get_course::{GetCourseHandler, GetCourseQuery, GetCourseResult};
