//! Profile handlers.
//!
//! ## Queries
//! - Get a user profile, rendered for the requesting viewer

mod get_profile;

pub use get_profile::{GetProfileHandler, GetProfileQuery, GetProfileResult};
