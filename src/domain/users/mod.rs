//! Users domain module.
//!
//! Profiles and their viewer-dependent rendering. Account lifecycle writes
//! (activity tracking, the inactivity sweep) go through the `UserDirectory`
//! port.

mod profile;

pub use profile::{ProfileView, UserProfile};
