//! User directory port - profile reads and account lifecycle.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::users::UserProfile;

/// Port for user profile lookups and the inactivity sweep.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Load a user's profile.
    ///
    /// Returns `None` for unknown users.
    async fn find_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, DomainError>;

    /// Record activity for a user, bumping their last-seen time.
    ///
    /// Called from authenticated request paths; keeps the inactivity sweep
    /// honest.
    async fn touch_last_seen(&self, user_id: &UserId) -> Result<(), DomainError>;

    /// Deactivate accounts whose last activity is before the cutoff.
    ///
    /// Returns the number of accounts deactivated.
    async fn deactivate_inactive_before(&self, cutoff: Timestamp) -> Result<u64, DomainError>;
}
