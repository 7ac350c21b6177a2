//! User profiles and their visibility rules.
//!
//! The same profile row renders differently depending on who asks: the owner
//! sees contact details and account state, everyone else gets the public
//! subset. The split is encoded as two enum variants so a handler cannot
//! accidentally serialize private fields to a stranger.

use serde::Serialize;

use crate::domain::foundation::{Timestamp, UserId};

/// A platform account as stored in the user directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,

    /// Name shown across the platform.
    pub display_name: String,

    /// Contact email; only the owner ever sees it.
    pub email: Option<String>,

    /// Free-form self-description.
    pub bio: Option<String>,

    /// When the account was created.
    pub registered_at: Timestamp,

    /// Last authenticated activity; drives the inactivity sweep.
    pub last_seen_at: Timestamp,

    /// False once the inactivity sweep deactivates the account.
    pub is_active: bool,
}

impl UserProfile {
    /// Render the profile for a specific viewer.
    ///
    /// The owner sees everything; anyone else gets the public subset.
    pub fn view_for(&self, viewer: &UserId) -> ProfileView {
        if viewer == &self.id {
            ProfileView::Owner {
                id: self.id.clone(),
                display_name: self.display_name.clone(),
                email: self.email.clone(),
                bio: self.bio.clone(),
                registered_at: self.registered_at,
                last_seen_at: self.last_seen_at,
                is_active: self.is_active,
            }
        } else {
            ProfileView::Public {
                id: self.id.clone(),
                display_name: self.display_name.clone(),
                bio: self.bio.clone(),
                registered_at: self.registered_at,
            }
        }
    }
}

/// Viewer-dependent rendering of a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ProfileView {
    /// Full view, only for the profile's owner.
    Owner {
        id: UserId,
        display_name: String,
        email: Option<String>,
        bio: Option<String>,
        registered_at: Timestamp,
        last_seen_at: Timestamp,
        is_active: bool,
    },

    /// Redacted view for everyone else.
    Public {
        id: UserId,
        display_name: String,
        bio: Option<String>,
        registered_at: Timestamp,
    },
}

impl ProfileView {
    /// True when this is the owner's full view.
    pub fn is_owner_view(&self) -> bool {
        matches!(self, ProfileView::Owner { .. })
    }
}
