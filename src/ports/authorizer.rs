//! Authorization port for purchase and catalog rules.
//!
//! Two questions gate purchases: does the buyer author the item (owners buy
//! nothing from themselves), and does the buyer hold a role that is barred
//! from purchasing. The same port answers who may edit a course.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::payment::ItemRef;

/// Platform roles relevant to authorization decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular account; may purchase.
    Student,

    /// Content moderator; may edit courses, may not purchase.
    Moderator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Moderator => "moderator",
        }
    }
}

/// Port for ownership and role checks.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Whether the user authored the item.
    async fn is_owner(&self, user_id: &UserId, item: &ItemRef) -> Result<bool, DomainError>;

    /// Whether the user holds the given role.
    async fn has_role(&self, user_id: &UserId, role: Role) -> Result<bool, DomainError>;
}
