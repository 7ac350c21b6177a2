//! Subscription store port - course update notifications.
//!
//! Subscriptions are a notification opt-in, not an access mechanism. When a
//! course changes, the update fanout emails every subscriber.

use async_trait::async_trait;

use crate::domain::foundation::{CourseId, DomainError, UserId};

/// Port for course subscription membership.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Flip the user's subscription to a course.
    ///
    /// Returns `true` when the user is subscribed after the call,
    /// `false` when the call removed an existing subscription.
    async fn toggle(&self, user_id: &UserId, course_id: &CourseId) -> Result<bool, DomainError>;

    /// Whether the user is currently subscribed to the course.
    async fn is_subscribed(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<bool, DomainError>;

    /// Email addresses of every active subscriber of a course.
    ///
    /// Deactivated accounts are excluded.
    async fn list_subscriber_emails(&self, course_id: &CourseId)
        -> Result<Vec<String>, DomainError>;
}
