//! PostgreSQL implementation of SubscriptionStore.
//!
//! Course update-notification subscriptions. The toggle is a single upsert
//! that flips the `active` flag, so two rapid toggles from the same user
//! cannot leave the row in a half-written state.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{CourseId, DomainError, ErrorCode, UserId};
use crate::ports::SubscriptionStore;

/// PostgreSQL implementation of the SubscriptionStore port.
pub struct PostgresSubscriptionStore {
    pool: PgPool,
}

impl PostgresSubscriptionStore {
    /// Creates a new PostgresSubscriptionStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for PostgresSubscriptionStore {
    async fn toggle(&self, user_id: &UserId, course_id: &CourseId) -> Result<bool, DomainError> {
        let now_active: bool = sqlx::query_scalar(
            r#"
            INSERT INTO subscriptions (user_id, course_id, active)
            VALUES ($1, $2, TRUE)
            ON CONFLICT (user_id, course_id)
            DO UPDATE SET active = NOT subscriptions.active
            RETURNING active
            "#,
        )
        .bind(user_id.as_str())
        .bind(course_id.value())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to toggle subscription: {}", e),
            )
        })?;

        tracing::debug!(
            user_id = %user_id,
            course_id = %course_id,
            subscribed = now_active,
            "Subscription toggled"
        );

        Ok(now_active)
    }

    async fn is_subscribed(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<bool, DomainError> {
        let subscribed: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM subscriptions
                WHERE user_id = $1 AND course_id = $2 AND active
            )
            "#,
        )
        .bind(user_id.as_str())
        .bind(course_id.value())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to check subscription: {}", e),
            )
        })?;

        Ok(subscribed)
    }

    async fn list_subscriber_emails(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<String>, DomainError> {
        // Deactivated accounts keep their subscription rows but drop out
        // of notification sends.
        let emails: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT u.email
            FROM subscriptions s
            JOIN users u ON u.id = s.user_id
            WHERE s.course_id = $1
              AND s.active
              AND u.is_active
              AND u.email IS NOT NULL
            ORDER BY u.email
            "#,
        )
        .bind(course_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to list subscriber emails: {}", e),
            )
        })?;

        Ok(emails)
    }
}
