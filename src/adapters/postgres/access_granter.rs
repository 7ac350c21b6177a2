//! PostgreSQL implementation of AccessGranter.
//!
//! Entitlements live in the `enrollments` table, one row per (user, item).
//! A grant is an upsert: replaying a grant for an already-entitled user
//! re-activates the row and reports success, which is what makes webhook
//! replays and the retry task safe.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::payment::ItemRef;
use crate::ports::{AccessGranter, GrantError};

/// PostgreSQL implementation of the AccessGranter port.
pub struct PostgresAccessGranter {
    pool: PgPool,
}

impl PostgresAccessGranter {
    /// Creates a new PostgresAccessGranter with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Classify a write failure: referential breakage cannot be fixed by
/// retrying, everything else (connection loss, timeouts) can.
fn classify_grant_error(e: sqlx::Error) -> GrantError {
    if let sqlx::Error::Database(db_err) = &e {
        // 23503 = foreign_key_violation: the user or item row is gone
        if db_err.code().as_deref() == Some("23503") {
            return GrantError::permanent(format!(
                "Grant references a missing row: {}",
                db_err
            ));
        }
    }
    GrantError::retryable(format!("Failed to write enrollment: {}", e))
}

#[async_trait]
impl AccessGranter for PostgresAccessGranter {
    async fn grant(&self, user_id: &UserId, item: &ItemRef) -> Result<(), GrantError> {
        let result = match item {
            ItemRef::Course(course_id) => {
                sqlx::query(
                    r#"
                    INSERT INTO enrollments (user_id, course_id, active, granted_at)
                    VALUES ($1, $2, TRUE, NOW())
                    ON CONFLICT (user_id, course_id) WHERE course_id IS NOT NULL
                    DO UPDATE SET active = TRUE
                    "#,
                )
                .bind(user_id.as_str())
                .bind(course_id.value())
                .execute(&self.pool)
                .await
            }
            ItemRef::Lesson(lesson_id) => {
                sqlx::query(
                    r#"
                    INSERT INTO enrollments (user_id, lesson_id, active, granted_at)
                    VALUES ($1, $2, TRUE, NOW())
                    ON CONFLICT (user_id, lesson_id) WHERE lesson_id IS NOT NULL
                    DO UPDATE SET active = TRUE
                    "#,
                )
                .bind(user_id.as_str())
                .bind(lesson_id.value())
                .execute(&self.pool)
                .await
            }
        };

        result.map_err(classify_grant_error)?;

        tracing::info!(
            user_id = %user_id,
            item = %item,
            "Access granted"
        );

        Ok(())
    }

    async fn has_access(&self, user_id: &UserId, item: &ItemRef) -> Result<bool, DomainError> {
        let (course_id, lesson_id) = match item {
            ItemRef::Course(id) => (Some(id.value()), None),
            ItemRef::Lesson(id) => (None, Some(id.value())),
        };

        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM enrollments
                WHERE user_id = $1
                  AND course_id IS NOT DISTINCT FROM $2
                  AND lesson_id IS NOT DISTINCT FROM $3
                  AND active
            )
            "#,
        )
        .bind(user_id.as_str())
        .bind(course_id)
        .bind(lesson_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to check access: {}", e),
            )
        })?;

        Ok(exists)
    }
}
