//! PostgreSQL implementation of UserDirectory.
//!
//! Account rows live in `users`. `last_seen_at` is bumped on authenticated
//! requests and read back by the inactivity sweep, which flips `is_active`
//! in bulk for accounts idle past the cutoff.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::users::UserProfile;
use crate::ports::UserDirectory;

/// PostgreSQL implementation of the UserDirectory port.
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    /// Creates a new PostgresUserDirectory with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a user account.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    display_name: String,
    email: Option<String>,
    bio: Option<String>,
    registered_at: DateTime<Utc>,
    last_seen_at: DateTime<Utc>,
    is_active: bool,
}

impl TryFrom<UserRow> for UserProfile {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(UserProfile {
            id: UserId::new(row.id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid user id: {}", e))
            })?,
            display_name: row.display_name,
            email: row.email,
            bio: row.bio,
            registered_at: Timestamp::from_datetime(row.registered_at),
            last_seen_at: Timestamp::from_datetime(row.last_seen_at),
            is_active: row.is_active,
        })
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, display_name, email, bio, registered_at, last_seen_at, is_active
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find user: {}", e),
            )
        })?;

        row.map(UserProfile::try_from).transpose()
    }

    async fn touch_last_seen(&self, user_id: &UserId) -> Result<(), DomainError> {
        sqlx::query("UPDATE users SET last_seen_at = NOW() WHERE id = $1")
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to touch last seen: {}", e),
                )
            })?;

        Ok(())
    }

    async fn deactivate_inactive_before(&self, cutoff: Timestamp) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_active = FALSE
            WHERE is_active AND last_seen_at < $1
            "#,
        )
        .bind(cutoff.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to deactivate inactive users: {}", e),
            )
        })?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_row_converts_to_profile() {
        let row = UserRow {
            id: "tg-501".to_string(),
            display_name: "Ada".to_string(),
            email: Some("ada@example.com".to_string()),
            bio: None,
            registered_at: Utc::now(),
            last_seen_at: Utc::now(),
            is_active: true,
        };

        let profile = UserProfile::try_from(row).unwrap();
        assert_eq!(profile.id.as_str(), "tg-501");
        assert_eq!(profile.email.as_deref(), Some("ada@example.com"));
        assert!(profile.is_active);
    }
}
