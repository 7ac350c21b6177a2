//! PostgreSQL implementation of the Authorizer port.
//!
//! Ownership comes from the `owner_id` column of the item's table; roles
//! come from `users.role`. Both checks are single EXISTS queries.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::payment::ItemRef;
use crate::ports::{Authorizer, Role};

/// PostgreSQL implementation of the Authorizer port.
pub struct PostgresAuthorizer {
    pool: PgPool,
}

impl PostgresAuthorizer {
    /// Creates a new PostgresAuthorizer.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Authorizer for PostgresAuthorizer {
    async fn is_owner(&self, user_id: &UserId, item: &ItemRef) -> Result<bool, DomainError> {
        let query = match item {
            ItemRef::Course(_) => {
                r#"
                SELECT EXISTS (
                    SELECT 1 FROM courses WHERE id = $1 AND owner_id = $2
                )
                "#
            }
            ItemRef::Lesson(_) => {
                r#"
                SELECT EXISTS (
                    SELECT 1 FROM lessons WHERE id = $1 AND owner_id = $2
                )
                "#
            }
        };

        let owns: bool = sqlx::query_scalar(query)
            .bind(item.raw_id())
            .bind(user_id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to check item ownership: {}", e),
                )
            })?;

        Ok(owns)
    }

    async fn has_role(&self, user_id: &UserId, role: Role) -> Result<bool, DomainError> {
        // A missing user row simply holds no role.
        let holds: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM users WHERE id = $1 AND role = $2
            )
            "#,
        )
        .bind(user_id.as_str())
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to check user role: {}", e),
            )
        })?;

        Ok(holds)
    }
}
