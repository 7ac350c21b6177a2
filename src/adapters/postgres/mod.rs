//! PostgreSQL adapters - Database implementations for storage ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresPaymentStore` - Payment records and status transitions
//! - `PostgresWebhookEventStore` - Processed-event log for webhook dedup
//! - `PostgresAccessGranter` - Enrollment rows granting item access
//! - `PostgresCatalogStore` - Courses and lessons lookup and edits
//! - `PostgresSubscriptionStore` - Course update subscriptions
//! - `PostgresUserDirectory` - User profiles and activity tracking
//! - `PostgresTaskQueue` - Deferred task queue with locked claiming
//! - `PostgresAuthorizer` - Ownership and role checks

mod access_granter;
mod authorizer;
mod catalog_store;
mod payment_store;
mod subscription_store;
mod task_queue;
mod user_directory;
mod webhook_event_store;

pub use access_granter::PostgresAccessGranter;
pub use authorizer::PostgresAuthorizer;
pub use catalog_store::PostgresCatalogStore;
pub use payment_store::PostgresPaymentStore;
pub use subscription_store::PostgresSubscriptionStore;
pub use task_queue::PostgresTaskQueue;
pub use user_directory::PostgresUserDirectory;
pub use webhook_event_store::PostgresWebhookEventStore;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;

/// Builds the shared connection pool from database configuration.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .connect(&config.url)
        .await
}
