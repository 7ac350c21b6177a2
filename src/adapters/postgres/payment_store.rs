//! PostgreSQL implementation of PaymentStore.
//!
//! One row per purchase attempt. The status column is only ever written
//! through `update_status`, a single conditional UPDATE, so concurrent
//! reconcilers (webhook vs. poll) cannot double-settle a record.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    Currency, DomainError, ErrorCode, Money, PaymentId, Timestamp, UserId,
};
use crate::domain::payment::{ItemRef, PaymentMethod, PaymentRecord, PaymentStatus};
use crate::ports::PaymentStore;

/// PostgreSQL implementation of the PaymentStore port.
pub struct PostgresPaymentStore {
    pool: PgPool,
}

impl PostgresPaymentStore {
    /// Creates a new PostgresPaymentStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a payment.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    buyer_id: String,
    course_id: Option<i64>,
    lesson_id: Option<i64>,
    amount_minor: i64,
    currency: String,
    method: String,
    status: String,
    gateway_session_id: Option<String>,
    gateway_payment_intent_id: Option<String>,
    gateway_customer_id: Option<String>,
    gateway_metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for PaymentRecord {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let item = ItemRef::from_optional(row.course_id, row.lesson_id).map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Payment row violates the course-xor-lesson rule: {}", e),
            )
        })?;

        let currency = parse_currency(&row.currency)?;
        let amount = Money::from_minor_units(row.amount_minor, currency).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid amount: {}", e))
        })?;

        Ok(PaymentRecord {
            id: PaymentId::from_uuid(row.id),
            buyer_id: UserId::new(row.buyer_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid buyer_id: {}", e))
            })?,
            item,
            amount,
            method: parse_method(&row.method)?,
            status: parse_status(&row.status)?,
            gateway_session_id: row.gateway_session_id,
            gateway_payment_intent_id: row.gateway_payment_intent_id,
            gateway_customer_id: row.gateway_customer_id,
            gateway_metadata: metadata_from_json(row.gateway_metadata),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_status(s: &str) -> Result<PaymentStatus, DomainError> {
    match s.to_lowercase().as_str() {
        "pending" => Ok(PaymentStatus::Pending),
        "paid" => Ok(PaymentStatus::Paid),
        "cancelled" => Ok(PaymentStatus::Cancelled),
        "failed" => Ok(PaymentStatus::Failed),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid payment status value: {}", s),
        )),
    }
}

fn parse_method(s: &str) -> Result<PaymentMethod, DomainError> {
    match s.to_lowercase().as_str() {
        "cash" => Ok(PaymentMethod::Cash),
        "transfer" => Ok(PaymentMethod::Transfer),
        "gateway" => Ok(PaymentMethod::Gateway),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid payment method value: {}", s),
        )),
    }
}

fn parse_currency(s: &str) -> Result<Currency, DomainError> {
    s.parse::<Currency>().map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid currency: {}", e))
    })
}

/// Split an item reference into the two nullable columns.
fn item_columns(item: &ItemRef) -> (Option<i64>, Option<i64>) {
    match item {
        ItemRef::Course(id) => (Some(id.value()), None),
        ItemRef::Lesson(id) => (None, Some(id.value())),
    }
}

fn metadata_to_json(metadata: &HashMap<String, String>) -> serde_json::Value {
    serde_json::to_value(metadata).unwrap_or_else(|_| serde_json::json!({}))
}

fn metadata_from_json(value: serde_json::Value) -> HashMap<String, String> {
    serde_json::from_value(value).unwrap_or_default()
}

#[async_trait]
impl PaymentStore for PostgresPaymentStore {
    async fn create(&self, record: &PaymentRecord) -> Result<(), DomainError> {
        let (course_id, lesson_id) = item_columns(&record.item);

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, buyer_id, course_id, lesson_id, amount_minor, currency, method, status,
                gateway_session_id, gateway_payment_intent_id, gateway_customer_id,
                gateway_metadata, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.buyer_id.as_str())
        .bind(course_id)
        .bind(lesson_id)
        .bind(record.amount.minor_units())
        .bind(record.amount.currency().as_str())
        .bind(record.method.as_str())
        .bind(record.status.as_str())
        .bind(&record.gateway_session_id)
        .bind(&record.gateway_payment_intent_id)
        .bind(&record.gateway_customer_id)
        .bind(metadata_to_json(&record.gateway_metadata))
        .bind(record.created_at.as_datetime())
        .bind(record.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to create payment: {}", e),
            )
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<PaymentRecord>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(
            r#"
            SELECT id, buyer_id, course_id, lesson_id, amount_minor, currency, method, status,
                   gateway_session_id, gateway_payment_intent_id, gateway_customer_id,
                   gateway_metadata, created_at, updated_at
            FROM payments
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find payment: {}", e),
            )
        })?;

        row.map(PaymentRecord::try_from).transpose()
    }

    async fn find_by_session_id(
        &self,
        session_id: &str,
    ) -> Result<Option<PaymentRecord>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(
            r#"
            SELECT id, buyer_id, course_id, lesson_id, amount_minor, currency, method, status,
                   gateway_session_id, gateway_payment_intent_id, gateway_customer_id,
                   gateway_metadata, created_at, updated_at
            FROM payments
            WHERE gateway_session_id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find payment by session: {}", e),
            )
        })?;

        row.map(PaymentRecord::try_from).transpose()
    }

    async fn find_active_attempt(
        &self,
        buyer_id: &UserId,
        item: &ItemRef,
    ) -> Result<Option<PaymentRecord>, DomainError> {
        let (course_id, lesson_id) = item_columns(item);

        // Paid or still-pending rows block a repurchase; cancelled and
        // failed attempts do not.
        let row: Option<PaymentRow> = sqlx::query_as(
            r#"
            SELECT id, buyer_id, course_id, lesson_id, amount_minor, currency, method, status,
                   gateway_session_id, gateway_payment_intent_id, gateway_customer_id,
                   gateway_metadata, created_at, updated_at
            FROM payments
            WHERE buyer_id = $1
              AND course_id IS NOT DISTINCT FROM $2
              AND lesson_id IS NOT DISTINCT FROM $3
              AND status IN ('pending', 'paid')
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(buyer_id.as_str())
        .bind(course_id)
        .bind(lesson_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find active attempt: {}", e),
            )
        })?;

        row.map(PaymentRecord::try_from).transpose()
    }

    async fn update_status(
        &self,
        id: &PaymentId,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> Result<bool, DomainError> {
        // The optimistic concurrency guard: exactly one writer can move a
        // row out of `from`. A zero row count means someone else already did.
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update payment status: {}", e),
            )
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn attach_gateway_session(
        &self,
        id: &PaymentId,
        session_id: &str,
        customer_id: Option<&str>,
        metadata: &HashMap<String, String>,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET gateway_session_id = $2,
                gateway_customer_id = $3,
                gateway_metadata = $4,
                updated_at = NOW()
            WHERE id = $1 AND gateway_session_id IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .bind(session_id)
        .bind(customer_id)
        .bind(metadata_to_json(metadata))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to attach gateway session: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::PaymentNotFound,
                "Payment not found or already has a gateway session",
            ));
        }

        Ok(())
    }

    async fn record_payment_intent(
        &self,
        id: &PaymentId,
        payment_intent_id: &str,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE payments
            SET gateway_payment_intent_id = $2, updated_at = NOW()
            WHERE id = $1 AND gateway_payment_intent_id IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .bind(payment_intent_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to record payment intent: {}", e),
            )
        })?;

        Ok(())
    }

    async fn list_for_buyer(
        &self,
        buyer_id: &UserId,
    ) -> Result<Vec<PaymentRecord>, DomainError> {
        let rows: Vec<PaymentRow> = sqlx::query_as(
            r#"
            SELECT id, buyer_id, course_id, lesson_id, amount_minor, currency, method, status,
                   gateway_session_id, gateway_payment_intent_id, gateway_customer_id,
                   gateway_metadata, created_at, updated_at
            FROM payments
            WHERE buyer_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(buyer_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to list payments: {}", e),
            )
        })?;

        rows.into_iter().map(PaymentRecord::try_from).collect()
    }
}
