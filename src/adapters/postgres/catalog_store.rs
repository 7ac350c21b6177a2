//! PostgreSQL implementation of CatalogStore.
//!
//! Courses and lessons are separate tables with the same money columns
//! (`price_minor` + `currency`). The partial course update uses COALESCE so
//! untouched fields keep their values in a single statement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::{
    CourseId, Currency, DomainError, ErrorCode, LessonId, Money, Timestamp, UserId,
};
use crate::domain::payment::ItemRef;
use crate::ports::{CatalogItem, CatalogStore, Course, CourseUpdate, Lesson};

/// PostgreSQL implementation of the CatalogStore port.
pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    /// Creates a new PostgresCatalogStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a course.
#[derive(Debug, sqlx::FromRow)]
struct CourseRow {
    id: i64,
    owner_id: Option<String>,
    title: String,
    description: Option<String>,
    price_minor: i64,
    currency: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CourseRow> for Course {
    type Error = DomainError;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        Ok(Course {
            id: CourseId::new(row.id),
            title: row.title,
            description: row.description,
            price: parse_price(row.price_minor, &row.currency)?,
            owner_id: parse_owner(row.owner_id)?,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

/// Database row representation of a lesson.
#[derive(Debug, sqlx::FromRow)]
struct LessonRow {
    id: i64,
    course_id: Option<i64>,
    owner_id: Option<String>,
    title: String,
    price_minor: i64,
    currency: String,
}

impl TryFrom<LessonRow> for Lesson {
    type Error = DomainError;

    fn try_from(row: LessonRow) -> Result<Self, Self::Error> {
        Ok(Lesson {
            id: LessonId::new(row.id),
            course_id: row.course_id.map(CourseId::new),
            title: row.title,
            price: parse_price(row.price_minor, &row.currency)?,
            owner_id: parse_owner(row.owner_id)?,
        })
    }
}

fn parse_price(minor: i64, currency: &str) -> Result<Money, DomainError> {
    let currency = currency.parse::<Currency>().map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid currency: {}", e))
    })?;
    Money::from_minor_units(minor, currency)
        .map_err(|e| DomainError::new(ErrorCode::DatabaseError, format!("Invalid price: {}", e)))
}

fn parse_owner(owner_id: Option<String>) -> Result<Option<UserId>, DomainError> {
    owner_id
        .map(|id| {
            UserId::new(id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid owner_id: {}", e))
            })
        })
        .transpose()
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    async fn find_item(&self, item: &ItemRef) -> Result<Option<CatalogItem>, DomainError> {
        match item {
            ItemRef::Course(id) => {
                let course = self.find_course(id).await?;
                Ok(course.map(|c| CatalogItem {
                    item: *item,
                    title: c.title,
                    price: c.price,
                    owner_id: c.owner_id,
                }))
            }
            ItemRef::Lesson(id) => {
                let lesson = self.find_lesson(id).await?;
                Ok(lesson.map(|l| CatalogItem {
                    item: *item,
                    title: l.title,
                    price: l.price,
                    owner_id: l.owner_id,
                }))
            }
        }
    }

    async fn find_course(&self, id: &CourseId) -> Result<Option<Course>, DomainError> {
        let row: Option<CourseRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, title, description, price_minor, currency, created_at, updated_at
            FROM courses
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find course: {}", e),
            )
        })?;

        row.map(Course::try_from).transpose()
    }

    async fn find_lesson(&self, id: &LessonId) -> Result<Option<Lesson>, DomainError> {
        let row: Option<LessonRow> = sqlx::query_as(
            r#"
            SELECT id, course_id, owner_id, title, price_minor, currency
            FROM lessons
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find lesson: {}", e),
            )
        })?;

        row.map(Lesson::try_from).transpose()
    }

    async fn update_course(
        &self,
        id: &CourseId,
        update: &CourseUpdate,
    ) -> Result<Option<Course>, DomainError> {
        let price_minor = update.price.as_ref().map(|p| p.minor_units());
        let currency = update.price.as_ref().map(|p| p.currency().as_str());

        let row: Option<CourseRow> = sqlx::query_as(
            r#"
            UPDATE courses
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                price_minor = COALESCE($4, price_minor),
                currency = COALESCE($5, currency),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, owner_id, title, description, price_minor, currency, created_at, updated_at
            "#,
        )
        .bind(id.value())
        .bind(&update.title)
        .bind(&update.description)
        .bind(price_minor)
        .bind(currency)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update course: {}", e),
            )
        })?;

        row.map(Course::try_from).transpose()
    }
}
