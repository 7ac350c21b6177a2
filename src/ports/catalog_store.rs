//! Catalog store port (read side for courses and lessons).
//!
//! Purchases only need a thin view of the catalog: does the item exist, what
//! does it cost, who owns it. The catalog HTTP surface additionally reads and
//! updates full course rows.

use async_trait::async_trait;

use crate::domain::foundation::{CourseId, DomainError, LessonId, Money, Timestamp, UserId};
use crate::domain::payment::ItemRef;

/// The slice of a catalog row that purchasing needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    /// Which course or lesson this is.
    pub item: ItemRef,

    /// Display title, used as the checkout line item name.
    pub title: String,

    /// Current price.
    pub price: Money,

    /// Author of the item, when recorded. Owners cannot buy their own items.
    pub owner_id: Option<UserId>,
}

/// Full course row for the catalog surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub description: Option<String>,
    pub price: Money,
    pub owner_id: Option<UserId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Lesson row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    pub id: LessonId,
    pub course_id: Option<CourseId>,
    pub title: String,
    pub price: Money,
    pub owner_id: Option<UserId>,
}

/// Partial update applied to a course. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
}

impl CourseUpdate {
    /// True when the patch carries no changes.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.price.is_none()
    }
}

/// Port for catalog reads and course updates.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Resolve the purchasable view of a course or lesson.
    ///
    /// Returns `None` when the item does not exist.
    async fn find_item(&self, item: &ItemRef) -> Result<Option<CatalogItem>, DomainError>;

    /// Load a full course row.
    async fn find_course(&self, id: &CourseId) -> Result<Option<Course>, DomainError>;

    /// Load a lesson row.
    async fn find_lesson(&self, id: &LessonId) -> Result<Option<Lesson>, DomainError>;

    /// Apply a partial update to a course and return the updated row.
    ///
    /// Returns `None` when the course does not exist.
    async fn update_course(
        &self,
        id: &CourseId,
        update: &CourseUpdate,
    ) -> Result<Option<Course>, DomainError>;
}
