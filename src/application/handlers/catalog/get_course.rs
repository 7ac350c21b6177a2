//! GetCourseHandler - Query handler for the public course page.

use std::sync::Arc;

use crate::domain::foundation::CourseId;
use crate::domain::payment::PurchaseError;
use crate::ports::{CatalogStore, Course};

/// Query for a single course.
#[derive(Debug, Clone)]
pub struct GetCourseQuery {
    pub course_id: CourseId,
}

/// The course as listed in the catalog.
#[derive(Debug, Clone)]
pub struct GetCourseResult {
    pub course: Course,
}

/// Handler for course reads. No authentication involved; the course page is
/// public.
pub struct GetCourseHandler {
    catalog_store: Arc<dyn CatalogStore>,
}

impl GetCourseHandler {
    pub fn new(catalog_store: Arc<dyn CatalogStore>) -> Self {
        Self { catalog_store }
    }

    pub async fn handle(&self, query: GetCourseQuery) -> Result<GetCourseResult, PurchaseError> {
        let course = self
            .catalog_store
            .find_course(&query.course_id)
            .await
            .map_err(|e| PurchaseError::infrastructure(e.to_string()))?
            .ok_or_else(|| PurchaseError::course_not_found(query.course_id))?;

        Ok(GetCourseResult { course })
    }
}
