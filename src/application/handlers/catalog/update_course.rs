//! UpdateCourseHandler - Command handler for course edits.
//!
//! Owners and moderators may edit. A successful edit enqueues the subscriber
//! notification email; enqueue failures are logged and swallowed so a flaky
//! queue never turns a saved edit into an error response.

use std::sync::Arc;

use crate::domain::foundation::{CourseId, UserId};
use crate::domain::payment::{ItemRef, PurchaseError};
use crate::ports::{Authorizer, CatalogStore, Course, CourseUpdate, DeferredTask, Role, TaskQueue};

/// Command to edit a course's listing fields.
#[derive(Debug, Clone)]
pub struct UpdateCourseCommand {
    pub editor_id: UserId,
    pub course_id: CourseId,
    pub update: CourseUpdate,
}

/// The course after the edit.
#[derive(Debug, Clone)]
pub struct UpdateCourseResult {
    pub course: Course,
}

/// Handler for course edits.
pub struct UpdateCourseHandler {
    catalog_store: Arc<dyn CatalogStore>,
    authorizer: Arc<dyn Authorizer>,
    task_queue: Arc<dyn TaskQueue>,
}

impl UpdateCourseHandler {
    pub fn new(
        catalog_store: Arc<dyn CatalogStore>,
        authorizer: Arc<dyn Authorizer>,
        task_queue: Arc<dyn TaskQueue>,
    ) -> Self {
        Self {
            catalog_store,
            authorizer,
            task_queue,
        }
    }

    pub async fn handle(
        &self,
        command: UpdateCourseCommand,
    ) -> Result<UpdateCourseResult, PurchaseError> {
        // 1. Owner or moderator only
        let item = ItemRef::Course(command.course_id);
        let is_owner = self
            .authorizer
            .is_owner(&command.editor_id, &item)
            .await
            .map_err(|e| PurchaseError::infrastructure(e.to_string()))?;
        if !is_owner {
            let is_moderator = self
                .authorizer
                .has_role(&command.editor_id, Role::Moderator)
                .await
                .map_err(|e| PurchaseError::infrastructure(e.to_string()))?;
            if !is_moderator {
                return Err(PurchaseError::forbidden(
                    "Only the course owner or a moderator may edit a course",
                ));
            }
        }

        // 2. Refuse a no-op edit outright
        if command.update.is_empty() {
            return Err(PurchaseError::validation(
                "update",
                "At least one field must change",
            ));
        }

        // 3. Apply; a missing row means the course vanished under the editor
        let course = self
            .catalog_store
            .update_course(&command.course_id, &command.update)
            .await
            .map_err(|e| PurchaseError::infrastructure(e.to_string()))?
            .ok_or_else(|| PurchaseError::course_not_found(command.course_id))?;

        // 4. Notify subscribers off the request path
        let task = DeferredTask::CourseUpdateEmail {
            course_id: command.course_id,
        };
        if let Err(e) = self.task_queue.enqueue(&task).await {
            tracing::warn!(
                course_id = %command.course_id,
                error = %e,
                "Failed to enqueue course update notification"
            );
        }

        tracing::info!(
            course_id = %command.course_id,
            editor_id = %command.editor_id,
            "Course updated"
        );

        Ok(UpdateCourseResult { course })
    }
}
