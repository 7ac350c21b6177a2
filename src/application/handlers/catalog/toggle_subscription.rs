//! ToggleSubscriptionHandler - Command handler for course update subscriptions.

use std::sync::Arc;

use crate::domain::foundation::{CourseId, UserId};
use crate::domain::payment::PurchaseError;
use crate::ports::{CatalogStore, SubscriptionStore};

/// Command to flip a user's subscription to a course's update emails.
#[derive(Debug, Clone)]
pub struct ToggleSubscriptionCommand {
    pub user_id: UserId,
    pub course_id: CourseId,
}

/// The subscription state after the toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleSubscriptionResult {
    pub subscribed: bool,
}

/// Handler for subscription toggles.
pub struct ToggleSubscriptionHandler {
    catalog_store: Arc<dyn CatalogStore>,
    subscription_store: Arc<dyn SubscriptionStore>,
}

impl ToggleSubscriptionHandler {
    pub fn new(
        catalog_store: Arc<dyn CatalogStore>,
        subscription_store: Arc<dyn SubscriptionStore>,
    ) -> Self {
        Self {
            catalog_store,
            subscription_store,
        }
    }

    pub async fn handle(
        &self,
        command: ToggleSubscriptionCommand,
    ) -> Result<ToggleSubscriptionResult, PurchaseError> {
        // Subscriptions to courses that do not exist would sit invisible
        // forever; refuse them up front
        let exists = self
            .catalog_store
            .find_course(&command.course_id)
            .await
            .map_err(|e| PurchaseError::infrastructure(e.to_string()))?
            .is_some();
        if !exists {
            return Err(PurchaseError::course_not_found(command.course_id));
        }

        let subscribed = self
            .subscription_store
            .toggle(&command.user_id, &command.course_id)
            .await
            .map_err(|e| PurchaseError::infrastructure(e.to_string()))?;

        tracing::debug!(
            user_id = %command.user_id,
            course_id = %command.course_id,
            subscribed,
            "Subscription toggled"
        );

        Ok(ToggleSubscriptionResult { subscribed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::domain::foundation::{Currency, DomainError, LessonId, Money, Timestamp};
    use crate::domain::payment::ItemRef;
    use crate::ports::{CatalogItem, Course, CourseUpdate, Lesson};

    struct MockCatalogStore {
        has_course: bool,
    }

    #[async_trait]
    impl CatalogStore for MockCatalogStore {
        async fn find_item(&self, _item: &ItemRef) -> Result<Option<CatalogItem>, DomainError> {
            Ok(None)
        }

        async fn find_course(&self, id: &CourseId) -> Result<Option<Course>, DomainError> {
            Ok(self.has_course.then(|| Course {
                id: *id,
                title: "Rust for analysts".to_string(),
                description: None,
                price: Money::from_minor_units(50_000, Currency::Rub).unwrap(),
                owner_id: None,
                created_at: Timestamp::from_unix_secs(1_700_000_000),
                updated_at: Timestamp::from_unix_secs(1_700_000_000),
            }))
        }

        async fn find_lesson(&self, _id: &LessonId) -> Result<Option<Lesson>, DomainError> {
            Ok(None)
        }

        async fn update_course(
            &self,
            _id: &CourseId,
            _update: &CourseUpdate,
        ) -> Result<Option<Course>, DomainError> {
            Ok(None)
        }
    }

    struct MockSubscriptionStore {
        subscribed: Mutex<HashSet<(UserId, CourseId)>>,
    }

    impl MockSubscriptionStore {
        fn new() -> Self {
            Self {
                subscribed: Mutex::new(HashSet::new()),
            }
        }
    }

    #[async_trait]
    impl SubscriptionStore for MockSubscriptionStore {
        async fn toggle(
            &self,
            user_id: &UserId,
            course_id: &CourseId,
        ) -> Result<bool, DomainError> {
            let mut subscribed = self.subscribed.lock().unwrap();
            let key = (user_id.clone(), *course_id);
            if subscribed.remove(&key) {
                Ok(false)
            } else {
                subscribed.insert(key);
                Ok(true)
            }
        }

        async fn is_subscribed(
            &self,
            user_id: &UserId,
            course_id: &CourseId,
        ) -> Result<bool, DomainError> {
            Ok(self
                .subscribed
                .lock()
                .unwrap()
                .contains(&(user_id.clone(), *course_id)))
        }

        async fn list_subscriber_emails(
            &self,
            _course_id: &CourseId,
        ) -> Result<Vec<String>, DomainError> {
            Ok(vec![])
        }
    }

    fn handler(has_course: bool) -> ToggleSubscriptionHandler {
        ToggleSubscriptionHandler::new(
            Arc::new(MockCatalogStore { has_course }),
            Arc::new(MockSubscriptionStore::new()),
        )
    }

    fn command() -> ToggleSubscriptionCommand {
        ToggleSubscriptionCommand {
            user_id: UserId::new("tg-501").unwrap(),
            course_id: CourseId::new(42),
        }
    }

    #[tokio::test]
    async fn first_toggle_subscribes_second_unsubscribes() {
        let handler = handler(true);

        let first = handler.handle(command()).await.unwrap();
        let second = handler.handle(command()).await.unwrap();

        assert!(first.subscribed);
        assert!(!second.subscribed);
    }

    #[tokio::test]
    async fn unknown_course_is_not_found() {
        let handler = handler(false);

        let result = handler.handle(command()).await;

        assert!(matches!(result, Err(PurchaseError::CourseNotFound(_))));
    }
}
