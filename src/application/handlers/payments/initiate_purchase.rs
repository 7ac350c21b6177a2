//! InitiatePurchaseHandler - Command handler for opening a purchase.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::payment::{
    ItemRef, PaymentDraft, PaymentMethod, PaymentRecord, PurchaseError,
};
use crate::ports::{
    AccessGranter, Authorizer, CatalogStore, CreateCheckoutSessionRequest, PaymentGateway,
    PaymentStore, Role,
};

/// Command to initiate a purchase.
///
/// Exactly one of `course_id` / `lesson_id` must be set.
#[derive(Debug, Clone)]
pub struct InitiatePurchaseCommand {
    pub buyer_id: UserId,
    pub course_id: Option<i64>,
    pub lesson_id: Option<i64>,
    pub method: PaymentMethod,
    pub customer_email: Option<String>,
}

/// Result of a successfully opened purchase.
#[derive(Debug, Clone)]
pub struct InitiatePurchaseResult {
    /// The pending record, with gateway references attached when applicable.
    pub payment: PaymentRecord,

    /// Redirect URL for gateway purchases; `None` for cash and transfer.
    pub checkout_url: Option<String>,
}

/// Handler for initiating purchases.
///
/// Creates a pending payment record and, for gateway purchases, opens a
/// hosted checkout session. The record is persisted before the gateway is
/// called: a gateway failure leaves a pending record behind, which a later
/// attempt or the session-expiry webhook resolves.
pub struct InitiatePurchaseHandler {
    payment_store: Arc<dyn PaymentStore>,
    catalog_store: Arc<dyn CatalogStore>,
    authorizer: Arc<dyn Authorizer>,
    access_granter: Arc<dyn AccessGranter>,
    gateway: Arc<dyn PaymentGateway>,
}

impl InitiatePurchaseHandler {
    pub fn new(
        payment_store: Arc<dyn PaymentStore>,
        catalog_store: Arc<dyn CatalogStore>,
        authorizer: Arc<dyn Authorizer>,
        access_granter: Arc<dyn AccessGranter>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            payment_store,
            catalog_store,
            authorizer,
            access_granter,
            gateway,
        }
    }

    pub async fn handle(
        &self,
        cmd: InitiatePurchaseCommand,
    ) -> Result<InitiatePurchaseResult, PurchaseError> {
        // 1. Resolve the item reference (course XOR lesson)
        let item = ItemRef::from_optional(cmd.course_id, cmd.lesson_id)
            .map_err(|e| PurchaseError::validation("item", e.message))?;

        // 2. Look up the item in the catalog
        let catalog_item = self
            .catalog_store
            .find_item(&item)
            .await
            .map_err(|e| PurchaseError::infrastructure(e.to_string()))?
            .ok_or_else(|| match item {
                ItemRef::Course(id) => PurchaseError::course_not_found(id),
                ItemRef::Lesson(id) => PurchaseError::lesson_not_found(id),
            })?;

        // 3. Moderators curate content; they never hold purchases
        if self
            .authorizer
            .has_role(&cmd.buyer_id, Role::Moderator)
            .await
            .map_err(|e| PurchaseError::infrastructure(e.to_string()))?
        {
            return Err(PurchaseError::forbidden("Moderators cannot purchase content"));
        }

        // 4. Authors already have access to their own items
        if self
            .authorizer
            .is_owner(&cmd.buyer_id, &item)
            .await
            .map_err(|e| PurchaseError::infrastructure(e.to_string()))?
        {
            return Err(PurchaseError::already_owner(cmd.buyer_id, item));
        }

        // 5. An existing entitlement makes a second purchase pointless
        if self
            .access_granter
            .has_access(&cmd.buyer_id, &item)
            .await
            .map_err(|e| PurchaseError::infrastructure(e.to_string()))?
        {
            return Err(PurchaseError::duplicate_purchase(cmd.buyer_id, item));
        }

        // 6. A paid or still-open attempt blocks a new one
        if let Some(existing) = self
            .payment_store
            .find_active_attempt(&cmd.buyer_id, &item)
            .await
            .map_err(|e| PurchaseError::infrastructure(e.to_string()))?
        {
            if existing.blocks_repurchase() {
                return Err(PurchaseError::duplicate_purchase(cmd.buyer_id, item));
            }
        }

        // 7. Open the pending record with the price fixed from the catalog
        let mut record = PaymentRecord::create(PaymentDraft {
            buyer_id: cmd.buyer_id.clone(),
            item,
            amount: catalog_item.price,
            method: cmd.method,
        });

        self.payment_store
            .create(&record)
            .await
            .map_err(|e| PurchaseError::infrastructure(e.to_string()))?;

        // 8. Cash and transfer settle out of band; no session to open
        if !cmd.method.uses_gateway() {
            tracing::info!(
                payment_id = %record.id,
                buyer_id = %record.buyer_id,
                item = %record.item,
                method = cmd.method.as_str(),
                "Purchase opened for out-of-band settlement"
            );
            return Ok(InitiatePurchaseResult {
                payment: record,
                checkout_url: None,
            });
        }

        // 9. Open the hosted checkout session; the pending record survives a
        //    gateway failure and is retried or expired later
        let handle = self
            .gateway
            .create_checkout_session(CreateCheckoutSessionRequest {
                payment_id: record.id,
                buyer_id: cmd.buyer_id.clone(),
                item_name: catalog_item.title,
                amount: record.amount,
                customer_email: cmd.customer_email,
            })
            .await
            .map_err(|e| PurchaseError::gateway_unavailable(e.to_string()))?;

        // 10. Attach the session references, in storage and on the result
        self.payment_store
            .attach_gateway_session(
                &record.id,
                &handle.id,
                handle.customer_id.as_deref(),
                &handle.metadata,
            )
            .await
            .map_err(|e| PurchaseError::infrastructure(e.to_string()))?;

        record
            .attach_gateway_session(
                handle.id.clone(),
                handle.customer_id.clone(),
                handle.metadata.clone(),
            )
            .map_err(|e| PurchaseError::infrastructure(e.to_string()))?;

        tracing::info!(
            payment_id = %record.id,
            buyer_id = %record.buyer_id,
            item = %record.item,
            session_id = %handle.id,
            "Checkout session opened"
        );

        Ok(InitiatePurchaseResult {
            payment: record,
            checkout_url: Some(handle.url),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::domain::foundation::{
        CourseId, Currency, DomainError, ErrorCode, Money, PaymentId,
    };
    use crate::domain::payment::PaymentStatus;
    use crate::ports::{
        CatalogItem, Course, CourseUpdate, GatewayError, GrantError, Lesson, SessionHandle,
        SessionSnapshot,
    };

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    struct MockPaymentStore {
        created: Mutex<Vec<PaymentRecord>>,
        active_attempt: Option<PaymentRecord>,
        attached_sessions: Mutex<Vec<(PaymentId, String)>>,
        fail_create: bool,
    }

    impl MockPaymentStore {
        fn new() -> Self {
            Self {
                created: Mutex::new(Vec::new()),
                active_attempt: None,
                attached_sessions: Mutex::new(Vec::new()),
                fail_create: false,
            }
        }

        fn with_active_attempt(record: PaymentRecord) -> Self {
            Self {
                created: Mutex::new(Vec::new()),
                active_attempt: Some(record),
                attached_sessions: Mutex::new(Vec::new()),
                fail_create: false,
            }
        }

        fn failing_create() -> Self {
            Self {
                created: Mutex::new(Vec::new()),
                active_attempt: None,
                attached_sessions: Mutex::new(Vec::new()),
                fail_create: true,
            }
        }

        fn created_records(&self) -> Vec<PaymentRecord> {
            self.created.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PaymentStore for MockPaymentStore {
        async fn create(&self, record: &PaymentRecord) -> Result<(), DomainError> {
            if self.fail_create {
                return Err(DomainError::new(
                    ErrorCode::DatabaseError,
                    "Simulated create failure",
                ));
            }
            self.created.lock().unwrap().push(record.clone());
            Ok(())
        }

        async fn find_by_id(&self, _id: &PaymentId) -> Result<Option<PaymentRecord>, DomainError> {
            Ok(None)
        }

        async fn find_by_session_id(
            &self,
            _session_id: &str,
        ) -> Result<Option<PaymentRecord>, DomainError> {
            Ok(None)
        }

        async fn find_active_attempt(
            &self,
            _buyer_id: &UserId,
            _item: &ItemRef,
        ) -> Result<Option<PaymentRecord>, DomainError> {
            Ok(self.active_attempt.clone())
        }

        async fn update_status(
            &self,
            _id: &PaymentId,
            _from: PaymentStatus,
            _to: PaymentStatus,
        ) -> Result<bool, DomainError> {
            Ok(false)
        }

        async fn attach_gateway_session(
            &self,
            id: &PaymentId,
            session_id: &str,
            _customer_id: Option<&str>,
            _metadata: &HashMap<String, String>,
        ) -> Result<(), DomainError> {
            self.attached_sessions
                .lock()
                .unwrap()
                .push((*id, session_id.to_string()));
            Ok(())
        }

        async fn record_payment_intent(
            &self,
            _id: &PaymentId,
            _payment_intent_id: &str,
        ) -> Result<(), DomainError> {
            Ok(())
        }

        async fn list_for_buyer(
            &self,
            _buyer_id: &UserId,
        ) -> Result<Vec<PaymentRecord>, DomainError> {
            Ok(vec![])
        }
    }

    struct MockCatalogStore {
        item: Option<CatalogItem>,
    }

    impl MockCatalogStore {
        fn with_item(item: CatalogItem) -> Self {
            Self { item: Some(item) }
        }

        fn empty() -> Self {
            Self { item: None }
        }
    }

    #[async_trait]
    impl CatalogStore for MockCatalogStore {
        async fn find_item(&self, _item: &ItemRef) -> Result<Option<CatalogItem>, DomainError> {
            Ok(self.item.clone())
        }

        async fn find_course(&self, _id: &CourseId) -> Result<Option<Course>, DomainError> {
            Ok(None)
        }

        async fn find_lesson(
            &self,
            _id: &crate::domain::foundation::LessonId,
        ) -> Result<Option<Lesson>, DomainError> {
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

    struct MockAuthorizer {
        owner: bool,
        moderator: bool,
    }

    impl MockAuthorizer {
        fn permissive() -> Self {
            Self {
                owner: false,
                moderator: false,
            }
        }

        fn owns_item() -> Self {
            Self {
                owner: true,
                moderator: false,
            }
        }

        fn moderator() -> Self {
            Self {
                owner: false,
                moderator: true,
            }
        }
    }

    #[async_trait]
    impl Authorizer for MockAuthorizer {
        async fn is_owner(&self, _user_id: &UserId, _item: &ItemRef) -> Result<bool, DomainError> {
            Ok(self.owner)
        }

        async fn has_role(&self, _user_id: &UserId, role: Role) -> Result<bool, DomainError> {
            Ok(role == Role::Moderator && self.moderator)
        }
    }

    struct MockAccessGranter {
        has_access: bool,
    }

    #[async_trait]
    impl AccessGranter for MockAccessGranter {
        async fn grant(&self, _user_id: &UserId, _item: &ItemRef) -> Result<(), GrantError> {
            Ok(())
        }

        async fn has_access(&self, _user_id: &UserId, _item: &ItemRef) -> Result<bool, DomainError> {
            Ok(self.has_access)
        }
    }

    struct MockGateway {
        fail: bool,
        requests: Mutex<Vec<CreateCheckoutSessionRequest>>,
    }

    impl MockGateway {
        fn new() -> Self {
            Self {
                fail: false,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<CreateCheckoutSessionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PaymentGateway for MockGateway {
        async fn create_checkout_session(
            &self,
            request: CreateCheckoutSessionRequest,
        ) -> Result<SessionHandle, GatewayError> {
            if self.fail {
                return Err(GatewayError::network("Connection refused"));
            }
            let payment_id = request.payment_id;
            self.requests.lock().unwrap().push(request);
            let mut metadata = HashMap::new();
            metadata.insert("payment_id".to_string(), payment_id.to_string());
            Ok(SessionHandle {
                id: "cs_test_hand1".to_string(),
                url: "https://checkout.example.com/cs_test_hand1".to_string(),
                customer_id: Some("cus_test_1".to_string()),
                expires_at: 1_900_000_000,
                metadata,
            })
        }

        async fn retrieve_session(
            &self,
            _session_id: &str,
        ) -> Result<SessionSnapshot, GatewayError> {
            Err(GatewayError::not_found("session"))
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn buyer() -> UserId {
        UserId::new("tg-501").unwrap()
    }

    fn rub(major: i64) -> Money {
        Money::from_minor_units(major * 100, Currency::Rub).unwrap()
    }

    fn course_item() -> CatalogItem {
        CatalogItem {
            item: ItemRef::Course(CourseId::new(42)),
            title: "Rust for analysts".to_string(),
            price: rub(500),
            owner_id: Some(UserId::new("tg-900").unwrap()),
        }
    }

    fn command() -> InitiatePurchaseCommand {
        InitiatePurchaseCommand {
            buyer_id: buyer(),
            course_id: Some(42),
            lesson_id: None,
            method: PaymentMethod::Gateway,
            customer_email: Some("buyer@example.com".to_string()),
        }
    }

    fn handler_with(
        store: Arc<MockPaymentStore>,
        catalog: MockCatalogStore,
        authorizer: MockAuthorizer,
        has_access: bool,
        gateway: Arc<MockGateway>,
    ) -> InitiatePurchaseHandler {
        InitiatePurchaseHandler::new(
            store,
            Arc::new(catalog),
            Arc::new(authorizer),
            Arc::new(MockAccessGranter { has_access }),
            gateway,
        )
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Success Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn creates_pending_record_and_checkout_url() {
        let store = Arc::new(MockPaymentStore::new());
        let gateway = Arc::new(MockGateway::new());
        let handler = handler_with(
            store.clone(),
            MockCatalogStore::with_item(course_item()),
            MockAuthorizer::permissive(),
            false,
            gateway.clone(),
        );

        let result = handler.handle(command()).await.unwrap();

        assert_eq!(result.payment.status, PaymentStatus::Pending);
        assert_eq!(result.payment.item, ItemRef::Course(CourseId::new(42)));
        assert_eq!(result.payment.amount, rub(500));
        assert_eq!(
            result.checkout_url.as_deref(),
            Some("https://checkout.example.com/cs_test_hand1")
        );

        let created = store.created_records();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].id, result.payment.id);
    }

    #[tokio::test]
    async fn attaches_session_references_to_record() {
        let store = Arc::new(MockPaymentStore::new());
        let gateway = Arc::new(MockGateway::new());
        let handler = handler_with(
            store.clone(),
            MockCatalogStore::with_item(course_item()),
            MockAuthorizer::permissive(),
            false,
            gateway,
        );

        let result = handler.handle(command()).await.unwrap();

        assert_eq!(
            result.payment.gateway_session_id.as_deref(),
            Some("cs_test_hand1")
        );
        assert_eq!(
            result.payment.gateway_customer_id.as_deref(),
            Some("cus_test_1")
        );

        let attached = store.attached_sessions.lock().unwrap().clone();
        assert_eq!(attached, vec![(result.payment.id, "cs_test_hand1".to_string())]);
    }

    #[tokio::test]
    async fn passes_catalog_title_and_price_to_gateway() {
        let store = Arc::new(MockPaymentStore::new());
        let gateway = Arc::new(MockGateway::new());
        let handler = handler_with(
            store,
            MockCatalogStore::with_item(course_item()),
            MockAuthorizer::permissive(),
            false,
            gateway.clone(),
        );

        handler.handle(command()).await.unwrap();

        let requests = gateway.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].item_name, "Rust for analysts");
        assert_eq!(requests[0].amount, rub(500));
        assert_eq!(
            requests[0].customer_email.as_deref(),
            Some("buyer@example.com")
        );
    }

    #[tokio::test]
    async fn cash_purchase_skips_the_gateway() {
        let store = Arc::new(MockPaymentStore::new());
        let gateway = Arc::new(MockGateway::failing());
        let handler = handler_with(
            store.clone(),
            MockCatalogStore::with_item(course_item()),
            MockAuthorizer::permissive(),
            false,
            gateway,
        );

        let mut cmd = command();
        cmd.method = PaymentMethod::Cash;

        let result = handler.handle(cmd).await.unwrap();

        assert_eq!(result.payment.status, PaymentStatus::Pending);
        assert!(result.checkout_url.is_none());
        assert!(result.payment.gateway_session_id.is_none());
        assert_eq!(store.created_records().len(), 1);
    }

    #[tokio::test]
    async fn cancelled_prior_attempt_does_not_block() {
        let mut prior = PaymentRecord::create(PaymentDraft {
            buyer_id: buyer(),
            item: ItemRef::Course(CourseId::new(42)),
            amount: rub(500),
            method: PaymentMethod::Gateway,
        });
        prior.status = PaymentStatus::Cancelled;

        let store = Arc::new(MockPaymentStore::with_active_attempt(prior));
        let gateway = Arc::new(MockGateway::new());
        let handler = handler_with(
            store.clone(),
            MockCatalogStore::with_item(course_item()),
            MockAuthorizer::permissive(),
            false,
            gateway,
        );

        let result = handler.handle(command()).await;
        assert!(result.is_ok());
        assert_eq!(store.created_records().len(), 1);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Failure Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn rejects_both_course_and_lesson() {
        let store = Arc::new(MockPaymentStore::new());
        let handler = handler_with(
            store.clone(),
            MockCatalogStore::with_item(course_item()),
            MockAuthorizer::permissive(),
            false,
            Arc::new(MockGateway::new()),
        );

        let mut cmd = command();
        cmd.lesson_id = Some(7);

        let result = handler.handle(cmd).await;
        assert!(matches!(result, Err(PurchaseError::ValidationFailed { .. })));
        assert!(store.created_records().is_empty());
    }

    #[tokio::test]
    async fn rejects_neither_course_nor_lesson() {
        let store = Arc::new(MockPaymentStore::new());
        let handler = handler_with(
            store.clone(),
            MockCatalogStore::with_item(course_item()),
            MockAuthorizer::permissive(),
            false,
            Arc::new(MockGateway::new()),
        );

        let mut cmd = command();
        cmd.course_id = None;

        let result = handler.handle(cmd).await;
        assert!(matches!(result, Err(PurchaseError::ValidationFailed { .. })));
    }

    #[tokio::test]
    async fn fails_for_unknown_course() {
        let store = Arc::new(MockPaymentStore::new());
        let handler = handler_with(
            store.clone(),
            MockCatalogStore::empty(),
            MockAuthorizer::permissive(),
            false,
            Arc::new(MockGateway::new()),
        );

        let result = handler.handle(command()).await;
        assert!(matches!(result, Err(PurchaseError::CourseNotFound(_))));
        assert!(store.created_records().is_empty());
    }

    #[tokio::test]
    async fn fails_for_unknown_lesson() {
        let store = Arc::new(MockPaymentStore::new());
        let handler = handler_with(
            store,
            MockCatalogStore::empty(),
            MockAuthorizer::permissive(),
            false,
            Arc::new(MockGateway::new()),
        );

        let mut cmd = command();
        cmd.course_id = None;
        cmd.lesson_id = Some(7);

        let result = handler.handle(cmd).await;
        assert!(matches!(result, Err(PurchaseError::LessonNotFound(_))));
    }

    #[tokio::test]
    async fn rejects_moderators() {
        let store = Arc::new(MockPaymentStore::new());
        let handler = handler_with(
            store.clone(),
            MockCatalogStore::with_item(course_item()),
            MockAuthorizer::moderator(),
            false,
            Arc::new(MockGateway::new()),
        );

        let result = handler.handle(command()).await;
        assert!(matches!(result, Err(PurchaseError::Forbidden { .. })));
        assert!(store.created_records().is_empty());
    }

    #[tokio::test]
    async fn rejects_the_item_owner() {
        let store = Arc::new(MockPaymentStore::new());
        let handler = handler_with(
            store.clone(),
            MockCatalogStore::with_item(course_item()),
            MockAuthorizer::owns_item(),
            false,
            Arc::new(MockGateway::new()),
        );

        let result = handler.handle(command()).await;
        assert!(matches!(result, Err(PurchaseError::AlreadyOwner { .. })));
        assert!(store.created_records().is_empty());
    }

    #[tokio::test]
    async fn rejects_buyer_with_existing_access() {
        let store = Arc::new(MockPaymentStore::new());
        let handler = handler_with(
            store.clone(),
            MockCatalogStore::with_item(course_item()),
            MockAuthorizer::permissive(),
            true,
            Arc::new(MockGateway::new()),
        );

        let result = handler.handle(command()).await;
        assert!(matches!(result, Err(PurchaseError::DuplicatePurchase { .. })));
        assert!(store.created_records().is_empty());
    }

    #[tokio::test]
    async fn rejects_second_purchase_of_paid_item() {
        let mut paid = PaymentRecord::create(PaymentDraft {
            buyer_id: buyer(),
            item: ItemRef::Course(CourseId::new(42)),
            amount: rub(500),
            method: PaymentMethod::Gateway,
        });
        paid.status = PaymentStatus::Paid;

        let store = Arc::new(MockPaymentStore::with_active_attempt(paid));
        let handler = handler_with(
            store.clone(),
            MockCatalogStore::with_item(course_item()),
            MockAuthorizer::permissive(),
            false,
            Arc::new(MockGateway::new()),
        );

        let result = handler.handle(command()).await;
        assert!(matches!(result, Err(PurchaseError::DuplicatePurchase { .. })));
        assert!(store.created_records().is_empty());
    }

    #[tokio::test]
    async fn rejects_while_another_attempt_is_pending() {
        let pending = PaymentRecord::create(PaymentDraft {
            buyer_id: buyer(),
            item: ItemRef::Course(CourseId::new(42)),
            amount: rub(500),
            method: PaymentMethod::Gateway,
        });

        let store = Arc::new(MockPaymentStore::with_active_attempt(pending));
        let handler = handler_with(
            store.clone(),
            MockCatalogStore::with_item(course_item()),
            MockAuthorizer::permissive(),
            false,
            Arc::new(MockGateway::new()),
        );

        let result = handler.handle(command()).await;
        assert!(matches!(result, Err(PurchaseError::DuplicatePurchase { .. })));
    }

    #[tokio::test]
    async fn gateway_failure_leaves_record_pending() {
        let store = Arc::new(MockPaymentStore::new());
        let handler = handler_with(
            store.clone(),
            MockCatalogStore::with_item(course_item()),
            MockAuthorizer::permissive(),
            false,
            Arc::new(MockGateway::failing()),
        );

        let result = handler.handle(command()).await;
        assert!(matches!(result, Err(PurchaseError::GatewayUnavailable { .. })));

        // The record was created before the gateway call and stays pending.
        let created = store.created_records();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].status, PaymentStatus::Pending);
        assert!(store.attached_sessions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fails_when_store_create_fails() {
        let store = Arc::new(MockPaymentStore::failing_create());
        let gateway = Arc::new(MockGateway::new());
        let handler = handler_with(
            store,
            MockCatalogStore::with_item(course_item()),
            MockAuthorizer::permissive(),
            false,
            gateway.clone(),
        );

        let result = handler.handle(command()).await;
        assert!(matches!(result, Err(PurchaseError::Infrastructure(_))));
        assert!(gateway.requests().is_empty());
    }
}
