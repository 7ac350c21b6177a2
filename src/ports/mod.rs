//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Payment Ports
//!
//! - `PaymentGateway` - Hosted checkout session creation and polling
//! - `PaymentStore` - Payment record persistence with conditional transitions
//! - `WebhookEventStore` - Gateway webhook idempotency log
//! - `AccessGranter` - Opening purchased content to buyers
//!
//! ## Platform Ports
//!
//! - `CatalogStore` - Course and lesson reads, course updates
//! - `SubscriptionStore` - Course update notification membership
//! - `Authorizer` - Ownership and role checks
//! - `UserDirectory` - Profiles and the inactivity sweep
//! - `TaskQueue` - Durable deferred work
//! - `EmailSender` - Transactional mail
//! - `TokenVerifier` - Bearer token validation

mod access_granter;
mod authorizer;
mod catalog_store;
mod email_sender;
mod payment_gateway;
mod payment_store;
mod subscription_store;
mod task_queue;
mod token_verifier;
mod user_directory;
mod webhook_event_store;

pub use access_granter::{AccessGranter, GrantError};
pub use authorizer::{Authorizer, Role};
pub use catalog_store::{CatalogItem, CatalogStore, Course, CourseUpdate, Lesson};
pub use email_sender::{EmailMessage, EmailSender};
pub use payment_gateway::{
    CreateCheckoutSessionRequest, GatewayError, GatewayErrorCode, PaymentGateway, SessionHandle,
    SessionPaymentStatus, SessionSnapshot,
};
pub use payment_store::PaymentStore;
pub use subscription_store::SubscriptionStore;
pub use task_queue::{DeferredTask, QueuedTask, TaskQueue};
pub use token_verifier::TokenVerifier;
pub use user_directory::UserDirectory;
pub use webhook_event_store::{
    EventDisposition, SaveResult, WebhookEventRecord, WebhookEventStore,
};
