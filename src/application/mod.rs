//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers (read).

pub mod handlers;

pub use handlers::{
    // Payment handlers
    payments::{
        CheckPaymentStatusHandler, CheckPaymentStatusQuery, CheckPaymentStatusResult,
        HandleGatewayWebhookCommand, HandleGatewayWebhookHandler, HandleGatewayWebhookResult,
        InitiatePurchaseCommand, InitiatePurchaseHandler, InitiatePurchaseResult, WebhookOutcome,
    },
    // Profile handlers
    profile::{GetProfileHandler, GetProfileQuery, GetProfileResult},
    // Catalog handlers
    catalog::{
        GetCourseHandler, GetCourseQuery, GetCourseResult, ToggleSubscriptionCommand,
        ToggleSubscriptionHandler, ToggleSubscriptionResult, UpdateCourseCommand,
        UpdateCourseHandler, UpdateCourseResult,
    },
};
