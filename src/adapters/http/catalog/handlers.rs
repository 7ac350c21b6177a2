//! HTTP handlers for catalog endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::catalog::{
    GetCourseHandler, GetCourseQuery, ToggleSubscriptionCommand, ToggleSubscriptionHandler,
    UpdateCourseCommand, UpdateCourseHandler,
};
use crate::domain::foundation::{CourseId, Money};
use crate::domain::payment::PurchaseError;
use crate::ports::{Authorizer, CatalogStore, CourseUpdate, SubscriptionStore, TaskQueue};

use super::dto::{CourseResponse, SubscriptionResponse, UpdateCourseRequest};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the catalog endpoints.
#[derive(Clone)]
pub struct CatalogAppState {
    pub catalog_store: Arc<dyn CatalogStore>,
    pub authorizer: Arc<dyn Authorizer>,
    pub subscription_store: Arc<dyn SubscriptionStore>,
    pub task_queue: Arc<dyn TaskQueue>,
}

impl CatalogAppState {
    pub fn get_course_handler(&self) -> GetCourseHandler {
        GetCourseHandler::new(self.catalog_store.clone())
    }

    pub fn update_course_handler(&self) -> UpdateCourseHandler {
        UpdateCourseHandler::new(
            self.catalog_store.clone(),
            self.authorizer.clone(),
            self.task_queue.clone(),
        )
    }

    pub fn toggle_subscription_handler(&self) -> ToggleSubscriptionHandler {
        ToggleSubscriptionHandler::new(self.catalog_store.clone(), self.subscription_store.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/courses/:id - Public course page
pub async fn get_course(
    State(state): State<CatalogAppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.get_course_handler();
    let query = GetCourseQuery {
        course_id: CourseId::new(id),
    };

    let result = handler.handle(query).await?;

    Ok(Json(CourseResponse::from(&result.course)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (PATCH/POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// PATCH /api/courses/:id - Edit a course (owner or moderator)
pub async fn update_course(
    State(state): State<CatalogAppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
    Json(request): Json<UpdateCourseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let price = match request.price {
        Some(p) => Some(
            Money::from_minor_units(p.minor_units, p.currency)
                .map_err(|e| PurchaseError::validation("price", e.to_string()))?,
        ),
        None => None,
    };

    let handler = state.update_course_handler();
    let cmd = UpdateCourseCommand {
        editor_id: user.id,
        course_id: CourseId::new(id),
        update: CourseUpdate {
            title: request.title,
            description: request.description,
            price,
        },
    };

    let result = handler.handle(cmd).await?;

    Ok(Json(CourseResponse::from(&result.course)))
}

/// POST /api/courses/:id/subscribe - Toggle update-email subscription
pub async fn toggle_subscription(
    State(state): State<CatalogAppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.toggle_subscription_handler();
    let cmd = ToggleSubscriptionCommand {
        user_id: user.id,
        course_id: CourseId::new(id),
    };

    let result = handler.handle(cmd).await?;

    Ok(Json(SubscriptionResponse {
        subscribed: result.subscribed,
    }))
}
