//! HTTP handlers for profile endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::payments::PaymentResponse;
use crate::application::handlers::profile::{GetProfileHandler, GetProfileQuery};
use crate::domain::foundation::UserId;
use crate::domain::payment::PurchaseError;
use crate::ports::{PaymentStore, UserDirectory};

use super::dto::ProfileResponse;

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the profile endpoints.
#[derive(Clone)]
pub struct ProfileAppState {
    pub user_directory: Arc<dyn UserDirectory>,
    pub payment_store: Arc<dyn PaymentStore>,
}

impl ProfileAppState {
    pub fn get_profile_handler(&self) -> GetProfileHandler {
        GetProfileHandler::new(self.user_directory.clone(), self.payment_store.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/users/:id - View a profile, shaped for the requesting viewer
pub async fn get_profile(
    State(state): State<ProfileAppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let profile_id =
        UserId::new(id).map_err(|e| PurchaseError::validation("id", e.to_string()))?;

    let handler = state.get_profile_handler();
    let query = GetProfileQuery {
        profile_id,
        viewer_id: user.id,
    };

    let result = handler.handle(query).await?;

    let payments = result
        .view
        .is_owner_view()
        .then(|| result.payments.iter().map(PaymentResponse::from).collect());

    let response = ProfileResponse {
        profile: result.view,
        payments,
    };

    Ok(Json(response))
}
