//! GetProfileHandler - Query handler for user profile views.
//!
//! The same endpoint serves two shapes: owners get their contact email and
//! payment history, everyone else gets the public subset. The viewer's
//! last-seen time is bumped as a side effect, which is what keeps the
//! inactivity sweep working from real data.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::payment::{PaymentRecord, PurchaseError};
use crate::domain::users::ProfileView;
use crate::ports::{PaymentStore, UserDirectory};

/// Query for a user's profile, as seen by a specific viewer.
#[derive(Debug, Clone)]
pub struct GetProfileQuery {
    pub profile_id: UserId,
    pub viewer_id: UserId,
}

/// The rendered view plus the owner-only payment history.
///
/// `payments` is empty for public views.
#[derive(Debug, Clone)]
pub struct GetProfileResult {
    pub view: ProfileView,
    pub payments: Vec<PaymentRecord>,
}

/// Handler for profile reads.
pub struct GetProfileHandler {
    user_directory: Arc<dyn UserDirectory>,
    payment_store: Arc<dyn PaymentStore>,
}

impl GetProfileHandler {
    pub fn new(user_directory: Arc<dyn UserDirectory>, payment_store: Arc<dyn PaymentStore>) -> Self {
        Self {
            user_directory,
            payment_store,
        }
    }

    pub async fn handle(&self, query: GetProfileQuery) -> Result<GetProfileResult, PurchaseError> {
        // 1. Load the requested profile
        let profile = self
            .user_directory
            .find_profile(&query.profile_id)
            .await
            .map_err(|e| PurchaseError::infrastructure(e.to_string()))?
            .ok_or_else(|| PurchaseError::user_not_found(query.profile_id.clone()))?;

        // 2. Bump the viewer's activity; a failed bump never blocks the read
        if let Err(e) = self.user_directory.touch_last_seen(&query.viewer_id).await {
            tracing::warn!(
                viewer_id = %query.viewer_id,
                error = %e,
                "Failed to record viewer activity"
            );
        }

        // 3. Render for this viewer and attach history only on the owner view
        let view = profile.view_for(&query.viewer_id);
        let payments = if view.is_owner_view() {
            self.payment_store
                .list_for_buyer(&query.profile_id)
                .await
                .map_err(|e| PurchaseError::infrastructure(e.to_string()))?
        } else {
            Vec::new()
        };

        Ok(GetProfileResult { view, payments })
    }
}
