//! HTTP DTOs for profile endpoints.

use serde::Serialize;

use crate::adapters::http::payments::PaymentResponse;
use crate::domain::users::ProfileView;

/// A profile as rendered for the requesting viewer.
///
/// The `view` tag distinguishes the owner shape (with email) from the public
/// one. `payments` appears only on the owner view.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub profile: ProfileView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payments: Option<Vec<PaymentResponse>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Timestamp, UserId};
    use crate::domain::users::UserProfile;

    fn profile() -> UserProfile {
        UserProfile {
            id: UserId::new("tg-501").unwrap(),
            display_name: "Ada".to_string(),
            email: Some("ada@example.com".to_string()),
            bio: None,
            registered_at: Timestamp::from_unix_secs(1_700_000_000),
            last_seen_at: Timestamp::from_unix_secs(1_700_500_000),
            is_active: true,
        }
    }

    #[test]
    fn owner_view_serializes_email_and_payments_key() {
        let owner = UserId::new("tg-501").unwrap();
        let response = ProfileResponse {
            profile: profile().view_for(&owner),
            payments: Some(vec![]),
        };
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["view"], "owner");
        assert_eq!(json["email"], "ada@example.com");
        assert!(json.get("payments").is_some());
    }

    #[test]
    fn public_view_omits_email_and_payments() {
        let visitor = UserId::new("tg-777").unwrap();
        let response = ProfileResponse {
            profile: profile().view_for(&visitor),
            payments: None,
        };
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["view"], "public");
        assert!(json.get("email").is_none());
        assert!(json.get("payments").is_none());
    }
}
