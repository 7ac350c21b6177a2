//! HTTP DTOs for catalog endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Currency;
use crate::ports::Course;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// A price in a partial update.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceRequest {
    /// Amount in minor units (kopecks, cents).
    pub minor_units: i64,
    /// Lowercase currency code.
    pub currency: Currency,
}

/// Partial course edit. Omitted fields are left untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCourseRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<PriceRequest>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// A course as listed in the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct CourseResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub price_minor_units: i64,
    pub currency: String,
    pub owner_id: Option<String>,
    /// When the course was listed (ISO 8601).
    pub created_at: String,
    /// Last edit (ISO 8601).
    pub updated_at: String,
}

impl From<&Course> for CourseResponse {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id.value(),
            title: course.title.clone(),
            description: course.description.clone(),
            price_minor_units: course.price.minor_units(),
            currency: course.price.currency().as_str().to_string(),
            owner_id: course.owner_id.as_ref().map(|id| id.as_str().to_string()),
            created_at: course.created_at.to_rfc3339(),
            updated_at: course.updated_at.to_rfc3339(),
        }
    }
}

/// Subscription state after a toggle.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResponse {
    pub subscribed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CourseId, Money, Timestamp, UserId};

    #[test]
    fn course_response_carries_price_and_owner() {
        let course = Course {
            id: CourseId::new(42),
            title: "Rust for analysts".to_string(),
            description: Some("Twelve weeks of borrow checking".to_string()),
            price: Money::from_minor_units(50_000, Currency::Rub).unwrap(),
            owner_id: Some(UserId::new("tg-900").unwrap()),
            created_at: Timestamp::from_unix_secs(1_700_000_000),
            updated_at: Timestamp::from_unix_secs(1_700_000_000),
        };

        let json = serde_json::to_value(CourseResponse::from(&course)).unwrap();

        assert_eq!(json["id"], 42);
        assert_eq!(json["price_minor_units"], 50_000);
        assert_eq!(json["currency"], "rub");
        assert_eq!(json["owner_id"], "tg-900");
    }

    #[test]
    fn update_request_fields_all_default_to_absent() {
        let request: UpdateCourseRequest = serde_json::from_str("{}").unwrap();

        assert!(request.title.is_none());
        assert!(request.description.is_none());
        assert!(request.price.is_none());
    }

    #[test]
    fn update_request_parses_price() {
        let request: UpdateCourseRequest =
            serde_json::from_str(r#"{"price": {"minor_units": 9900, "currency": "usd"}}"#)
                .unwrap();

        let price = request.price.unwrap();
        assert_eq!(price.minor_units, 9_900);
        assert_eq!(price.currency, Currency::Usd);
    }
}
