//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use chrono::{DateTime, Utc};

use crate::domain::entities::{
    revenuecat_event::{
        GrantEvent, RevenueCatEventType, RevokeEvent, SubscriptionEvent, WebhookEvent,
    },
    subscription::{SubscriptionRecord, SubscriptionStatus},
};

/// `purchased_at_ms` of the reference purchase (2023-11-14T22:13:20.000Z).
pub const TEST_PURCHASED_AT_MS: i64 = 1_700_000_000_000;
/// `expiration_at_ms` of the reference purchase (2024-01-11T19:06:40.000Z).
pub const TEST_EXPIRATION_AT_MS: i64 = 1_705_000_000_000;

/// Create an INITIAL_PURCHASE grant for user `u1` and product `p1`.
pub fn create_test_grant(overrides: impl FnOnce(&mut GrantEvent)) -> GrantEvent {
    let mut grant = GrantEvent {
        event_type: RevenueCatEventType::InitialPurchase,
        user_id: "u1".to_string(),
        product_id: "p1".to_string(),
        period_start: Some(test_datetime(TEST_PURCHASED_AT_MS)),
        period_end: Some(test_datetime(TEST_EXPIRATION_AT_MS)),
        period_type: Some("NORMAL".to_string()),
        store: Some("APP_STORE".to_string()),
        environment: Some("SANDBOX".to_string()),
        subscriber_attributes: serde_json::json!({}),
    };
    overrides(&mut grant);
    grant
}

/// Create an EXPIRATION revocation for user `u1`.
pub fn create_test_revoke(overrides: impl FnOnce(&mut RevokeEvent)) -> RevokeEvent {
    let mut revoke = RevokeEvent {
        event_type: RevenueCatEventType::Expiration,
        user_id: "u1".to_string(),
    };
    overrides(&mut revoke);
    revoke
}

pub fn create_webhook_event(id: Option<&str>, event: SubscriptionEvent) -> WebhookEvent {
    WebhookEvent {
        id: id.map(str::to_string),
        event,
    }
}

/// Create a stored subscription record for user `u1`.
pub fn create_test_subscription(
    overrides: impl FnOnce(&mut SubscriptionRecord),
) -> SubscriptionRecord {
    let mut record = SubscriptionRecord {
        user_id: "u1".to_string(),
        product_id: "p1".to_string(),
        status: SubscriptionStatus::Active,
        current_period_start: Some(test_datetime(TEST_PURCHASED_AT_MS)),
        current_period_end: Some(test_datetime(TEST_EXPIRATION_AT_MS)),
        store: Some("APP_STORE".to_string()),
        environment: Some("SANDBOX".to_string()),
        period_type: Some("NORMAL".to_string()),
        metadata: serde_json::json!({}),
        created_at: test_datetime(TEST_PURCHASED_AT_MS),
        updated_at: test_datetime(TEST_PURCHASED_AT_MS),
    };
    overrides(&mut record);
    record
}

/// Raw webhook body for the reference INITIAL_PURCHASE.
pub fn initial_purchase_payload() -> serde_json::Value {
    serde_json::json!({
        "event": {
            "type": "INITIAL_PURCHASE",
            "app_user_id": "u1",
            "product_id": "p1",
            "purchased_at_ms": TEST_PURCHASED_AT_MS,
            "expiration_at_ms": TEST_EXPIRATION_AT_MS
        }
    })
}

pub fn test_datetime(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).unwrap()
}
