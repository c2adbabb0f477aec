use chrono::{DateTime, SecondsFormat, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "subscription_status", rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }
}

/// Local cache of the provider's view of a user's subscription.
///
/// Keyed by the RevenueCat `app_user_id`; one row per user.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionRecord {
    pub user_id: String,
    pub product_id: String,
    pub status: SubscriptionStatus,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub store: Option<String>,
    pub environment: Option<String>,
    pub period_type: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Premium columns of the `users` row, as left by the last applied event.
#[derive(Debug, Clone, PartialEq)]
pub struct UserPremiumFlag {
    pub user_id: String,
    pub is_premium: bool,
    pub premium_updated_at: DateTime<Utc>,
}

/// Formats a timestamp as RFC 3339 with millisecond precision and a `Z` suffix,
/// e.g. `2023-11-14T22:13:20.000Z`.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}
