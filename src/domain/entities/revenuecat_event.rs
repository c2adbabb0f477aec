//! RevenueCat webhook events.
//!
//! The wire payload is decoded into [`RevenueCatWebhookPayload`] first and then
//! validated into a [`WebhookEvent`], so that handlers only ever see events whose
//! required fields are present.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use strum::{AsRefStr, EnumString};
use thiserror::Error;

/// Event types sent by RevenueCat. Types this service does not act on are kept
/// verbatim in `Other` so they can be logged.
#[derive(Debug, Clone, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RevenueCatEventType {
    InitialPurchase,
    NonRenewingPurchase,
    Renewal,
    Cancellation,
    Expiration,
    Test,
    #[strum(disabled)]
    Other(String),
}

impl RevenueCatEventType {
    pub fn parse(raw: &str) -> Self {
        RevenueCatEventType::from_str(raw)
            .unwrap_or_else(|_| RevenueCatEventType::Other(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            RevenueCatEventType::Other(raw) => raw,
            known => known.as_ref(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RevenueCatWebhookPayload {
    pub event: RawRevenueCatEvent,
}

#[derive(Debug, Deserialize)]
pub struct RawRevenueCatEvent {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub app_user_id: Option<String>,
    pub product_id: Option<String>,
    pub purchased_at_ms: Option<i64>,
    pub expiration_at_ms: Option<i64>,
    pub period_type: Option<String>,
    pub store: Option<String>,
    pub environment: Option<String>,
    pub subscriber_attributes: Option<serde_json::Value>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventDecodeError {
    #[error("{event_type} event is missing app_user_id")]
    MissingUserId { event_type: String },

    #[error("{event_type} event is missing product_id")]
    MissingProductId { event_type: String },

    #[error("{field} is not a valid millisecond timestamp")]
    InvalidTimestamp { field: &'static str },
}

/// A purchase or renewal: the user holds an active subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct GrantEvent {
    pub event_type: RevenueCatEventType,
    pub user_id: String,
    pub product_id: String,
    pub period_start: Option<DateTime<Utc>>,
    pub period_end: Option<DateTime<Utc>>,
    pub period_type: Option<String>,
    pub store: Option<String>,
    pub environment: Option<String>,
    pub subscriber_attributes: serde_json::Value,
}

/// A cancellation or expiration: the user loses premium access.
#[derive(Debug, Clone, PartialEq)]
pub struct RevokeEvent {
    pub event_type: RevenueCatEventType,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionEvent {
    Grant(GrantEvent),
    Revoke(RevokeEvent),
    Test,
    Unrecognized { event_type: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
    /// RevenueCat's event id, used to drop redeliveries.
    pub id: Option<String>,
    pub event: SubscriptionEvent,
}

impl WebhookEvent {
    pub fn event_type(&self) -> &str {
        match &self.event {
            SubscriptionEvent::Grant(grant) => grant.event_type.as_str(),
            SubscriptionEvent::Revoke(revoke) => revoke.event_type.as_str(),
            SubscriptionEvent::Test => RevenueCatEventType::Test.as_str(),
            SubscriptionEvent::Unrecognized { event_type } => event_type,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        match &self.event {
            SubscriptionEvent::Grant(grant) => Some(&grant.user_id),
            SubscriptionEvent::Revoke(revoke) => Some(&revoke.user_id),
            SubscriptionEvent::Test | SubscriptionEvent::Unrecognized { .. } => None,
        }
    }
}

impl TryFrom<RawRevenueCatEvent> for WebhookEvent {
    type Error = EventDecodeError;

    fn try_from(raw: RawRevenueCatEvent) -> Result<Self, Self::Error> {
        let event_type = RevenueCatEventType::parse(&raw.event_type);
        let id = non_empty(raw.id);

        let event = match event_type {
            RevenueCatEventType::InitialPurchase
            | RevenueCatEventType::NonRenewingPurchase
            | RevenueCatEventType::Renewal => {
                let user_id = non_empty(raw.app_user_id).ok_or_else(|| {
                    EventDecodeError::MissingUserId {
                        event_type: raw.event_type.clone(),
                    }
                })?;
                let product_id = non_empty(raw.product_id).ok_or_else(|| {
                    EventDecodeError::MissingProductId {
                        event_type: raw.event_type.clone(),
                    }
                })?;

                SubscriptionEvent::Grant(GrantEvent {
                    event_type,
                    user_id,
                    product_id,
                    period_start: millis_to_utc(raw.purchased_at_ms, "purchased_at_ms")?,
                    period_end: millis_to_utc(raw.expiration_at_ms, "expiration_at_ms")?,
                    period_type: raw.period_type,
                    store: raw.store,
                    environment: raw.environment,
                    subscriber_attributes: raw
                        .subscriber_attributes
                        .unwrap_or_else(|| serde_json::json!({})),
                })
            }
            RevenueCatEventType::Cancellation | RevenueCatEventType::Expiration => {
                let user_id = non_empty(raw.app_user_id).ok_or_else(|| {
                    EventDecodeError::MissingUserId {
                        event_type: raw.event_type.clone(),
                    }
                })?;
                SubscriptionEvent::Revoke(RevokeEvent {
                    event_type,
                    user_id,
                })
            }
            RevenueCatEventType::Test => SubscriptionEvent::Test,
            RevenueCatEventType::Other(event_type) => {
                SubscriptionEvent::Unrecognized { event_type }
            }
        };

        Ok(WebhookEvent { id, event })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn millis_to_utc(
    value: Option<i64>,
    field: &'static str,
) -> Result<Option<DateTime<Utc>>, EventDecodeError> {
    match value {
        None => Ok(None),
        Some(ms) => DateTime::<Utc>::from_timestamp_millis(ms)
            .map(Some)
            .ok_or(EventDecodeError::InvalidTimestamp { field }),
    }
}
