use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::{
    app_error::AppResult,
    domain::entities::{
        revenuecat_event::{GrantEvent, RevokeEvent, SubscriptionEvent, WebhookEvent},
        subscription::{SubscriptionRecord, UserPremiumFlag, format_timestamp},
    },
};

// ============================================================================
// Repository Traits
// ============================================================================

#[async_trait]
pub trait SubscriptionRepo: Send + Sync {
    /// Upserts the user's subscription as active and sets the premium flag.
    /// Both writes commit together or not at all. The flag is `None` when no
    /// user row matched.
    async fn apply_grant(
        &self,
        grant: &GrantEvent,
        updated_at: DateTime<Utc>,
    ) -> AppResult<(SubscriptionRecord, Option<UserPremiumFlag>)>;

    /// Marks the user's subscription cancelled (if one exists) and clears the
    /// premium flag. Both writes commit together or not at all.
    async fn apply_revocation(
        &self,
        revoke: &RevokeEvent,
        updated_at: DateTime<Utc>,
    ) -> AppResult<(Option<SubscriptionRecord>, Option<UserPremiumFlag>)>;
}

#[derive(Debug, Clone)]
pub struct ProcessedEventInput {
    pub event_id: String,
    pub event_type: String,
    pub user_id: Option<String>,
    pub received_at: DateTime<Utc>,
}

#[async_trait]
pub trait ProcessedEventRepo: Send + Sync {
    async fn exists(&self, event_id: &str) -> AppResult<bool>;
    async fn record(&self, input: &ProcessedEventInput) -> AppResult<()>;
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Granted,
    Revoked,
    Ignored,
    Duplicate,
}

impl SyncOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOutcome::Granted => "granted",
            SyncOutcome::Revoked => "revoked",
            SyncOutcome::Ignored => "ignored",
            SyncOutcome::Duplicate => "duplicate",
        }
    }
}

#[derive(Clone)]
pub struct SubscriptionSyncUseCases {
    subscriptions: Arc<dyn SubscriptionRepo>,
    processed_events: Arc<dyn ProcessedEventRepo>,
}

impl SubscriptionSyncUseCases {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepo>,
        processed_events: Arc<dyn ProcessedEventRepo>,
    ) -> Self {
        Self {
            subscriptions,
            processed_events,
        }
    }

    /// Reconciles one RevenueCat event onto the local subscription state.
    ///
    /// Provider data is applied as-is: prior state is not consulted, so a late
    /// delivery overwrites whatever is stored.
    #[instrument(skip(self, event), fields(event_type = %event.event_type(), event_id = ?event.id))]
    pub async fn process(&self, event: &WebhookEvent) -> AppResult<SyncOutcome> {
        if let Some(event_id) = &event.id {
            if self.processed_events.exists(event_id).await? {
                tracing::info!("Event already processed, skipping");
                return Ok(SyncOutcome::Duplicate);
            }
        }

        let now = Utc::now();

        let outcome = match &event.event {
            SubscriptionEvent::Grant(grant) => {
                let (record, flag) = self.subscriptions.apply_grant(grant, now).await?;
                tracing::info!(
                    user_id = %record.user_id,
                    product_id = %record.product_id,
                    status = record.status.as_str(),
                    period_end = ?record.current_period_end.as_ref().map(format_timestamp),
                    is_premium = ?flag.as_ref().map(|f| f.is_premium),
                    "Subscription activated"
                );
                SyncOutcome::Granted
            }
            SubscriptionEvent::Revoke(revoke) => {
                let (record, flag) = self.subscriptions.apply_revocation(revoke, now).await?;
                match record {
                    Some(record) => tracing::info!(
                        user_id = %record.user_id,
                        product_id = %record.product_id,
                        status = record.status.as_str(),
                        is_premium = ?flag.as_ref().map(|f| f.is_premium),
                        "Subscription cancelled"
                    ),
                    None => tracing::debug!(
                        user_id = %revoke.user_id,
                        is_premium = ?flag.as_ref().map(|f| f.is_premium),
                        "No stored subscription to cancel, premium flag cleared"
                    ),
                }
                SyncOutcome::Revoked
            }
            SubscriptionEvent::Test => {
                tracing::info!("Received RevenueCat test event");
                return Ok(SyncOutcome::Ignored);
            }
            SubscriptionEvent::Unrecognized { event_type } => {
                tracing::warn!(event_type = %event_type, "Unhandled RevenueCat event type");
                return Ok(SyncOutcome::Ignored);
            }
        };

        // Recording is non-critical: the writes above are idempotent, so a
        // redelivery converges on the same state.
        if let Some(event_id) = &event.id {
            let input = ProcessedEventInput {
                event_id: event_id.clone(),
                event_type: event.event_type().to_string(),
                user_id: event.user_id().map(str::to_string),
                received_at: now,
            };
            if let Err(e) = self.processed_events.record(&input).await {
                tracing::warn!(error = %e, "Failed to record processed event (non-critical)");
            }
        }

        Ok(outcome)
    }
}
