use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, Row};

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::subscription_sync::SubscriptionRepo,
    domain::entities::{
        revenuecat_event::{GrantEvent, RevokeEvent},
        subscription::{SubscriptionRecord, SubscriptionStatus, UserPremiumFlag},
    },
};

fn row_to_record(row: &sqlx::postgres::PgRow) -> SubscriptionRecord {
    SubscriptionRecord {
        user_id: row.get("user_id"),
        product_id: row.get("product_id"),
        status: row.get("status"),
        current_period_start: row.get("current_period_start"),
        current_period_end: row.get("current_period_end"),
        store: row.get("store"),
        environment: row.get("environment"),
        period_type: row.get("period_type"),
        metadata: row.get("metadata"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const RETURNING_COLS: &str = r#"
    user_id, product_id, status, current_period_start, current_period_end,
    store, environment, period_type, metadata, created_at, updated_at
"#;

/// Inserts or replaces the user's subscription. Keyed on `user_id` alone, so a
/// second product for the same user overwrites the first.
async fn upsert_subscription(
    conn: &mut PgConnection,
    grant: &GrantEvent,
    updated_at: DateTime<Utc>,
) -> AppResult<SubscriptionRecord> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO subscriptions
            (user_id, product_id, status, current_period_start, current_period_end,
             store, environment, period_type, metadata, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
        ON CONFLICT (user_id) DO UPDATE SET
            product_id = EXCLUDED.product_id,
            status = EXCLUDED.status,
            current_period_start = EXCLUDED.current_period_start,
            current_period_end = EXCLUDED.current_period_end,
            store = EXCLUDED.store,
            environment = EXCLUDED.environment,
            period_type = EXCLUDED.period_type,
            metadata = EXCLUDED.metadata,
            updated_at = EXCLUDED.updated_at
        RETURNING {}
        "#,
        RETURNING_COLS
    ))
    .bind(&grant.user_id)
    .bind(&grant.product_id)
    .bind(SubscriptionStatus::Active)
    .bind(grant.period_start)
    .bind(grant.period_end)
    .bind(&grant.store)
    .bind(&grant.environment)
    .bind(&grant.period_type)
    .bind(&grant.subscriber_attributes)
    .bind(updated_at)
    .fetch_one(&mut *conn)
    .await
    .map_err(AppError::from)?;

    Ok(row_to_record(&row))
}

async fn cancel_subscription(
    conn: &mut PgConnection,
    user_id: &str,
    updated_at: DateTime<Utc>,
) -> AppResult<Option<SubscriptionRecord>> {
    let row = sqlx::query(&format!(
        "UPDATE subscriptions SET status = $2, updated_at = $3 WHERE user_id = $1 RETURNING {}",
        RETURNING_COLS
    ))
    .bind(user_id)
    .bind(SubscriptionStatus::Cancelled)
    .bind(updated_at)
    .fetch_optional(&mut *conn)
    .await
    .map_err(AppError::from)?;

    Ok(row.as_ref().map(row_to_record))
}

async fn set_premium_flag(
    conn: &mut PgConnection,
    user_id: &str,
    is_premium: bool,
    updated_at: DateTime<Utc>,
) -> AppResult<Option<UserPremiumFlag>> {
    let row = sqlx::query(
        r#"
        UPDATE users SET is_premium = $2, premium_updated_at = $3
        WHERE id::text = $1
        RETURNING id::text AS user_id, is_premium, premium_updated_at
        "#,
    )
    .bind(user_id)
    .bind(is_premium)
    .bind(updated_at)
    .fetch_optional(&mut *conn)
    .await
    .map_err(AppError::from)?;

    if row.is_none() {
        tracing::warn!(user_id, is_premium, "No user row found for premium flag update");
    }

    Ok(row.map(|row| UserPremiumFlag {
        user_id: row.get("user_id"),
        is_premium: row.get("is_premium"),
        premium_updated_at: row.get("premium_updated_at"),
    }))
}

#[async_trait]
impl SubscriptionRepo for PostgresPersistence {
    async fn apply_grant(
        &self,
        grant: &GrantEvent,
        updated_at: DateTime<Utc>,
    ) -> AppResult<(SubscriptionRecord, Option<UserPremiumFlag>)> {
        // Dropping `tx` on an early return rolls back the subscription write.
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;
        let record = upsert_subscription(&mut tx, grant, updated_at).await?;
        let flag = set_premium_flag(&mut tx, &grant.user_id, true, updated_at).await?;
        tx.commit().await.map_err(AppError::from)?;
        Ok((record, flag))
    }

    async fn apply_revocation(
        &self,
        revoke: &RevokeEvent,
        updated_at: DateTime<Utc>,
    ) -> AppResult<(Option<SubscriptionRecord>, Option<UserPremiumFlag>)> {
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;
        let record = cancel_subscription(&mut tx, &revoke.user_id, updated_at).await?;
        let flag = set_premium_flag(&mut tx, &revoke.user_id, false, updated_at).await?;
        tx.commit().await.map_err(AppError::from)?;
        Ok((record, flag))
    }
}
