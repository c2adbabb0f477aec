use async_trait::async_trait;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::subscription_sync::{ProcessedEventInput, ProcessedEventRepo},
};

#[async_trait]
impl ProcessedEventRepo for PostgresPersistence {
    async fn exists(&self, event_id: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM revenuecat_webhook_events WHERE event_id = $1)",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(exists)
    }

    async fn record(&self, input: &ProcessedEventInput) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO revenuecat_webhook_events (event_id, event_type, app_user_id, received_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(&input.event_id)
        .bind(&input.event_type)
        .bind(&input.user_id)
        .bind(input.received_at)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(())
    }
}
