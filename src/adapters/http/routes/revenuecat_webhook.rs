//! RevenueCat webhook receiver.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    domain::entities::revenuecat_event::{RevenueCatWebhookPayload, WebhookEvent},
    infra::webhook_auth::SECRET_HEADER,
};

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/revenuecat-webhook",
        post(handle_webhook).options(handle_preflight),
    )
}

/// OPTIONS /revenuecat-webhook
async fn handle_preflight() -> StatusCode {
    StatusCode::OK
}

/// POST /revenuecat-webhook
///
/// The body is taken as raw bytes and only decoded after the secret check, so
/// unauthenticated requests never reach the decoder or the database.
async fn handle_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let provided = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
    if let Err(e) = app_state.config.webhook_auth.verify(provided) {
        tracing::warn!(
            header_present = provided.is_some(),
            "Rejected RevenueCat webhook with invalid secret"
        );
        return Err(e);
    }

    let payload: RevenueCatWebhookPayload = serde_json::from_slice(&body)
        .map_err(|e| AppError::InvalidInput(format!("Invalid webhook payload: {}", e)))?;
    let event = WebhookEvent::try_from(payload.event)?;

    let outcome = app_state
        .subscription_sync_use_cases
        .process(&event)
        .await?;

    tracing::debug!(
        event_type = event.event_type(),
        outcome = outcome.as_str(),
        "Processed RevenueCat webhook"
    );

    Ok(Json(serde_json::json!({ "message": "OK" })))
}
