pub mod health;
pub mod revenuecat_webhook;

use axum::Router;

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(revenuecat_webhook::router())
}
