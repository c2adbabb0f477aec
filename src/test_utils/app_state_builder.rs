//! Test app state builder for HTTP-level testing.
//!
//! `TestAppStateBuilder` creates a minimal `AppState` with in-memory mocks.

use std::net::SocketAddr;
use std::sync::Arc;

use secrecy::SecretString;

use crate::{
    adapters::http::app_state::AppState,
    application::use_cases::subscription_sync::{
        ProcessedEventRepo, SubscriptionRepo, SubscriptionSyncUseCases,
    },
    infra::{config::AppConfig, webhook_auth::WebhookAuth},
    test_utils::{InMemoryProcessedEventRepo, InMemorySubscriptionRepo},
};

pub const TEST_WEBHOOK_SECRET: &str = "rc_test_secret_12345678";

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// Defaults to enforced webhook auth with [`TEST_WEBHOOK_SECRET`].
///
/// # Example
///
/// ```ignore
/// let (app_state, repo, events) = TestAppStateBuilder::new()
///     .with_webhook_auth(WebhookAuth::Disabled)
///     .build_with_mocks();
/// ```
pub struct TestAppStateBuilder {
    webhook_auth: WebhookAuth,
    subscription_repo: Option<Arc<dyn SubscriptionRepo>>,
    processed_event_repo: Option<Arc<dyn ProcessedEventRepo>>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            webhook_auth: WebhookAuth::Enforced {
                secret: SecretString::new(TEST_WEBHOOK_SECRET.into()),
            },
            subscription_repo: None,
            processed_event_repo: None,
        }
    }

    pub fn with_webhook_auth(mut self, webhook_auth: WebhookAuth) -> Self {
        self.webhook_auth = webhook_auth;
        self
    }

    /// Set a custom subscription repo (e.g. one that fails every write).
    pub fn with_subscription_repo(mut self, repo: Arc<dyn SubscriptionRepo>) -> Self {
        self.subscription_repo = Some(repo);
        self
    }

    pub fn with_processed_event_repo(mut self, repo: Arc<dyn ProcessedEventRepo>) -> Self {
        self.processed_event_repo = Some(repo);
        self
    }

    /// Build with fresh in-memory repos and return them for inspection.
    pub fn build_with_mocks(
        self,
    ) -> (
        AppState,
        Arc<InMemorySubscriptionRepo>,
        Arc<InMemoryProcessedEventRepo>,
    ) {
        let subscription_repo = Arc::new(InMemorySubscriptionRepo::new());
        let processed_event_repo = Arc::new(InMemoryProcessedEventRepo::new());

        let app_state = self
            .with_subscription_repo(subscription_repo.clone())
            .with_processed_event_repo(processed_event_repo.clone())
            .build();

        (app_state, subscription_repo, processed_event_repo)
    }

    /// Build the AppState with all configured mocks.
    pub fn build(self) -> AppState {
        let subscription_repo: Arc<dyn SubscriptionRepo> = self
            .subscription_repo
            .unwrap_or_else(|| Arc::new(InMemorySubscriptionRepo::new()));
        let processed_event_repo: Arc<dyn ProcessedEventRepo> = self
            .processed_event_repo
            .unwrap_or_else(|| Arc::new(InMemoryProcessedEventRepo::new()));

        let config = AppConfig {
            database_url: SecretString::new("postgres://test@localhost/test".into()),
            database_max_connections: 1,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            webhook_auth: self.webhook_auth,
        };

        AppState {
            config: Arc::new(config),
            subscription_sync_use_cases: Arc::new(SubscriptionSyncUseCases::new(
                subscription_repo,
                processed_event_repo,
            )),
        }
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
