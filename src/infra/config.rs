use std::net::SocketAddr;

use env_helpers::get_env_default;
use secrecy::SecretString;

use crate::infra::{error::InfraError, webhook_auth::WebhookAuth};

pub struct AppConfig {
    pub database_url: SecretString,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    /// Shared-secret check applied to RevenueCat deliveries.
    pub webhook_auth: WebhookAuth,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, InfraError> {
        let database_url: String =
            std::env::var("DATABASE_URL").map_err(|_| InfraError::ConfigMissing {
                var: "DATABASE_URL",
            })?;
        let database_max_connections: u32 = get_env_default("DATABASE_MAX_CONNECTIONS", 5);
        let bind_addr: SocketAddr = get_env_default(
            "BIND_ADDR",
            SocketAddr::from(([127, 0, 0, 1], 3001)),
        );
        let webhook_auth = WebhookAuth::from_parts(
            std::env::var("REVENUECAT_WEBHOOK_AUTH").ok().as_deref(),
            std::env::var("REVENUECAT_WEBHOOK_SECRET").ok(),
        )?;

        Ok(Self {
            database_url: SecretString::new(database_url.into()),
            database_max_connections,
            bind_addr,
            webhook_auth,
        })
    }
}
