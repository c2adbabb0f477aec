use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use strum::EnumString;

use crate::{
    app_error::{AppError, AppResult},
    infra::error::InfraError,
};

/// Header RevenueCat is configured to send with every delivery.
pub const SECRET_HEADER: &str = "x-revenuecat-secret";

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum WebhookAuthMode {
    Enforced,
    Disabled,
}

/// Shared-secret check for inbound webhooks.
///
/// There is no default mode; `REVENUECAT_WEBHOOK_AUTH` must always be set.
#[derive(Debug, Clone)]
pub enum WebhookAuth {
    Enforced { secret: SecretString },
    Disabled,
}

impl WebhookAuth {
    /// Builds the auth setting from the raw `REVENUECAT_WEBHOOK_AUTH` and
    /// `REVENUECAT_WEBHOOK_SECRET` values.
    pub fn from_parts(mode: Option<&str>, secret: Option<String>) -> Result<Self, InfraError> {
        let mode = mode.ok_or(InfraError::ConfigMissing {
            var: "REVENUECAT_WEBHOOK_AUTH",
        })?;
        let mode = WebhookAuthMode::from_str(mode.trim()).map_err(|_| {
            InfraError::ConfigInvalid {
                var: "REVENUECAT_WEBHOOK_AUTH",
                reason: format!("must be 'enforced' or 'disabled', got '{}'", mode),
            }
        })?;

        match mode {
            WebhookAuthMode::Enforced => {
                let secret = secret.filter(|s| !s.is_empty()).ok_or(
                    InfraError::ConfigMissing {
                        var: "REVENUECAT_WEBHOOK_SECRET",
                    },
                )?;
                Ok(WebhookAuth::Enforced {
                    secret: SecretString::new(secret.into()),
                })
            }
            WebhookAuthMode::Disabled => Ok(WebhookAuth::Disabled),
        }
    }

    pub fn mode(&self) -> WebhookAuthMode {
        match self {
            WebhookAuth::Enforced { .. } => WebhookAuthMode::Enforced,
            WebhookAuth::Disabled => WebhookAuthMode::Disabled,
        }
    }

    /// Checks the value of the secret header. A missing header fails the same
    /// way as a wrong one when the check is enforced.
    pub fn verify(&self, provided: Option<&str>) -> AppResult<()> {
        match self {
            WebhookAuth::Disabled => Ok(()),
            WebhookAuth::Enforced { secret } => match provided {
                Some(value) if constant_time_compare(value, secret.expose_secret()) => Ok(()),
                _ => Err(AppError::InvalidCredentials),
            },
        }
    }
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
