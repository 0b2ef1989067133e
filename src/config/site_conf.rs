use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

use crate::config::ConfigError;

/// Fallback public domain when SITE_BASE_URL is not configured.
const DEFAULT_BASE_URL: &str = "https://www.klarstad.se";
const DEFAULT_ADMIN_EMAIL: &str = "info@klarstad.se";

/// Public-site settings: where confirmation links point and which inbox
/// receives the admin notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Base URL embedded into confirmation links
    pub base_url: String,
    /// Admin notification inbox
    pub admin_email: String,
}

impl SiteConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env::var("SITE_BASE_URL").unwrap_or_else(|_| {
            warn!("SITE_BASE_URL not set, using default: {}", DEFAULT_BASE_URL);
            DEFAULT_BASE_URL.to_string()
        });

        let admin_email = env::var("ADMIN_EMAIL").unwrap_or_else(|_| {
            warn!("ADMIN_EMAIL not set, using default: {}", DEFAULT_ADMIN_EMAIL);
            DEFAULT_ADMIN_EMAIL.to_string()
        });

        let config = SiteConfig {
            base_url,
            admin_email,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_test_env() -> Self {
        SiteConfig {
            base_url: "http://localhost:3000".to_string(),
            admin_email: "admin@klarstad.test".to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "Site base URL cannot be empty".to_string(),
            ));
        }
        if !self.admin_email.contains('@') {
            return Err(ConfigError::ValidationError(
                "Invalid admin email".to_string(),
            ));
        }
        Ok(())
    }

    /// Customer confirmation link for a quote/booking token.
    pub fn confirm_url(&self, token: &str) -> String {
        format!("{}/confirm/{}", self.base_url.trim_end_matches('/'), token)
    }

    /// Contractor confirmation link for a job token.
    pub fn contractor_confirm_url(&self, token: &str) -> String {
        format!(
            "{}/contractor/confirm/{}",
            self.base_url.trim_end_matches('/'),
            token
        )
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
        }
    }
}
