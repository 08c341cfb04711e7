use std::path::Path;

use courier_mailgun::MailgunConfig;
use serde::Deserialize;

/// Environment variable consulted when the file has no global API key.
pub const API_KEY_ENV: &str = "MAILGUN_API_KEY";

/// Contents of `courier.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CourierConfig {
    pub mailgun: MailgunConfig,
}

impl CourierConfig {
    /// Load the configuration at `path`, or the defaults when the file does
    /// not exist. `api_key` fills a missing or blank global key.
    pub fn load(path: &Path, api_key: Option<String>) -> anyhow::Result<Self> {
        let mut config: Self = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            toml::from_str("")?
        };

        let has_key = config
            .mailgun
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty());
        if !has_key {
            config.mailgun.api_key = api_key;
        }

        Ok(config)
    }
}
