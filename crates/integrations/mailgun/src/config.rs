use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Default Mailgun API host (US region).
pub const DEFAULT_API_HOST: &str = "api.mailgun.net";

/// Default Mailgun API version.
pub const DEFAULT_API_VERSION: &str = "v3";

fn redact(secret: Option<&String>) -> Option<&'static str> {
    secret.map(|_| "[REDACTED]")
}

/// Connection settings that a single sending domain may override.
///
/// Every field is optional; unset fields fall back to the global
/// configuration, then to the built-in defaults.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainOverride {
    /// API key for this domain.
    pub api_key: Option<String>,
    /// API host, e.g. `"api.eu.mailgun.net"`.
    pub api_host: Option<String>,
    /// API version path segment.
    pub api_version: Option<String>,
    /// Whether to talk HTTPS.
    pub api_ssl: Option<bool>,
    /// Whether the client starts in test mode.
    pub api_test_mode: Option<bool>,
    /// Request timeout in seconds.
    pub api_timeout: Option<u64>,
    /// Skip the network entirely and fake a successful send.
    pub fake_message_send: Option<bool>,
}

impl std::fmt::Debug for DomainOverride {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainOverride")
            .field("api_key", &redact(self.api_key.as_ref()))
            .field("api_host", &self.api_host)
            .field("api_version", &self.api_version)
            .field("api_ssl", &self.api_ssl)
            .field("api_test_mode", &self.api_test_mode)
            .field("api_timeout", &self.api_timeout)
            .field("fake_message_send", &self.fake_message_send)
            .finish()
    }
}

impl DomainOverride {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    #[must_use]
    pub fn with_api_host(mut self, api_host: impl Into<String>) -> Self {
        self.api_host = Some(api_host.into());
        self
    }

    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    /// Fill every unset field from `fallback`.
    #[must_use]
    fn or(self, fallback: Self) -> Self {
        Self {
            api_key: self.api_key.or(fallback.api_key),
            api_host: self.api_host.or(fallback.api_host),
            api_version: self.api_version.or(fallback.api_version),
            api_ssl: self.api_ssl.or(fallback.api_ssl),
            api_test_mode: self.api_test_mode.or(fallback.api_test_mode),
            api_timeout: self.api_timeout.or(fallback.api_timeout),
            fake_message_send: self.fake_message_send.or(fallback.fake_message_send),
        }
    }
}

/// Mailgun configuration as written by the operator.
///
/// Global connection settings plus optional per-domain overrides. Resolve it
/// into [`MailgunSettings`] with [`MailgunConfig::resolve`].
///
/// # Examples
///
/// ```
/// use courier_mailgun::{DomainOverride, MailgunConfig};
///
/// let config = MailgunConfig::new("key-global")
///     .with_domain("example.org")
///     .with_domain_override("eu.example.org", DomainOverride::new()
///         .with_api_key("key-eu")
///         .with_api_host("api.eu.mailgun.net"));
///
/// let settings = config.resolve(Some("eu.example.org")).unwrap();
/// assert_eq!(settings.api_key, "key-eu");
/// assert_eq!(settings.base_url(), "https://api.eu.mailgun.net/v3");
/// ```
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailgunConfig {
    /// Global API key.
    pub api_key: Option<String>,
    /// API host. Defaults to `api.mailgun.net`.
    pub api_host: Option<String>,
    /// API version. Defaults to `v3`.
    pub api_version: Option<String>,
    /// Use HTTPS. Defaults to `true`.
    pub api_ssl: Option<bool>,
    /// Start clients in test mode. Defaults to `false`.
    pub api_test_mode: Option<bool>,
    /// Request timeout in seconds. Defaults to none.
    pub api_timeout: Option<u64>,
    /// Fake every send without touching the network. Defaults to `false`.
    pub fake_message_send: Option<bool>,
    /// Default sending domain, used when a message carries no override.
    pub domain: Option<String>,
    /// Per-domain overrides, keyed by sending domain.
    pub domains: BTreeMap<String, DomainOverride>,
}

impl std::fmt::Debug for MailgunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailgunConfig")
            .field("api_key", &redact(self.api_key.as_ref()))
            .field("api_host", &self.api_host)
            .field("api_version", &self.api_version)
            .field("api_ssl", &self.api_ssl)
            .field("api_test_mode", &self.api_test_mode)
            .field("api_timeout", &self.api_timeout)
            .field("fake_message_send", &self.fake_message_send)
            .field("domain", &self.domain)
            .field("domains", &self.domains)
            .finish()
    }
}

impl MailgunConfig {
    /// Create a configuration with a global API key and default settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Set the default sending domain.
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn with_api_host(mut self, api_host: impl Into<String>) -> Self {
        self.api_host = Some(api_host.into());
        self
    }

    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    #[must_use]
    pub fn with_ssl(mut self, ssl: bool) -> Self {
        self.api_ssl = Some(ssl);
        self
    }

    #[must_use]
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.api_test_mode = Some(test_mode);
        self
    }

    #[must_use]
    pub fn with_timeout_secs(mut self, seconds: u64) -> Self {
        self.api_timeout = Some(seconds);
        self
    }

    #[must_use]
    pub fn with_fake_message_send(mut self, fake: bool) -> Self {
        self.fake_message_send = Some(fake);
        self
    }

    /// Register connection overrides for one sending domain.
    #[must_use]
    pub fn with_domain_override(
        mut self,
        domain: impl Into<String>,
        overrides: DomainOverride,
    ) -> Self {
        self.domains.insert(domain.into(), overrides);
        self
    }

    /// The override block for `domain`, matched case-insensitively.
    pub fn domain_override(&self, domain: &str) -> Option<&DomainOverride> {
        self.domains
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(domain))
            .map(|(_, overrides)| overrides)
    }

    /// Global settings without the per-domain blocks.
    fn global_layer(&self) -> DomainOverride {
        DomainOverride {
            api_key: self.api_key.clone(),
            api_host: self.api_host.clone(),
            api_version: self.api_version.clone(),
            api_ssl: self.api_ssl,
            api_test_mode: self.api_test_mode,
            api_timeout: self.api_timeout,
            fake_message_send: self.fake_message_send,
        }
    }

    /// Resolve the effective settings for `domain`.
    ///
    /// Precedence: the domain's override block, then the global settings,
    /// then the built-in defaults. Fails when no non-blank API key is found.
    pub fn resolve(&self, domain: Option<&str>) -> Result<MailgunSettings, ConfigurationError> {
        let global = self.global_layer();
        let layer = match domain.and_then(|d| self.domain_override(d)) {
            Some(overrides) => overrides.clone().or(global),
            None => global,
        };

        let api_key = layer
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ConfigurationError::new(
                    format!(
                        "no Mailgun API key configured for domain {}",
                        domain.unwrap_or("<default>")
                    ),
                    self.clone(),
                )
            })?;

        Ok(MailgunSettings {
            api_key,
            api_host: layer
                .api_host
                .unwrap_or_else(|| DEFAULT_API_HOST.to_owned()),
            api_version: layer
                .api_version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_owned()),
            api_ssl: layer.api_ssl.unwrap_or(true),
            api_test_mode: layer.api_test_mode.unwrap_or(false),
            api_timeout: layer.api_timeout.map(Duration::from_secs),
            fake_message_send: layer.fake_message_send.unwrap_or(false),
        })
    }
}

/// Fully resolved connection settings for one client.
#[derive(Clone, PartialEq, Eq)]
pub struct MailgunSettings {
    pub api_key: String,
    pub api_host: String,
    pub api_version: String,
    pub api_ssl: bool,
    pub api_test_mode: bool,
    pub api_timeout: Option<Duration>,
    pub fake_message_send: bool,
}

impl std::fmt::Debug for MailgunSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailgunSettings")
            .field("api_key", &"[REDACTED]")
            .field("api_host", &self.api_host)
            .field("api_version", &self.api_version)
            .field("api_ssl", &self.api_ssl)
            .field("api_test_mode", &self.api_test_mode)
            .field("api_timeout", &self.api_timeout)
            .field("fake_message_send", &self.fake_message_send)
            .finish()
    }
}

impl MailgunSettings {
    /// Base API URL, e.g. `https://api.mailgun.net/v3`.
    pub fn base_url(&self) -> String {
        let scheme = if self.api_ssl { "https" } else { "http" };
        format!("{scheme}://{}/{}", self.api_host, self.api_version)
    }
}
