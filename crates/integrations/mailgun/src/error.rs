use thiserror::Error;

use crate::config::MailgunConfig;

/// No usable credentials could be resolved for a sending domain.
///
/// Carries a snapshot of the configuration that was searched so the caller
/// can report what was missing. The snapshot's `Debug` output redacts keys.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ConfigurationError {
    message: String,
    config: Box<MailgunConfig>,
}

impl ConfigurationError {
    pub fn new(message: impl Into<String>, config: MailgunConfig) -> Self {
        Self {
            message: message.into(),
            config: Box::new(config),
        }
    }

    /// The configuration that failed to resolve.
    pub fn config(&self) -> &MailgunConfig {
        &self.config
    }
}

/// Errors surfaced by the Mailgun integration.
///
/// Non-2xx API responses are not errors: they are returned to the caller as
/// a [`MailgunResponse`](crate::MailgunResponse) to inspect.
#[derive(Debug, Error)]
pub enum MailgunError {
    /// No API key could be resolved.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Neither the message nor the configuration names a sending domain.
    #[error("no sending domain: set one on the message or in the configuration")]
    MissingDomain,

    /// An HTTP-level transport error occurred.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A variables map could not be serialized to JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An attachment could not be encoded as a form part.
    #[error("invalid attachment {filename}: {reason}")]
    InvalidAttachment { filename: String, reason: String },
}

impl MailgunError {
    /// Returns `true` for errors caused by missing or unusable configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::MissingDomain)
    }
}
