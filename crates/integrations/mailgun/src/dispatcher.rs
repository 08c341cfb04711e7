use courier_core::Message;
use tracing::{debug, info, instrument, warn};

use crate::client::{ClientFactory, MailgunClient, MailgunResponse};
use crate::config::{MailgunConfig, MailgunSettings};
use crate::error::MailgunError;
use crate::http::HttpClientFactory;
use crate::transform::transform;

/// Sends [`Message`]s through Mailgun.
///
/// For each delivery the dispatcher resolves the settings of the message's
/// sending domain, builds a client for them, transforms the message and
/// submits the fields. On a 200 response the provider message id is
/// recorded on the message.
#[derive(Debug, Clone)]
pub struct Dispatcher<F = HttpClientFactory> {
    config: MailgunConfig,
    factory: F,
}

impl Dispatcher {
    /// Create a dispatcher that talks HTTP.
    pub fn new(config: MailgunConfig) -> Self {
        Self::with_factory(config, HttpClientFactory)
    }
}

impl<F: ClientFactory> Dispatcher<F> {
    /// Create a dispatcher that builds its clients with `factory`.
    pub fn with_factory(config: MailgunConfig, factory: F) -> Self {
        Self { config, factory }
    }

    pub fn config(&self) -> &MailgunConfig {
        &self.config
    }

    /// Effective settings for `domain` (or the default domain).
    pub fn resolve_config(&self, domain: Option<&str>) -> Result<MailgunSettings, MailgunError> {
        Ok(self.config.resolve(domain)?)
    }

    /// A client configured for `domain`, in test mode when the settings
    /// ask for fake sends.
    pub fn client(&self, domain: Option<&str>) -> Result<Box<dyn MailgunClient>, MailgunError> {
        let settings = self.resolve_config(domain)?;
        let mut client = self.factory.build(&settings)?;
        if settings.fake_message_send {
            client.enable_test_mode();
        }
        Ok(client)
    }

    /// Deliver `message`.
    ///
    /// The sending domain is the message's own, else the configured
    /// default. Non-200 responses are returned unchanged and leave the
    /// message untouched.
    #[instrument(skip_all, fields(provider = "mailgun", domain = tracing::field::Empty))]
    pub async fn deliver(&self, message: &mut Message) -> Result<MailgunResponse, MailgunError> {
        let domain = message
            .domain()
            .or(self.config.domain.as_deref())
            .filter(|d| !d.trim().is_empty())
            .map(str::to_owned)
            .ok_or(MailgunError::MissingDomain)?;
        tracing::Span::current().record("domain", domain.as_str());

        let client = self.client(Some(&domain))?;

        let transformed = transform(message);
        for event in &transformed.events {
            debug!(%event, "transform");
        }

        let response = client.send(&domain, &transformed.fields).await?;

        if response.is_success() {
            match response.message_id() {
                Some(id) => {
                    info!(message_id = %id, "message accepted");
                    message.set_message_id(id);
                }
                None => warn!("message accepted without a message id"),
            }
        } else {
            warn!(code = response.code, "message not accepted");
        }

        Ok(response)
    }
}
