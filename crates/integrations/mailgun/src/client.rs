use async_trait::async_trait;
use serde_json::Value;

use crate::config::MailgunSettings;
use crate::error::MailgunError;
use crate::fields::FieldMap;

/// Body returned by clients in test mode instead of calling the API.
pub const TEST_MODE_RESPONSE: &str =
    r#"{"id":"<test-mode-mail@localhost>","message":"Queued. Thank you."}"#;

/// Raw response from the Mailgun messages API.
///
/// Returned for every status code; callers decide what a non-200 means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailgunResponse {
    /// HTTP status code.
    pub code: u16,
    /// Response body, usually JSON.
    pub body: String,
}

impl MailgunResponse {
    pub fn new(code: u16, body: impl Into<String>) -> Self {
        Self {
            code,
            body: body.into(),
        }
    }

    /// The canned response produced in test mode.
    pub fn test_mode() -> Self {
        Self::new(200, TEST_MODE_RESPONSE)
    }

    /// Whether Mailgun accepted the message (HTTP 200).
    pub fn is_success(&self) -> bool {
        self.code == 200
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> Result<Value, MailgunError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Provider-assigned message id with the surrounding `<` `>` removed.
    pub fn message_id(&self) -> Option<String> {
        let body = self.json().ok()?;
        let id = body.get("id")?.as_str()?;
        let id = id.trim().trim_start_matches('<').trim_end_matches('>');
        (!id.is_empty()).then(|| id.to_owned())
    }
}

/// A handle able to submit a [`FieldMap`] to Mailgun.
///
/// The HTTP implementation is [`HttpMailgunClient`](crate::HttpMailgunClient);
/// tests substitute their own.
#[async_trait]
pub trait MailgunClient: Send + Sync + std::fmt::Debug {
    /// Submit `fields` as a new message on `domain`.
    async fn send(&self, domain: &str, fields: &FieldMap) -> Result<MailgunResponse, MailgunError>;

    /// Stop talking to the network; every send returns
    /// [`MailgunResponse::test_mode`].
    fn enable_test_mode(&mut self);

    /// Whether test mode is on.
    fn is_test_mode(&self) -> bool;
}

/// Builds a client from resolved settings, once per delivery.
pub trait ClientFactory: Send + Sync {
    fn build(&self, settings: &MailgunSettings) -> Result<Box<dyn MailgunClient>, MailgunError>;
}
