use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::attachment::Attachment;
use crate::body::{Body, Part, TEXT_AMP_HTML};
use crate::header::{HeaderMap, HeaderValue, fold_name};
use crate::recipients::Recipients;

/// Free-form JSON object used for variables and recipient variables.
pub type VariableMap = Map<String, Value>;

/// An outgoing email message.
///
/// Holds the envelope fields, a case-insensitive header collection, the
/// body, attachments and the provider-specific extension fields (options,
/// headers, variables and recipient variables). Built with the consuming
/// `with_*` methods:
///
/// ```
/// use courier_core::Message;
///
/// let message = Message::new()
///     .with_from("unittest@example.org")
///     .with_to("test@example.org")
///     .with_subject("Test!")
///     .with_text("Test!")
///     .with_html("<p>Test!</p>");
///
/// assert_eq!(message.to().len(), 1);
/// assert!(message.body().is_multipart());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    from: Option<String>,
    reply_to: Option<String>,
    subject: Option<String>,
    to: Recipients,
    cc: Recipients,
    bcc: Recipients,
    headers: HeaderMap,
    template: Option<String>,
    template_version: Option<String>,
    template_variables: Option<VariableMap>,
    body: Body,
    attachments: Vec<Attachment>,
    domain: Option<String>,
    provider_options: BTreeMap<String, String>,
    provider_headers: HeaderMap,
    variables: Option<VariableMap>,
    recipient_variables: Option<VariableMap>,
    message_id: Option<String>,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- builder ----

    #[must_use]
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Set the structural reply-to address.
    ///
    /// This is the only way to set reply-to: a `Reply-To` entry in the
    /// generic or provider header collections never overrides it.
    #[must_use]
    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    #[must_use]
    pub fn with_to(mut self, address: impl Into<String>) -> Self {
        self.to.push(address);
        self
    }

    #[must_use]
    pub fn with_cc(mut self, address: impl Into<String>) -> Self {
        self.cc.push(address);
        self
    }

    #[must_use]
    pub fn with_bcc(mut self, address: impl Into<String>) -> Self {
        self.bcc.push(address);
        self
    }

    /// Add a generic header. See [`Message::insert_header`].
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_header(name, value);
        self
    }

    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    #[must_use]
    pub fn with_template_version(mut self, version: impl Into<String>) -> Self {
        self.template_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_template_variables(mut self, variables: VariableMap) -> Self {
        self.template_variables = Some(variables);
        self
    }

    /// Add a UTF-8 plain-text body part.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.body.push(Part::text(text));
        self
    }

    /// Add a UTF-8 HTML body part.
    #[must_use]
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.body.push(Part::html(html));
        self
    }

    /// Add an AMP for Email body part.
    #[must_use]
    pub fn with_amp_html(mut self, amp: impl Into<String>) -> Self {
        self.body
            .push(Part::new(TEXT_AMP_HTML, amp.into()).with_charset("utf-8"));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Send through `domain` instead of the configured default.
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set a provider option (sent as `o:<name>`).
    #[must_use]
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.provider_options.insert(name.into(), value.into());
        self
    }

    /// Add a provider-specific header. These win over generic headers with
    /// the same (case-insensitive) name.
    #[must_use]
    pub fn with_provider_header(mut self, name: &str, value: impl Into<HeaderValue>) -> Self {
        self.provider_headers.append_value(name, &value.into());
        self
    }

    #[must_use]
    pub fn with_variables(mut self, variables: VariableMap) -> Self {
        self.variables = Some(variables);
        self
    }

    #[must_use]
    pub fn with_recipient_variables(mut self, variables: VariableMap) -> Self {
        self.recipient_variables = Some(variables);
        self
    }

    // ---- mutation ----

    /// Add a header to the generic collection.
    ///
    /// Mirrors mail-composition semantics: `To`, `Cc` and `Bcc` also append
    /// their addresses not yet listed to the structural recipient lists,
    /// `From` and `Subject` also replace the structural field. `Reply-To`
    /// fills the structural reply-to only while it is unset.
    pub fn insert_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match fold_name(&name).as_str() {
            "to" => self.to.push_header_value(&value),
            "cc" => self.cc.push_header_value(&value),
            "bcc" => self.bcc.push_header_value(&value),
            "from" => self.from = Some(value.clone()),
            "subject" => self.subject = Some(value.clone()),
            "reply-to" if self.reply_to.is_none() && !value.trim().is_empty() => {
                self.reply_to = Some(value.clone());
            }
            _ => {}
        }
        self.headers.append(name, value);
    }

    /// Record the identifier the provider assigned to this message.
    pub fn set_message_id(&mut self, id: impl Into<String>) {
        self.message_id = Some(id.into());
    }

    pub fn add_attachment(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    // ---- accessors ----

    pub fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    pub fn reply_to(&self) -> Option<&str> {
        self.reply_to.as_deref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn to(&self) -> &Recipients {
        &self.to
    }

    pub fn cc(&self) -> &Recipients {
        &self.cc
    }

    pub fn bcc(&self) -> &Recipients {
        &self.bcc
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    pub fn template_version(&self) -> Option<&str> {
        self.template_version.as_deref()
    }

    pub fn template_variables(&self) -> Option<&VariableMap> {
        self.template_variables.as_ref()
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn provider_options(&self) -> &BTreeMap<String, String> {
        &self.provider_options
    }

    pub fn provider_headers(&self) -> &HeaderMap {
        &self.provider_headers
    }

    pub fn variables(&self) -> Option<&VariableMap> {
        self.variables.as_ref()
    }

    pub fn recipient_variables(&self) -> Option<&VariableMap> {
        self.recipient_variables.as_ref()
    }

    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }
}
