//! Message-to-form transformation.
//!
//! [`transform`] turns a [`Message`] into the [`FieldMap`] the Mailgun
//! messages API expects. Header data arrives through three channels (the
//! envelope, generic headers and provider headers) and is reconciled into one
//! case-folded, conflict-free set of `h:*` fields.

use courier_core::{FoldedHeaders, Message, Part};
use serde_json::Value;

use crate::fields::{AttachmentPart, FieldMap, FieldValue};

/// Header names that never travel as `h:*` fields because an envelope field
/// already carries them. Compared against lowercased names.
pub const IGNORED_HEADERS: &[&str] = &[
    "to",
    "from",
    "subject",
    "reply-to",
    "template",
    "mime-version",
];

/// Envelope and attachment keys a generic header must not duplicate.
/// A header with one of these names is dropped only when the field is set.
pub const RESERVED_FIELDS: &[&str] = &[
    "from",
    "to",
    "cc",
    "bcc",
    "subject",
    "reply-to",
    ATTACHMENT_FIELD,
];

/// Field carrying the JSON-encoded tracking variables.
pub const VARIABLES_FIELD: &str = "h:X-Mailgun-Variables";

/// Field carrying the JSON-encoded per-recipient substitution data.
pub const RECIPIENT_VARIABLES_FIELD: &str = "recipient-variables";

/// Field under which every attachment accumulates.
pub const ATTACHMENT_FIELD: &str = "attachment";

/// A decision made while transforming that dropped data without failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// A header in the ignored set was dropped.
    IgnoredHeader { name: String },
    /// A header collided with an envelope field and was dropped.
    ReservedKey { name: String },
    /// A body part was present but could not be decoded.
    BodyUnavailable { field: &'static str, reason: String },
}

impl std::fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IgnoredHeader { name } => write!(f, "ignored header {name}"),
            Self::ReservedKey { name } => {
                write!(f, "header {name} duplicates an envelope field")
            }
            Self::BodyUnavailable { field, reason } => {
                write!(f, "{field} body unavailable: {reason}")
            }
        }
    }
}

/// Output of [`transform`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transformed {
    /// Provider-ready fields.
    pub fields: FieldMap,
    /// The message's generic and provider headers after merging and
    /// case-folding. The message itself is left untouched.
    pub headers: FoldedHeaders,
    /// Every non-fatal discard decision, in the order it was made.
    pub events: Vec<TraceEvent>,
}

/// Transform `message` into Mailgun form fields.
///
/// Pure and deterministic: no I/O, no logging, the message is only read.
/// Discarded data is reported through [`Transformed::events`].
///
/// # Examples
///
/// ```
/// use courier_core::Message;
/// use courier_mailgun::transform;
///
/// let message = Message::new()
///     .with_from("unittest@example.org")
///     .with_to("test@example.org")
///     .with_subject("Test!")
///     .with_header("X-Source", "unit tests")
///     .with_option("tracking-opens", "true");
///
/// let out = transform(&message);
/// assert_eq!(out.fields.get("o:tracking-opens").unwrap().as_text(), Some("true"));
/// assert_eq!(out.fields.get("h:x-source").unwrap().as_text(), Some("unit tests"));
/// ```
pub fn transform(message: &Message) -> Transformed {
    let mut fields = FieldMap::new();
    let mut events = Vec::new();

    add_envelope(message, &mut fields);

    match message.template().filter(|t| !t.trim().is_empty()) {
        Some(template) => add_template(message, template, &mut fields),
        None => add_bodies(message, &mut fields, &mut events),
    }

    for attachment in message.attachments() {
        fields.push_attachment(ATTACHMENT_FIELD, AttachmentPart::from(attachment));
    }

    for (name, value) in message.provider_options() {
        fields.insert_text(format!("o:{name}"), value.clone());
    }

    let headers = merged_headers(message);
    add_headers(&headers, &mut fields, &mut events);

    if let Some(variables) = message.recipient_variables() {
        fields.insert_text(RECIPIENT_VARIABLES_FIELD, to_json(variables));
    }

    if let Some(variables) = message.variables() {
        fields.insert_text(VARIABLES_FIELD, to_json(variables));
    }

    fields.sanitize();

    Transformed {
        fields,
        headers,
        events,
    }
}

fn add_envelope(message: &Message, fields: &mut FieldMap) {
    if let Some(from) = message.from() {
        fields.append_text("from", from);
    }

    if let Some(reply_to) = message.reply_to().filter(|r| !r.trim().is_empty()) {
        fields.insert_text("reply-to", reply_to);
    }

    if let Some(subject) = message.subject() {
        fields.append_text("subject", subject);
    }

    for (key, recipients) in [
        ("to", message.to()),
        ("cc", message.cc()),
        ("bcc", message.bcc()),
    ] {
        for address in recipients.iter() {
            fields.append_text(key, address);
        }
    }
}

fn add_template(message: &Message, template: &str, fields: &mut FieldMap) {
    fields.insert_text("template", template);

    if let Some(version) = message.template_version() {
        fields.insert_text("t:version", version);
    }

    if let Some(variables) = message.template_variables() {
        fields.insert_text("t:variables", to_json(variables));
    }
}

fn add_bodies(message: &Message, fields: &mut FieldMap, events: &mut Vec<TraceEvent>) {
    let body = message.body();
    let parts: [(&'static str, Option<&Part>); 3] = [
        ("text", body.text_part()),
        ("html", body.html_part()),
        ("amp-html", body.amp_html_part()),
    ];

    for (field, part) in parts {
        let Some(part) = part else { continue };
        match part.decoded() {
            Ok(content) => fields.append_text(field, content),
            Err(e) => events.push(TraceEvent::BodyUnavailable {
                field,
                reason: e.to_string(),
            }),
        }
    }
}

/// Generic headers with provider headers merged over them, case-folded.
fn merged_headers(message: &Message) -> FoldedHeaders {
    let mut merged = message.headers().clone();
    merged.merge_overriding(message.provider_headers());
    merged.fold()
}

fn add_headers(headers: &FoldedHeaders, fields: &mut FieldMap, events: &mut Vec<TraceEvent>) {
    for (name, values) in headers.iter() {
        if IGNORED_HEADERS.contains(&name) {
            events.push(TraceEvent::IgnoredHeader {
                name: name.to_owned(),
            });
            continue;
        }

        if RESERVED_FIELDS.contains(&name) && fields.contains_key(name) {
            events.push(TraceEvent::ReservedKey {
                name: name.to_owned(),
            });
            continue;
        }

        let value = match values {
            [single] => FieldValue::Text(single.clone()),
            many => FieldValue::List(many.to_vec()),
        };
        fields.insert(format!("h:{name}"), value);
    }
}

fn to_json(map: &courier_core::VariableMap) -> String {
    Value::Object(map.clone()).to_string()
}
