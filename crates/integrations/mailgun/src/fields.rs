use std::collections::BTreeMap;

use bytes::Bytes;
use courier_core::Attachment;

/// Binary attachment descriptor carried in a [`FieldMap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentPart {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
    pub inline: bool,
}

impl From<&Attachment> for AttachmentPart {
    fn from(attachment: &Attachment) -> Self {
        Self {
            filename: attachment.filename.clone(),
            content_type: attachment.content_type.clone(),
            // `Bytes` clones share the buffer; the message content is never copied or mutated.
            data: attachment.content.clone(),
            inline: attachment.inline,
        }
    }
}

/// Value of one provider field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Attachments(Vec<AttachmentPart>),
}

impl FieldValue {
    /// The value when it is a single string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The value when it is a list of strings.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }

    /// Every string carried by this value, in order. Empty for attachments.
    pub fn strings(&self) -> Vec<&str> {
        match self {
            Self::Text(text) => vec![text.as_str()],
            Self::List(list) => list.iter().map(String::as_str).collect(),
            Self::Attachments(_) => Vec::new(),
        }
    }

    /// Attachments carried by this value. Empty for string values.
    pub fn attachments(&self) -> &[AttachmentPart] {
        match self {
            Self::Attachments(parts) => parts,
            _ => &[],
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::List(list) => list.is_empty(),
            Self::Attachments(parts) => parts.is_empty(),
        }
    }
}

/// Provider-ready field set produced by [`transform`](crate::transform()).
///
/// Keys are bare semantic keys (`to`, `subject`, `attachment`, ...) or
/// prefixed dynamic keys (`o:<option>`, `h:<header>`, `t:<template field>`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    fields: BTreeMap<String, FieldValue>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        self.fields.insert(key.into(), value);
    }

    /// Set `key` to a single string.
    pub fn insert_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.insert(key, FieldValue::Text(value.into()));
    }

    /// Append a string to `key`, turning it into a list if needed.
    pub fn append_text(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.get_mut(key) {
            Some(FieldValue::List(list)) => list.push(value),
            Some(FieldValue::Text(existing)) => {
                let first = std::mem::take(existing);
                self.fields
                    .insert(key.to_owned(), FieldValue::List(vec![first, value]));
            }
            Some(FieldValue::Attachments(_)) | None => {
                self.fields
                    .insert(key.to_owned(), FieldValue::List(vec![value]));
            }
        }
    }

    /// Append an attachment under `key`.
    pub fn push_attachment(&mut self, key: &str, part: AttachmentPart) {
        match self.fields.get_mut(key) {
            Some(FieldValue::Attachments(parts)) => parts.push(part),
            _ => {
                self.fields
                    .insert(key.to_owned(), FieldValue::Attachments(vec![part]));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.remove(key)
    }

    /// Iterate fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Drop every field that would be sent empty.
    ///
    /// Empty elements are removed from lists first; fields whose value is
    /// then an empty string, an empty list or no attachments are removed.
    pub fn sanitize(&mut self) {
        for value in self.fields.values_mut() {
            if let FieldValue::List(list) = value {
                list.retain(|item| !item.is_empty());
            }
        }
        self.fields.retain(|_, value| !value.is_empty());
    }
}
