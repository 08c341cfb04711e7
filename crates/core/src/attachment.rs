use bytes::Bytes;

/// A file attached to a message.
///
/// Inline attachments are meant to be referenced from the HTML body (for
/// example `cid:` images); the rest are regular downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Filename presented to the recipient.
    pub filename: String,
    /// MIME content type (e.g. `"application/pdf"`).
    pub content_type: String,
    /// Raw file content.
    pub content: Bytes,
    /// Whether the attachment is displayed inline.
    pub inline: bool,
}

impl Attachment {
    /// A regular (non-inline) attachment.
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            content: content.into(),
            inline: false,
        }
    }

    /// An inline attachment.
    pub fn inline(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        Self {
            inline: true,
            ..Self::new(filename, content_type, content)
        }
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}
