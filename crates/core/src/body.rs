use bytes::Bytes;

use crate::error::MessageError;

/// MIME type of plain-text body parts.
pub const TEXT_PLAIN: &str = "text/plain";
/// MIME type of HTML body parts.
pub const TEXT_HTML: &str = "text/html";
/// MIME type of AMP for Email body parts.
pub const TEXT_AMP_HTML: &str = "text/x-amp-html";

/// A single leaf body part with transfer encoding already removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    mime_type: String,
    charset: Option<String>,
    content: Bytes,
}

impl Part {
    /// Create a part from raw (transfer-decoded) bytes.
    pub fn new(mime_type: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            mime_type: mime_type.into(),
            charset: None,
            content: content.into(),
        }
    }

    /// A UTF-8 `text/plain` part.
    pub fn text(body: impl Into<String>) -> Self {
        Self::new(TEXT_PLAIN, body.into()).with_charset("utf-8")
    }

    /// A UTF-8 `text/html` part.
    pub fn html(body: impl Into<String>) -> Self {
        Self::new(TEXT_HTML, body.into()).with_charset("utf-8")
    }

    /// Declare the charset the content is encoded with.
    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// Whether this part's MIME type equals `mime_type`, ignoring case.
    pub fn is(&self, mime_type: &str) -> bool {
        self.mime_type.eq_ignore_ascii_case(mime_type)
    }

    /// Decode the content to a string using the declared charset.
    ///
    /// Parts without a charset are read as UTF-8. Unknown charsets and
    /// malformed byte sequences are reported as [`MessageError::Decode`].
    pub fn decoded(&self) -> Result<String, MessageError> {
        let label = self.charset.as_deref().unwrap_or("utf-8");
        let encoding = encoding_rs::Encoding::for_label(label.as_bytes()).ok_or_else(|| {
            MessageError::Decode {
                mime_type: self.mime_type.clone(),
                reason: format!("unknown charset {label}"),
            }
        })?;

        encoding
            .decode_without_bom_handling_and_without_replacement(&self.content)
            .map(std::borrow::Cow::into_owned)
            .ok_or_else(|| MessageError::Decode {
                mime_type: self.mime_type.clone(),
                reason: format!("malformed {} data", encoding.name()),
            })
    }
}

/// Message body: nothing, one part, or the leaf parts of a multipart tree.
///
/// Attachments are never stored here; they live on the message itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Body {
    #[default]
    Empty,
    Single(Part),
    Multipart(Vec<Part>),
}

impl Body {
    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }

    /// The body part with the given MIME type.
    ///
    /// For a multipart body this is the first leaf of that type. A
    /// single-part body is returned only when its own type matches.
    pub fn part(&self, mime_type: &str) -> Option<&Part> {
        match self {
            Self::Empty => None,
            Self::Single(part) => part.is(mime_type).then_some(part),
            Self::Multipart(parts) => parts.iter().find(|p| p.is(mime_type)),
        }
    }

    pub fn text_part(&self) -> Option<&Part> {
        self.part(TEXT_PLAIN)
    }

    pub fn html_part(&self) -> Option<&Part> {
        self.part(TEXT_HTML)
    }

    pub fn amp_html_part(&self) -> Option<&Part> {
        self.part(TEXT_AMP_HTML)
    }

    /// Add a part, turning a single-part body into a multipart one.
    pub fn push(&mut self, part: Part) {
        *self = match std::mem::take(self) {
            Self::Empty => Self::Single(part),
            Self::Single(first) => Self::Multipart(vec![first, part]),
            Self::Multipart(mut parts) => {
                parts.push(part);
                Self::Multipart(parts)
            }
        };
    }
}
