use thiserror::Error;

/// Errors raised while building or reading a [`Message`](crate::Message).
#[derive(Debug, Error)]
pub enum MessageError {
    /// The raw message could not be parsed as RFC 822 / MIME.
    #[error("malformed message: {0}")]
    Parse(String),

    /// A body part could not be decoded with its declared charset.
    #[error("cannot decode {mime_type} part: {reason}")]
    Decode {
        /// MIME type of the offending part.
        mime_type: String,
        /// Human-readable cause.
        reason: String,
    },
}

impl From<mailparse::MailParseError> for MessageError {
    fn from(err: mailparse::MailParseError) -> Self {
        Self::Parse(err.to_string())
    }
}
