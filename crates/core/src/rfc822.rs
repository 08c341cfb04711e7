use mailparse::{DispositionType, ParsedMail};
use tracing::debug;

use crate::attachment::Attachment;
use crate::body::{Body, Part};
use crate::error::MessageError;
use crate::header::fold_name;
use crate::message::Message;

/// Headers describing the MIME structure itself. The body model owns these,
/// so they are not copied into the generic header collection.
const STRUCTURAL_HEADERS: &[&str] = &[
    "content-type",
    "content-transfer-encoding",
    "content-disposition",
];

impl Message {
    /// Build a message from a raw RFC 822 / MIME document.
    ///
    /// Top-level headers go through [`Message::insert_header`], so address
    /// headers populate the structural recipient fields. The MIME tree is
    /// walked depth-first: attachments are collected on the message, every
    /// other leaf becomes a body part. Leaves whose content cannot be
    /// transfer-decoded are skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use courier_core::Message;
    ///
    /// let raw = b"From: a@example.org\r\nTo: b@example.org\r\nSubject: Hi\r\n\r\nHello!\r\n";
    /// let message = Message::from_rfc822(raw).unwrap();
    /// assert_eq!(message.subject(), Some("Hi"));
    /// assert!(message.body().text_part().is_some());
    /// ```
    pub fn from_rfc822(raw: &[u8]) -> Result<Self, MessageError> {
        let parsed = mailparse::parse_mail(raw)?;
        let mut message = Message::new();

        for header in &parsed.headers {
            let name = header.get_key();
            if STRUCTURAL_HEADERS.contains(&fold_name(&name).as_str()) {
                continue;
            }
            message.insert_header(name, header.get_value());
        }

        let mut leaves = Vec::new();
        collect_parts(&mut message, &parsed, &mut leaves);

        let body = if is_multipart(&parsed) {
            Body::Multipart(leaves)
        } else {
            leaves.pop().map_or(Body::Empty, Body::Single)
        };
        *message.body_mut() = body;

        Ok(message)
    }
}

fn is_multipart(part: &ParsedMail<'_>) -> bool {
    part.ctype.mimetype.starts_with("multipart/")
}

fn collect_parts(message: &mut Message, part: &ParsedMail<'_>, leaves: &mut Vec<Part>) {
    if is_multipart(part) {
        for subpart in &part.subparts {
            collect_parts(message, subpart, leaves);
        }
        return;
    }

    let mime_type = part.ctype.mimetype.to_ascii_lowercase();
    let content = match part.get_body_raw() {
        Ok(content) => content,
        Err(e) => {
            debug!(mime_type = %mime_type, error = %e, "skipping undecodable MIME part");
            return;
        }
    };

    let disposition = part.get_content_disposition();
    let is_text = mime_type.starts_with("text/");
    let inline = match disposition.disposition {
        DispositionType::Attachment => Some(false),
        DispositionType::Inline if !is_text => Some(true),
        DispositionType::Inline => None,
        _ if !is_text => Some(false),
        _ => None,
    };

    if let Some(inline) = inline {
        let filename = disposition
            .params
            .get("filename")
            .or_else(|| part.ctype.params.get("name"))
            .cloned()
            .unwrap_or_else(|| "attachment".to_owned());
        message.add_attachment(Attachment {
            filename,
            content_type: mime_type,
            content: content.into(),
            inline,
        });
        return;
    }

    leaves.push(Part::new(mime_type, content).with_charset(part.ctype.charset.clone()));
}
