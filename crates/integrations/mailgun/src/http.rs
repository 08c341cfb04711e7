use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use tracing::{debug, instrument, warn};

use crate::client::{ClientFactory, MailgunClient, MailgunResponse};
use crate::config::MailgunSettings;
use crate::error::MailgunError;
use crate::fields::{AttachmentPart, FieldMap, FieldValue};

/// Mailgun client speaking the HTTP messages API.
///
/// Fields are sent as `multipart/form-data`: one text part per string, one
/// file part per attachment. Authentication is HTTP Basic with the user
/// `api` and the API key.
pub struct HttpMailgunClient {
    settings: MailgunSettings,
    client: Client,
    test_mode: bool,
}

impl std::fmt::Debug for HttpMailgunClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMailgunClient")
            .field("settings", &self.settings)
            .field("test_mode", &self.test_mode)
            .finish_non_exhaustive()
    }
}

impl HttpMailgunClient {
    /// Create a client from resolved settings.
    ///
    /// The request timeout comes from `api_timeout`; the client starts in
    /// test mode when `api_test_mode` is set.
    pub fn new(settings: MailgunSettings) -> Result<Self, MailgunError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.api_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self::with_client(settings, client))
    }

    /// Create a client with a custom HTTP client.
    ///
    /// Useful for testing or for sharing a connection pool.
    pub fn with_client(settings: MailgunSettings, client: Client) -> Self {
        let test_mode = settings.api_test_mode;
        Self {
            settings,
            client,
            test_mode,
        }
    }

    pub fn settings(&self) -> &MailgunSettings {
        &self.settings
    }

    /// Build the messages endpoint URL for `domain`.
    fn messages_url(&self, domain: &str) -> String {
        format!("{}/{domain}/messages", self.settings.base_url())
    }
}

#[async_trait]
impl MailgunClient for HttpMailgunClient {
    #[instrument(skip(self, fields), fields(provider = "mailgun", field_count = fields.len()))]
    async fn send(&self, domain: &str, fields: &FieldMap) -> Result<MailgunResponse, MailgunError> {
        if domain.trim().is_empty() {
            return Err(MailgunError::MissingDomain);
        }

        if self.test_mode {
            debug!("test mode enabled, not contacting Mailgun");
            return Ok(MailgunResponse::test_mode());
        }

        let url = self.messages_url(domain);
        let form = build_form(fields)?;

        debug!(url = %url, "posting message to Mailgun");

        let response = self
            .client
            .post(&url)
            .basic_auth("api", Some(&self.settings.api_key))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = %status, "Mailgun rejected the message");
        }

        Ok(MailgunResponse::new(status.as_u16(), body))
    }

    fn enable_test_mode(&mut self) {
        self.test_mode = true;
    }

    fn is_test_mode(&self) -> bool {
        self.test_mode
    }
}

/// Builds [`HttpMailgunClient`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpClientFactory;

impl ClientFactory for HttpClientFactory {
    fn build(&self, settings: &MailgunSettings) -> Result<Box<dyn MailgunClient>, MailgunError> {
        Ok(Box::new(HttpMailgunClient::new(settings.clone())?))
    }
}

/// Form part name for a field key.
///
/// The envelope reply-to travels as the `h:Reply-To` header on the wire.
fn wire_name(key: &str) -> String {
    match key {
        "reply-to" => "h:Reply-To".to_owned(),
        other => other.to_owned(),
    }
}

/// Encode a field map as a multipart form.
fn build_form(fields: &FieldMap) -> Result<Form, MailgunError> {
    let mut form = Form::new();

    for (key, value) in fields.iter() {
        match value {
            FieldValue::Text(text) => {
                form = form.text(wire_name(key), text.clone());
            }
            FieldValue::List(items) => {
                for item in items {
                    form = form.text(wire_name(key), item.clone());
                }
            }
            FieldValue::Attachments(parts) => {
                for part in parts {
                    let name = if part.inline { "inline" } else { "attachment" };
                    form = form.part(name, file_part(part)?);
                }
            }
        }
    }

    Ok(form)
}

fn file_part(attachment: &AttachmentPart) -> Result<Part, MailgunError> {
    Part::bytes(attachment.data.to_vec())
        .file_name(attachment.filename.clone())
        .mime_str(&attachment.content_type)
        .map_err(|e| MailgunError::InvalidAttachment {
            filename: attachment.filename.clone(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;
    use crate::config::MailgunConfig;

    /// A minimal mock HTTP server that captures one request and returns a
    /// canned response.
    struct MockMailgunServer {
        listener: tokio::net::TcpListener,
        host: String,
    }

    impl MockMailgunServer {
        async fn start() -> Self {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("failed to bind mock server");
            let port = listener.local_addr().unwrap().port();
            let host = format!("127.0.0.1:{port}");
            Self { listener, host }
        }

        /// Accept one connection, reply, and return the raw request.
        async fn respond_once(self, status_code: u16, body: &str) -> String {
            let body = body.to_owned();
            let (mut stream, _) = self.listener.accept().await.unwrap();

            let mut request = Vec::new();
            let mut chunk = vec![0u8; 8192];
            while !request_complete(&request) {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status_code} OK\r\n\
                 Content-Type: application/json\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\
                 \r\n\
                 {body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();

            String::from_utf8_lossy(&request).into_owned()
        }
    }

    fn request_complete(buf: &[u8]) -> bool {
        let Some(head_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let head = String::from_utf8_lossy(&buf[..head_end]).to_ascii_lowercase();
        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok());
        match content_length {
            Some(len) => buf.len() >= head_end + 4 + len,
            None => buf.ends_with(b"--\r\n") || buf.ends_with(b"0\r\n\r\n"),
        }
    }

    fn settings_for(host: &str) -> MailgunSettings {
        MailgunConfig::new("key-test")
            .with_api_host(host)
            .with_ssl(false)
            .resolve(None)
            .unwrap()
    }

    fn sample_fields() -> FieldMap {
        let mut fields = FieldMap::new();
        fields.append_text("from", "unittest@example.org");
        fields.append_text("to", "a@example.org");
        fields.append_text("to", "b@example.org");
        fields.append_text("subject", "Test!");
        fields.insert_text("reply-to", "dude@example.com.au");
        fields.insert_text("o:tracking-opens", "true");
        fields.push_attachment(
            "attachment",
            AttachmentPart {
                filename: "info.txt".into(),
                content_type: "text/plain".into(),
                data: Bytes::from_static(b"hello world"),
                inline: false,
            },
        );
        fields.push_attachment(
            "attachment",
            AttachmentPart {
                filename: "logo.png".into(),
                content_type: "image/png".into(),
                data: Bytes::from_static(b"\x89PNG"),
                inline: true,
            },
        );
        fields
    }

    #[tokio::test]
    async fn send_posts_multipart_form() {
        let server = MockMailgunServer::start().await;
        let client = HttpMailgunClient::new(settings_for(&server.host)).unwrap();

        let response_body = r#"{"id":"<abc@example.org>","message":"Queued. Thank you."}"#;
        let server_handle =
            tokio::spawn(async move { server.respond_once(200, response_body).await });

        let response = client
            .send("example.org", &sample_fields())
            .await
            .expect("send should succeed");
        let request = server_handle.await.unwrap();

        assert_eq!(response.code, 200);
        assert_eq!(response.message_id().as_deref(), Some("abc@example.org"));

        assert!(request.starts_with("POST /v3/example.org/messages HTTP/1.1"));
        assert!(
            request
                .to_ascii_lowercase()
                .contains("authorization: basic yxbpomtles10zxn0")
        );
        assert!(request.contains("multipart/form-data"));
        assert!(request.contains("name=\"h:Reply-To\""));
        assert!(!request.contains("name=\"reply-to\""));
        assert!(request.contains("name=\"o:tracking-opens\""));
        assert_eq!(request.matches("name=\"to\"").count(), 2);
        assert!(request.contains("name=\"attachment\"; filename=\"info.txt\""));
        assert!(request.contains("name=\"inline\"; filename=\"logo.png\""));
        assert!(request.contains("hello world"));
    }

    #[tokio::test]
    async fn non_success_status_is_returned_not_raised() {
        let server = MockMailgunServer::start().await;
        let client = HttpMailgunClient::new(settings_for(&server.host)).unwrap();

        let server_handle = tokio::spawn(async move {
            server
                .respond_once(400, r#"{"message":"'from' parameter is missing"}"#)
                .await
        });

        let response = client.send("example.org", &FieldMap::new()).await.unwrap();
        server_handle.await.unwrap();

        assert_eq!(response.code, 400);
        assert!(!response.is_success());
        assert!(response.body.contains("'from' parameter is missing"));
    }

    #[tokio::test]
    async fn test_mode_skips_network() {
        // nothing listens on port 1
        let mut client = HttpMailgunClient::new(settings_for("127.0.0.1:1")).unwrap();
        assert!(!client.is_test_mode());
        client.enable_test_mode();
        assert!(client.is_test_mode());

        let response = client.send("example.org", &sample_fields()).await.unwrap();
        assert_eq!(response, MailgunResponse::test_mode());
    }

    #[tokio::test]
    async fn api_test_mode_setting_starts_in_test_mode() {
        let settings = MailgunConfig::new("key-test")
            .with_test_mode(true)
            .resolve(None)
            .unwrap();
        let client = HttpMailgunClient::new(settings).unwrap();
        assert!(client.is_test_mode());
    }

    #[tokio::test]
    async fn blank_domain_is_rejected() {
        let mut client = HttpMailgunClient::new(settings_for("127.0.0.1:1")).unwrap();
        client.enable_test_mode();
        let err = client.send("  ", &FieldMap::new()).await.unwrap_err();
        assert!(matches!(err, MailgunError::MissingDomain));
    }

    #[tokio::test]
    async fn transport_failure_surfaces_as_http_error() {
        let client = HttpMailgunClient::new(settings_for("127.0.0.1:1")).unwrap();
        let err = client.send("example.org", &FieldMap::new()).await.unwrap_err();
        assert!(matches!(err, MailgunError::Http(_)));
    }

    #[test]
    fn invalid_content_type_is_an_attachment_error() {
        let mut fields = FieldMap::new();
        fields.push_attachment(
            "attachment",
            AttachmentPart {
                filename: "broken.bin".into(),
                content_type: "not a mime type".into(),
                data: Bytes::new(),
                inline: false,
            },
        );
        let err = build_form(&fields).unwrap_err();
        assert!(matches!(
            err,
            MailgunError::InvalidAttachment { ref filename, .. } if filename == "broken.bin"
        ));
    }

    #[test]
    fn reply_to_uses_header_form_name() {
        assert_eq!(wire_name("reply-to"), "h:Reply-To");
        assert_eq!(wire_name("h:x-source"), "h:x-source");
    }

    #[test]
    fn debug_redacts_api_key() {
        let client = HttpMailgunClient::new(settings_for("localhost")).unwrap();
        let debug = format!("{client:?}");
        assert!(debug.contains("HttpMailgunClient"));
        assert!(!debug.contains("key-test"));
    }

    #[test]
    fn factory_builds_http_client() {
        let client = HttpClientFactory.build(&settings_for("localhost")).unwrap();
        assert!(!client.is_test_mode());
    }
}
