pub mod preview;
pub mod send;
pub mod settings;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use courier_core::{Attachment, Message, VariableMap};

/// Options describing the message to build.
#[derive(Args, Debug, Default)]
pub struct MessageArgs {
    /// Start from a raw RFC 822 message file; other flags add to it.
    #[arg(long)]
    pub eml: Option<PathBuf>,
    /// Sender address.
    #[arg(long)]
    pub from: Option<String>,
    /// Recipient address (repeatable).
    #[arg(long)]
    pub to: Vec<String>,
    /// Carbon-copy address (repeatable).
    #[arg(long)]
    pub cc: Vec<String>,
    /// Blind carbon-copy address (repeatable).
    #[arg(long)]
    pub bcc: Vec<String>,
    /// Reply-To address.
    #[arg(long)]
    pub reply_to: Option<String>,
    #[arg(long)]
    pub subject: Option<String>,
    /// Plain-text body (string or @file path).
    #[arg(long)]
    pub text: Option<String>,
    /// HTML body (string or @file path).
    #[arg(long)]
    pub html: Option<String>,
    /// Stored Mailgun template to render instead of a body.
    #[arg(long)]
    pub template: Option<String>,
    #[arg(long)]
    pub template_version: Option<String>,
    /// File to attach (repeatable).
    #[arg(long)]
    pub attach: Vec<PathBuf>,
    /// File to attach inline (repeatable).
    #[arg(long)]
    pub inline: Vec<PathBuf>,
    /// Generic header (NAME=VALUE, repeatable).
    #[arg(long, value_parser = parse_key_val)]
    pub header: Vec<(String, String)>,
    /// Mailgun-specific header that overrides generic ones (NAME=VALUE).
    #[arg(long, value_parser = parse_key_val)]
    pub mailgun_header: Vec<(String, String)>,
    /// Mailgun option, sent as `o:NAME` (NAME=VALUE, repeatable).
    #[arg(long, value_parser = parse_key_val)]
    pub option: Vec<(String, String)>,
    /// Tracking variables as a JSON object (string or @file path).
    #[arg(long)]
    pub variables: Option<String>,
    /// Per-recipient variables as a JSON object (string or @file path).
    #[arg(long)]
    pub recipient_variables: Option<String>,
    /// Sending domain, overriding the configured default.
    #[arg(long)]
    pub domain: Option<String>,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid NAME=VALUE: no `=` found in `{s}`"))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// Read `value` literally, or from a file when it starts with `@`.
fn read_arg(value: &str) -> anyhow::Result<String> {
    match value.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {path}")),
        None => Ok(value.to_owned()),
    }
}

fn read_json_object(value: &str) -> anyhow::Result<VariableMap> {
    let content = read_arg(value)?;
    serde_json::from_str(&content).context("expected a JSON object")
}

fn read_attachment(path: &Path, inline: bool) -> anyhow::Result<Attachment> {
    let content =
        std::fs::read(path).with_context(|| format!("reading attachment {}", path.display()))?;
    let filename = path
        .file_name()
        .map_or_else(|| "attachment".to_owned(), |n| n.to_string_lossy().into_owned());
    let content_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_owned();
    Ok(if inline {
        Attachment::inline(filename, content_type, content)
    } else {
        Attachment::new(filename, content_type, content)
    })
}

/// Assemble a [`Message`] from the command-line options.
pub fn build_message(args: &MessageArgs) -> anyhow::Result<Message> {
    let mut message = match &args.eml {
        Some(path) => {
            let raw = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            Message::from_rfc822(&raw)?
        }
        None => Message::new(),
    };

    if let Some(from) = &args.from {
        message = message.with_from(from);
    }
    if let Some(reply_to) = &args.reply_to {
        message = message.with_reply_to(reply_to);
    }
    if let Some(subject) = &args.subject {
        message = message.with_subject(subject);
    }
    for address in &args.to {
        message = message.with_to(address);
    }
    for address in &args.cc {
        message = message.with_cc(address);
    }
    for address in &args.bcc {
        message = message.with_bcc(address);
    }
    if let Some(text) = &args.text {
        message = message.with_text(read_arg(text)?);
    }
    if let Some(html) = &args.html {
        message = message.with_html(read_arg(html)?);
    }
    if let Some(template) = &args.template {
        message = message.with_template(template);
    }
    if let Some(version) = &args.template_version {
        message = message.with_template_version(version);
    }
    for path in &args.attach {
        message.add_attachment(read_attachment(path, false)?);
    }
    for path in &args.inline {
        message.add_attachment(read_attachment(path, true)?);
    }
    for (name, value) in &args.header {
        message.insert_header(name, value);
    }
    for (name, value) in &args.mailgun_header {
        message = message.with_provider_header(name, value.as_str());
    }
    for (name, value) in &args.option {
        message = message.with_option(name, value);
    }
    if let Some(variables) = &args.variables {
        message = message.with_variables(read_json_object(variables)?);
    }
    if let Some(variables) = &args.recipient_variables {
        message = message.with_recipient_variables(read_json_object(variables)?);
    }
    if let Some(domain) = &args.domain {
        message = message.with_domain(domain);
    }

    Ok(message)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn parse_key_val_splits_on_first_equals() {
        assert_eq!(
            parse_key_val("X-Token=a=b").unwrap(),
            ("X-Token".to_owned(), "a=b".to_owned())
        );
        assert!(parse_key_val("no-equals").is_err());
    }

    #[test]
    fn builds_message_from_flags() {
        let args = MessageArgs {
            from: Some("unittest@example.org".into()),
            to: vec!["a@example.org".into(), "b@example.org".into()],
            subject: Some("Test!".into()),
            text: Some("hello".into()),
            header: vec![("X-Source".into(), "cli".into())],
            option: vec![("tracking-opens".into(), "true".into())],
            variables: Some(r#"{"order": 42}"#.into()),
            domain: Some("example.org".into()),
            ..MessageArgs::default()
        };

        let message = build_message(&args).unwrap();

        assert_eq!(message.from(), Some("unittest@example.org"));
        assert_eq!(message.to().len(), 2);
        assert_eq!(message.headers().get("x-source"), Some("cli"));
        assert_eq!(
            message.provider_options().get("tracking-opens").map(String::as_str),
            Some("true")
        );
        assert_eq!(message.variables().unwrap()["order"], 42);
        assert_eq!(message.domain(), Some("example.org"));
    }

    #[test]
    fn attachment_type_is_guessed_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("info.txt");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"Some info")
            .unwrap();

        let attachment = read_attachment(&path, false).unwrap();

        assert_eq!(attachment.filename, "info.txt");
        assert_eq!(attachment.content_type, "text/plain");
        assert!(!attachment.inline);
    }

    #[test]
    fn variables_must_be_an_object() {
        assert!(read_json_object("[1, 2]").is_err());
        assert!(read_json_object(r#"{"a": 1}"#).is_ok());
    }
}
