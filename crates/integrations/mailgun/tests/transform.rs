use courier_core::{Attachment, Message, VariableMap};
use courier_mailgun::{TraceEvent, transform};
use serde_json::{Value, json};

fn object(value: Value) -> VariableMap {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

fn base_message() -> Message {
    Message::new()
        .with_from("unittest@example.org")
        .with_to("test@example.org")
        .with_subject("Test!")
}

#[test]
fn basic_message_maps_envelope_and_bodies() {
    let message = base_message()
        .with_text("Test!")
        .with_html("<p>Test!</p>");

    let fields = transform(&message).fields;

    assert_eq!(fields.get("from").unwrap().strings(), ["unittest@example.org"]);
    assert_eq!(fields.get("to").unwrap().strings(), ["test@example.org"]);
    assert_eq!(fields.get("subject").unwrap().strings(), ["Test!"]);
    assert_eq!(fields.get("text").unwrap().strings(), ["Test!"]);
    assert_eq!(fields.get("html").unwrap().strings(), ["<p>Test!</p>"]);
    assert!(!fields.contains_key("template"));
}

#[test]
fn envelope_headers_travel_as_fields_not_headers() {
    let message = Message::new()
        .with_header("From", "unittest@example.org")
        .with_header("To", "test@example.org")
        .with_header("Subject", "Test!")
        .with_header("Bcc", "list@example.org")
        .with_header("Cc", "admin@example.com")
        .with_header("X-Source", "unit tests");

    let out = transform(&message);
    let fields = &out.fields;

    for name in ["h:from", "h:to", "h:subject", "h:bcc", "h:cc"] {
        assert!(!fields.contains_key(name), "{name} should not be emitted");
    }
    assert_eq!(fields.get("from").unwrap().strings(), ["unittest@example.org"]);
    assert_eq!(fields.get("to").unwrap().strings(), ["test@example.org"]);
    assert_eq!(fields.get("subject").unwrap().strings(), ["Test!"]);
    assert_eq!(fields.get("bcc").unwrap().strings(), ["list@example.org"]);
    assert_eq!(fields.get("cc").unwrap().strings(), ["admin@example.com"]);
    assert_eq!(fields.get("h:x-source").unwrap().as_text(), Some("unit tests"));

    assert!(out.events.contains(&TraceEvent::ReservedKey { name: "bcc".into() }));
    assert!(out.events.contains(&TraceEvent::IgnoredHeader { name: "to".into() }));
}

#[test]
fn address_set_both_ways_is_sent_once() {
    let message = base_message()
        .with_cc("admin@example.com")
        .with_header("Cc", "admin@example.com")
        .with_bcc("list@example.org")
        .with_header("BCC", "list@example.org");

    let out = transform(&message);

    assert_eq!(out.fields.get("cc").unwrap().strings(), ["admin@example.com"]);
    assert_eq!(out.fields.get("bcc").unwrap().strings(), ["list@example.org"]);
    assert!(!out.fields.contains_key("h:cc"));
    assert!(!out.fields.contains_key("h:bcc"));
}

#[test]
fn provider_options_become_o_fields() {
    let message = base_message()
        .with_option("tracking-opens", "true")
        .with_option("tag", "welcome");

    let fields = transform(&message).fields;

    assert_eq!(fields.get("o:tracking-opens").unwrap().as_text(), Some("true"));
    assert_eq!(fields.get("o:tag").unwrap().as_text(), Some("welcome"));
}

#[test]
fn attachment_keeps_filename_and_content_type() {
    let message =
        base_message().with_attachment(Attachment::new("info.txt", "text/plain", "Some info"));

    let fields = transform(&message).fields;

    let parts = fields.get("attachment").unwrap().attachments();
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].filename, "info.txt");
    assert_eq!(parts[0].content_type, "text/plain");
    assert_eq!(&parts[0].data[..], b"Some info");
}

#[test]
fn structural_reply_to_beats_header_overrides() {
    let message = base_message()
        .with_reply_to("dude@example.com.au")
        .with_header("Reply-To", "header@example.org")
        .with_provider_header("REPLY-TO", "provider@example.org");

    let out = transform(&message);
    let fields = &out.fields;

    assert!(!fields.contains_key("h:reply-to"));
    assert!(!fields.contains_key("h:Reply-To"));
    assert_eq!(
        fields.get("reply-to").unwrap().as_text(),
        Some("dude@example.com.au")
    );
    assert!(out.events.contains(&TraceEvent::IgnoredHeader {
        name: "reply-to".into()
    }));
}

#[test]
fn header_casings_collapse_in_order() {
    let message = base_message()
        .with_provider_header("x-neat-header", "1")
        .with_provider_header("X-Neat-Header", "2")
        .with_provider_header("X-NEAT-HEADER", "3");

    let fields = transform(&message).fields;

    assert_eq!(fields.get("h:x-neat-header").unwrap().strings(), ["1", "2", "3"]);
    assert_eq!(fields.keys().filter(|k| k.starts_with("h:x-neat")).count(), 1);
}

#[test]
fn provider_headers_win_over_generic_headers() {
    let message = base_message()
        .with_header("X-Campaign", "generic")
        .with_provider_header("x-campaign", vec!["provider-a", "provider-b"]);

    let out = transform(&message);

    assert_eq!(
        out.fields.get("h:x-campaign").unwrap().strings(),
        ["provider-a", "provider-b"]
    );
}

#[test]
fn variables_round_trip_as_json() {
    let recipient_variables = object(json!({
        "bob@example.com": {"first": "Bob", "id": 1},
        "alice@example.com": {"first": "Alice", "id": 2},
    }));
    let variables = object(json!({"order": 42, "tags": ["new", "vip"]}));

    let message = base_message()
        .with_to("bob@example.com")
        .with_recipient_variables(recipient_variables.clone())
        .with_variables(variables.clone());

    let fields = transform(&message).fields;

    let parsed: Value =
        serde_json::from_str(fields.get("recipient-variables").unwrap().as_text().unwrap())
            .unwrap();
    assert_eq!(parsed, Value::Object(recipient_variables));

    let parsed: Value =
        serde_json::from_str(fields.get("h:X-Mailgun-Variables").unwrap().as_text().unwrap())
            .unwrap();
    assert_eq!(parsed, Value::Object(variables));
}

#[test]
fn template_suppresses_bodies() {
    let message = base_message()
        .with_text("Test!")
        .with_html("<p>Test!</p>")
        .with_template("welcome-email");

    let fields = transform(&message).fields;

    assert_eq!(fields.get("template").unwrap().as_text(), Some("welcome-email"));
    assert!(!fields.contains_key("text"));
    assert!(!fields.contains_key("html"));
}

#[test]
fn empty_values_are_sanitized() {
    let message = Message::new()
        .with_from("unittest@example.org")
        .with_to("test@example.org")
        .with_subject("")
        .with_header("X-Empty", "")
        .with_option("tag", "");

    let fields = transform(&message).fields;

    assert!(!fields.contains_key("subject"));
    assert!(!fields.contains_key("h:x-empty"));
    assert!(!fields.contains_key("o:tag"));
    assert!(!fields.contains_key("cc"));
    assert!(!fields.contains_key("bcc"));
    for (key, value) in fields.iter() {
        assert!(
            value.strings().iter().all(|s| !s.is_empty()),
            "{key} carries an empty value"
        );
    }
}

#[test]
fn parsed_message_transforms_end_to_end() {
    let raw = concat!(
        "From: Unit Test <unittest@example.org>\r\n",
        "To: a@example.org, b@example.org\r\n",
        "Subject: Parsed\r\n",
        "X-Source: rfc822\r\n",
        "MIME-Version: 1.0\r\n",
        "Content-Type: multipart/alternative; boundary=\"b1\"\r\n",
        "\r\n",
        "--b1\r\n",
        "Content-Type: text/plain; charset=utf-8\r\n",
        "\r\n",
        "plain body\r\n",
        "--b1\r\n",
        "Content-Type: text/html; charset=utf-8\r\n",
        "\r\n",
        "<p>html body</p>\r\n",
        "--b1--\r\n",
    );

    let message = Message::from_rfc822(raw.as_bytes()).unwrap();
    let fields = transform(&message).fields;

    assert_eq!(
        fields.get("to").unwrap().strings(),
        ["a@example.org", "b@example.org"]
    );
    assert_eq!(fields.get("subject").unwrap().strings(), ["Parsed"]);
    assert_eq!(fields.get("h:x-source").unwrap().as_text(), Some("rfc822"));
    assert!(!fields.contains_key("h:mime-version"));
    assert!(fields.get("text").unwrap().strings()[0].starts_with("plain body"));
    assert!(fields.get("html").unwrap().strings()[0].starts_with("<p>html body</p>"));
}

#[test]
fn parsed_reply_to_is_kept() {
    let raw = concat!(
        "From: unittest@example.org\r\n",
        "To: test@example.org\r\n",
        "Reply-To: replies@example.org\r\n",
        "Subject: Parsed\r\n",
        "\r\n",
        "body\r\n",
    );

    let message = Message::from_rfc822(raw.as_bytes()).unwrap();
    let fields = transform(&message).fields;

    assert_eq!(
        fields.get("reply-to").unwrap().as_text(),
        Some("replies@example.org")
    );
    assert!(!fields.contains_key("h:reply-to"));
}
