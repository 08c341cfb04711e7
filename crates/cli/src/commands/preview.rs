use clap::Args;
use courier_mailgun::{FieldMap, FieldValue, transform};
use serde_json::{Value, json};

use super::{MessageArgs, build_message};
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub message: MessageArgs,
}

/// Transform the message and print the fields that would be sent.
pub fn run(args: &PreviewArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let message = build_message(&args.message)?;
    let transformed = transform(&message);

    match format {
        OutputFormat::Json => {
            let output = json!({
                "fields": fields_to_json(&transformed.fields),
                "events": transformed.events.iter().map(ToString::to_string).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            for (key, value) in transformed.fields.iter() {
                match value {
                    FieldValue::Attachments(parts) => {
                        for part in parts {
                            println!(
                                "{key}: {} ({}, {} bytes)",
                                part.filename,
                                part.content_type,
                                part.data.len()
                            );
                        }
                    }
                    _ => {
                        for item in value.strings() {
                            println!("{key}: {item}");
                        }
                    }
                }
            }
            for event in &transformed.events {
                eprintln!("note: {event}");
            }
        }
    }

    Ok(())
}

fn fields_to_json(fields: &FieldMap) -> Value {
    let map = fields
        .iter()
        .map(|(key, value)| {
            let value = match value {
                FieldValue::Text(text) => Value::String(text.clone()),
                FieldValue::List(items) => json!(items),
                FieldValue::Attachments(parts) => parts
                    .iter()
                    .map(|part| {
                        json!({
                            "filename": part.filename,
                            "content_type": part.content_type,
                            "size": part.data.len(),
                            "inline": part.inline,
                        })
                    })
                    .collect(),
            };
            (key.to_owned(), value)
        })
        .collect();
    Value::Object(map)
}
