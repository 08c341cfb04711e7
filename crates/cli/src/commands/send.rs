use clap::Args;
use courier_mailgun::{Dispatcher, MailgunConfig};

use super::{MessageArgs, build_message};
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub message: MessageArgs,
}

pub async fn run(
    config: MailgunConfig,
    args: &SendArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let mut message = build_message(&args.message)?;
    let dispatcher = Dispatcher::new(config);

    let response = dispatcher.deliver(&mut message).await?;

    match format {
        OutputFormat::Json => {
            let body = response
                .json()
                .unwrap_or_else(|_| serde_json::Value::String(response.body.clone()));
            let output = serde_json::json!({
                "code": response.code,
                "message_id": message.message_id(),
                "body": body,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            println!("{} {}", response.code, response.body);
            if let Some(id) = message.message_id() {
                println!("Message-Id: {id}");
            }
        }
    }

    if !response.is_success() {
        std::process::exit(1);
    }

    Ok(())
}
