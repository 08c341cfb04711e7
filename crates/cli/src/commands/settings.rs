use clap::Args;
use courier_mailgun::MailgunConfig;

use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct SettingsArgs {
    /// Sending domain to resolve; the configured default when omitted.
    #[arg(long)]
    pub domain: Option<String>,
}

/// Print the effective connection settings for a domain, key redacted.
pub fn run(
    config: &MailgunConfig,
    args: &SettingsArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let domain = args.domain.as_deref().or(config.domain.as_deref());
    let settings = config.resolve(domain)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "domain": domain,
                "base_url": settings.base_url(),
                "api_test_mode": settings.api_test_mode,
                "api_timeout_secs": settings.api_timeout.map(|t| t.as_secs()),
                "fake_message_send": settings.fake_message_send,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            println!("{settings:#?}");
        }
    }

    Ok(())
}
