use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_error, output_success, Reported};
use crate::cli::OutputFormat;
use crate::clock::{Clock, FixedClock, SystemClock};
use crate::config::AppConfig;
use crate::customer::InMemoryDirectory;
use crate::magic_link::{MagicLinkCodec, MagicLinkGenerator};

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Sign a token for an email without checking the customer directory")]
    Encode {
        #[arg(help = "Customer email")]
        email: String,
        #[arg(long, help = "Lifetime in hours (defaults to MAGIC_LINK_EXPIRE_HOURS)")]
        hours: Option<u32>,
    },

    #[command(about = "Verify a token and show its contents")]
    Decode {
        #[arg(help = "Token string")]
        token: String,
        #[arg(long, help = "Evaluate expiry at this Unix time instead of now")]
        at: Option<i64>,
    },

    #[command(about = "Issue a link for an email that has an active account")]
    Issue {
        #[arg(help = "Customer email")]
        email: String,
        #[arg(long, help = "Lifetime in hours (defaults to MAGIC_LINK_EXPIRE_HOURS)")]
        hours: Option<u32>,
        #[arg(long, help = "Customer directory JSON file (defaults to CUSTOMER_DIRECTORY_FILE)")]
        customers: Option<String>,
    },
}

pub async fn handle(cmd: TokenCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Encode { email, hours } => {
            let codec = MagicLinkCodec::new(&config.magic_link, Arc::new(SystemClock))?;
            let (token, expires_at) = codec.encode_with_expiry(&email, hours);

            output_success(
                &output_format,
                "Token signed",
                Some(json!({ "token": token, "expires_at": expires_at })),
            )
        }
        TokenCommands::Decode { token, at } => {
            let clock: Arc<dyn Clock> = match at {
                Some(now) => Arc::new(FixedClock::new(now)),
                None => Arc::new(SystemClock),
            };
            let codec = MagicLinkCodec::new(&config.magic_link, clock)?;

            match codec.decode(&token) {
                Ok(payload) => output_success(
                    &output_format,
                    "Token valid",
                    Some(json!({ "email": payload.email, "expires_at": payload.expires_at })),
                ),
                Err(reason) => {
                    output_error(&output_format, reason.message(), Some(json!(reason.code())))?;
                    Err(Reported(format!("token rejected: {}", reason)).into())
                }
            }
        }
        TokenCommands::Issue { email, hours, customers } => {
            let path = customers
                .or_else(|| config.directory.customer_file.clone())
                .context("no customer directory file given (--customers or CUSTOMER_DIRECTORY_FILE)")?;
            let directory = Arc::new(
                InMemoryDirectory::from_file(&path)
                    .with_context(|| format!("failed to load customers from {}", path))?,
            );

            let codec = Arc::new(MagicLinkCodec::new(&config.magic_link, Arc::new(SystemClock))?);
            let generator = MagicLinkGenerator::new(&config.magic_link, codec, directory.clone(), directory)?;
            let link = generator.link(&email, hours).await?;

            output_success(&output_format, "Magic link issued", Some(serde_json::to_value(link)?))
        }
    }
}
