use clap::Subcommand;
use serde_json::json;

use crate::auth::JwtGuard;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum JwtCommands {
    #[command(about = "Mint a development JWT signed with JWT_SECRET")]
    Issue {
        #[arg(help = "Subject (identity provider user id)")]
        sub: String,
        #[arg(help = "Customer email")]
        email: String,
    },

    #[command(about = "Validate a JWT and show its claims")]
    Verify {
        #[arg(help = "Token string")]
        token: String,
    },
}

pub fn handle(cmd: JwtCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let guard = JwtGuard::new(&config.security)?;

    match cmd {
        JwtCommands::Issue { sub, email } => {
            let token = guard.issue(&sub, &email)?;
            output_success(&output_format, "JWT issued", Some(json!({ "token": token })))
        }
        JwtCommands::Verify { token } => {
            let claims = guard.validate(&token)?;
            output_success(&output_format, "JWT valid", Some(serde_json::to_value(claims)?))
        }
    }
}
