//! Auth token commands.

use anyhow::Result;
use std::process::ExitCode;

use super::{Context, ttl};
use crate::AuthAction;

/// Execute an auth subcommand.
pub async fn execute(ctx: &Context, action: AuthAction) -> Result<ExitCode> {
    let auth = &ctx.auth;

    match action {
        AuthAction::SetToken { token, ttl: secs } => {
            auth.set_auth_token(&token, ttl(secs)).await?;
        },
        AuthAction::SetRefresh { token, ttl: secs } => {
            auth.set_refresh_token(&token, ttl(secs)).await?;
        },
        AuthAction::Token => return print_token(auth.auth_token().await?),
        AuthAction::Refresh => return print_token(auth.refresh_token().await?),
        AuthAction::Status => {
            if auth.is_authenticated().await {
                println!("authenticated");
            } else {
                println!("not authenticated");
                return Ok(ExitCode::from(1));
            }
        },
        AuthAction::Clear => {
            auth.clear_auth().await?;
            println!("Auth state cleared");
        },
    }

    Ok(ExitCode::SUCCESS)
}

fn print_token(token: Option<String>) -> Result<ExitCode> {
    match token {
        Some(token) => {
            println!("{token}");
            Ok(ExitCode::SUCCESS)
        },
        None => Ok(ExitCode::from(1)),
    }
}
