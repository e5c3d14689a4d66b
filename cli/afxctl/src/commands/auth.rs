//! Authentication commands.

use anyhow::Result;
use archfx_api::Api;
use clap::Args;
use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

use crate::config::Config;
use crate::error::CliError;
use crate::output::{print_info, print_output, print_single, print_success, OutputFormat};
use crate::session::{self, SessionSettings};

use super::CommandContext;

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Password (for non-interactive login). Prompted for when omitted.
    #[arg(long, env = "AFX_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    field: String,
    value: String,
}

/// Log in with email and password and store the tokens.
pub async fn login(ctx: CommandContext, args: LoginArgs) -> Result<()> {
    let settings = SessionSettings {
        password: args.password,
        ..ctx.settings.clone()
    };

    let api = Api::with_domain(&settings.domain)?;
    let session = session::password_login(api, &settings).await?;

    let mut config = Config::load()?;
    config.set_customer(&settings.customer, session.stored_section());
    config.save()?;

    let who = session
        .api
        .username()
        .or(settings.email.as_deref())
        .unwrap_or_default();
    print_success(&format!("Logged in to {} as {who}.", settings.domain));
    Ok(())
}

/// Log out from the server and forget the stored tokens.
pub async fn logout(ctx: CommandContext) -> Result<()> {
    let customer = &ctx.settings.customer;
    let mut config = Config::load()?;

    let Some(section) = config.customer(customer).cloned() else {
        print_info(&format!("No stored token for customer '{customer}'."));
        return Ok(());
    };

    let mut api = Api::with_domain(&ctx.settings.domain)?;
    let installed = match (&section.token, &section.jwt_access) {
        (Some(token), _) => api.set_token(token.as_str(), Some("token")),
        (None, Some(access)) => api.set_token(access.as_str(), None),
        (None, None) => Ok(()),
    };
    installed.map_err(CliError::from)?;

    if api.token().is_some() {
        if let Err(err) = api.logout().await {
            tracing::warn!(error = %err, "server logout failed");
        }
    }

    config.remove_customer(customer);
    config.save()?;

    print_success("Logged out successfully.");
    Ok(())
}

/// Show who you are logged in as.
pub async fn whoami(ctx: CommandContext) -> Result<()> {
    let session = ctx.session().await?;
    let user = session
        .api
        .resource("auth")
        .child("user-info")
        .get()
        .await
        .map_err(CliError::from)?;

    match ctx.format {
        OutputFormat::Json => print_single(&user),
        OutputFormat::Table => print_output(&user_rows(&user), ctx.format),
    }

    ctx.finish(session).await
}

fn user_rows(user: &Value) -> Vec<UserRow> {
    let Some(fields) = user.as_object() else {
        return vec![UserRow {
            field: "user".to_string(),
            value: user.to_string(),
        }];
    };

    fields
        .iter()
        .filter(|(_, value)| !value.is_object() && !value.is_array())
        .map(|(field, value)| UserRow {
            field: field.clone(),
            value: match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            },
        })
        .collect()
}
