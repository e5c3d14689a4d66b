//! Getting an authenticated [`Api`] for a command.
//!
//! Stored tokens for the customer are tried first. A rejected JWT is
//! refreshed when a refresh token is stored; after that the CLI falls back
//! to email and password.

use anyhow::Result;
use archfx_api::{Api, TokenPayload, DEFAULT_TOKEN_TYPE};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::CustomerSection;
use crate::error::CliError;
use crate::prompt;

/// Token type of long-lived API tokens.
const API_TOKEN_TYPE: &str = "token";

/// Where to connect and how to log in.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub domain: String,
    pub customer: String,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// How a session got its credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMethod {
    /// A stored token was accepted as is.
    StoredToken,
    /// A stored JWT was refreshed; the new tokens should be saved.
    Refreshed,
    /// Logged in with email and password.
    Password,
}

/// An authenticated client.
#[derive(Debug)]
pub struct Session {
    pub api: Api,
    pub method: LoginMethod,
}

impl Session {
    /// The tokens to store for this session.
    pub fn stored_section(&self) -> CustomerSection {
        stored_section(&self.api)
    }
}

/// Tokens from `api` in their config form.
pub fn stored_section(api: &Api) -> CustomerSection {
    let token = api.token().map(str::to_string);
    if api.token_type() == API_TOKEN_TYPE {
        CustomerSection {
            token,
            ..CustomerSection::default()
        }
    } else {
        CustomerSection {
            token: None,
            jwt_access: token,
            jwt_refresh: api.refresh_token_data().map(str::to_string),
        }
    }
}

/// Connects using stored tokens, falling back to email and password.
pub async fn connect(settings: &SessionSettings, stored: Option<&CustomerSection>) -> Result<Session> {
    let mut api = Api::with_domain(&settings.domain)?;

    if let Some(section) = stored {
        if install_stored_tokens(&mut api, section)? {
            match user_email(&api).await {
                Ok(email) => {
                    info!(%email, "Using stored token");
                    return Ok(Session {
                        api,
                        method: LoginMethod::StoredToken,
                    });
                }
                Err(err) if err.is_client_error() => {
                    debug!(error = %err, "stored token rejected");
                    info!("Token is illegal or has expired");
                }
                Err(err) => return Err(CliError::from(err).into()),
            }

            if section.jwt_refresh.is_some()
                && api.token_type() == DEFAULT_TOKEN_TYPE
                && api.refresh_token().await?
            {
                if let Ok(email) = user_email(&api).await {
                    info!(%email, "Using refreshed token");
                    return Ok(Session {
                        api,
                        method: LoginMethod::Refreshed,
                    });
                }
            }
        }
    }

    password_login(api, settings).await
}

/// Logs in with email and password, prompting for the password if needed.
pub async fn password_login(mut api: Api, settings: &SessionSettings) -> Result<Session> {
    let email = settings.email.as_deref().ok_or(CliError::EmailRequired)?;

    let password = match &settings.password {
        Some(password) => password.clone(),
        None => prompt::read_password("Password: ")?,
    };

    if !api.login(email, &password).await.map_err(CliError::from)? {
        return Err(CliError::LoginFailed(email.to_string()).into());
    }

    info!("Welcome {email}");
    Ok(Session {
        api,
        method: LoginMethod::Password,
    })
}

/// Installs the stored tokens. Returns false when the section holds none.
fn install_stored_tokens(api: &mut Api, section: &CustomerSection) -> Result<bool> {
    if let Some(token) = &section.token {
        api.set_token(token.as_str(), Some(API_TOKEN_TYPE))
            .map_err(CliError::from)?;
        return Ok(true);
    }

    let payload = match (&section.jwt_access, &section.jwt_refresh) {
        (Some(access), Some(refresh)) => TokenPayload::Pair {
            access: access.clone(),
            refresh: refresh.clone(),
        },
        (Some(access), None) => TokenPayload::Bare(access.clone()),
        (None, _) => return Ok(false),
    };

    api.set_token(payload, Some(DEFAULT_TOKEN_TYPE))
        .map_err(CliError::from)?;
    Ok(true)
}

async fn user_email(api: &Api) -> Result<String, archfx_api::ApiError> {
    let user = api.resource("auth").child("user-info").get().await?;
    Ok(user
        .get("email")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string())
}
