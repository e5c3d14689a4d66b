//! Authenticated HTTP session against the ArchFX Cloud API.

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::{ApiConfig, DEFAULT_TOKEN_TYPE};
use crate::error::ApiError;
use crate::resource::Resource;

/// Token material accepted by [`Api::set_token`].
///
/// Deserializes from a bare JSON string, `{"token": ..}` or
/// `{"access": .., "refresh": ..}`; `token` wins when both shapes are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenPayload {
    Bare(String),
    Token { token: String },
    Pair { access: String, refresh: String },
}

impl TokenPayload {
    /// Reads a payload from a JSON value.
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        serde_json::from_value(value.clone())
            .map_err(|_| ApiError::ImproperlyConfigured(format!("invalid token: {value}")))
    }
}

impl From<&str> for TokenPayload {
    fn from(token: &str) -> Self {
        Self::Bare(token.to_string())
    }
}

impl From<String> for TokenPayload {
    fn from(token: String) -> Self {
        Self::Bare(token)
    }
}

impl TryFrom<Value> for TokenPayload {
    type Error = ApiError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    jwt: Option<String>,
    #[serde(default)]
    jwt_refresh_token: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

/// Client for one ArchFX Cloud server.
///
/// Holds the current tokens; every request made through [`Api::resource`]
/// carries `Authorization: <token_type> <token>` once a token is set.
#[derive(Debug, Clone)]
pub struct Api {
    client: reqwest::Client,
    config: ApiConfig,
    base_url: String,
    token: Option<String>,
    refresh_token_data: Option<String>,
    auth_header: Option<HeaderValue>,
    username: Option<String>,
}

impl Api {
    /// Builds a client from `config`.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().danger_accept_invalid_certs(!config.verify);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            config,
            token: None,
            refresh_token_data: None,
            auth_header: None,
            username: None,
        })
    }

    /// Builds a client for `domain` using default settings.
    pub fn with_domain(domain: impl Into<String>) -> Result<Self, ApiError> {
        Self::new(ApiConfig::with_domain(domain))
    }

    pub fn domain(&self) -> &str {
        &self.config.domain
    }

    /// Returns `<domain>/api/v1`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token_type(&self) -> &str {
        &self.config.token_type
    }

    /// Current access token.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Current refresh token.
    pub fn refresh_token_data(&self) -> Option<&str> {
        self.refresh_token_data.as_deref()
    }

    /// Username returned by the last successful login.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Returns `<base_url>/<section>/`.
    pub fn url(&self, section: &str) -> String {
        format!("{}/{}/", self.base_url, section.trim_matches('/'))
    }

    /// Returns a handle on the endpoint at `path` (for example `streamer/report`).
    pub fn resource(&self, path: &str) -> Resource<'_> {
        Resource::new(self, self.url(path))
    }

    /// Installs a token, optionally switching the token type first.
    pub fn set_token(
        &mut self,
        token: impl Into<TokenPayload>,
        token_type: Option<&str>,
    ) -> Result<(), ApiError> {
        if let Some(token_type) = token_type {
            self.config.token_type = token_type.to_string();
        }
        self.apply_tokens(token.into())
    }

    fn apply_tokens(&mut self, payload: TokenPayload) -> Result<(), ApiError> {
        let (token, refresh) = match payload {
            TokenPayload::Bare(token) | TokenPayload::Token { token } => (token, None),
            TokenPayload::Pair { access, refresh } => (access, Some(refresh)),
        };

        let header = HeaderValue::from_str(&format!("{} {token}", self.config.token_type))
            .map_err(|_| ApiError::ImproperlyConfigured("token is not a valid header value".into()))?;

        self.token = Some(token);
        if refresh.is_some() {
            self.refresh_token_data = refresh;
        }
        self.auth_header = Some(header);
        Ok(())
    }

    fn destroy_tokens(&mut self) {
        self.token = None;
        self.refresh_token_data = None;
        self.auth_header = None;
    }

    /// Starts a request with the current authorization attached.
    pub(crate) fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.auth_header {
            Some(header) => request.header(AUTHORIZATION, header.clone()),
            None => request,
        }
    }

    /// Logs in with email and password.
    ///
    /// Returns `false` when the server rejects the credentials.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<bool, ApiError> {
        let response = self
            .client
            .post(self.url("auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() != 200 {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), %body, "login failed");
            return Ok(false);
        }

        let content: LoginResponse = response.json().await?;
        if let Some(access) = content.jwt {
            if let Err(error) = self.apply_tokens(TokenPayload::Bare(access)) {
                tracing::warn!(%error, "incompatible JWT token received from server");
            }
            if let Some(refresh) = content.jwt_refresh_token {
                self.refresh_token_data = Some(refresh);
            }
        }

        self.username = content.username;
        tracing::debug!(username = self.username.as_deref().unwrap_or_default(), "logged in");
        Ok(true)
    }

    /// Ends the server session and drops the local tokens.
    pub async fn logout(&mut self) -> Result<(), ApiError> {
        let response = self
            .request(Method::POST, &self.url("auth/logout"))
            .json(&json!({}))
            .send()
            .await?;

        let status = response.status().as_u16();
        if status == 204 {
            tracing::debug!(username = self.username.as_deref().unwrap_or_default(), "logged out");
            self.username = None;
            self.destroy_tokens();
        } else {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status, %body, "logout failed");
        }
        Ok(())
    }

    /// Exchanges the refresh token (or the current token) for a new one.
    ///
    /// Returns `false` and drops all tokens when the server refuses.
    pub async fn refresh_token(&mut self) -> Result<bool, ApiError> {
        if self.config.token_type != DEFAULT_TOKEN_TYPE {
            return Err(ApiError::ImproperlyConfigured(format!(
                "token refresh needs token type '{DEFAULT_TOKEN_TYPE}', not '{}'",
                self.config.token_type
            )));
        }

        let data = match &self.refresh_token_data {
            Some(refresh) => json!({ "refresh": refresh }),
            None => json!({ "token": self.token }),
        };

        let response = self
            .request(Method::POST, &self.url("auth/api-jwt-refresh"))
            .json(&data)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        if status == 200 {
            let refreshed = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|value| TokenPayload::from_value(value).ok());
            if let Some(payload) = refreshed {
                if self.apply_tokens(payload).is_ok() {
                    tracing::info!("token refreshed");
                    return Ok(true);
                }
            }
        }

        tracing::error!(status, %body, "token refresh failed");
        self.destroy_tokens();
        Ok(false)
    }
}
