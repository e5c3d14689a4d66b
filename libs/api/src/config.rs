//! Client configuration.

use std::time::Duration;

/// Default ArchFX Cloud server.
pub const DOMAIN_NAME: &str = "https://arch.archfx.io";

/// Path prefix of every API endpoint.
pub const API_PREFIX: &str = "api/v1";

/// Token type used when none is given.
pub const DEFAULT_TOKEN_TYPE: &str = "jwt";

/// Settings for [`crate::Api`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Server root, without the API prefix.
    pub domain: String,

    /// Authorization scheme prefix (`jwt` or `token`).
    pub token_type: String,

    /// Verify the server's TLS certificate.
    pub verify: bool,

    /// Per-request timeout.
    pub timeout: Option<Duration>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            domain: DOMAIN_NAME.to_string(),
            token_type: DEFAULT_TOKEN_TYPE.to_string(),
            verify: true,
            timeout: None,
        }
    }
}

impl ApiConfig {
    /// Config for `domain` with every other setting at its default.
    pub fn with_domain(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Self::default()
        }
    }

    pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = token_type.into();
        self
    }

    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns `<domain>/api/v1`.
    pub fn base_url(&self) -> String {
        format!("{}/{API_PREFIX}", self.domain.trim_end_matches('/'))
    }
}
