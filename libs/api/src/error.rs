//! Error types for the REST client.

use std::error::Error as StdError;

use thiserror::Error;

/// Errors returned by [`crate::Api`] and [`crate::Resource`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// The client was given settings or tokens it cannot use.
    #[error("improperly configured: {0}")]
    ImproperlyConfigured(String),

    /// The server answered 404.
    #[error("Client Error 404: {url}")]
    NotFound { url: String, body: String },

    /// The server answered with any other 4xx status.
    #[error("{}", client_message(*status, url, body))]
    Client {
        status: u16,
        url: String,
        body: String,
    },

    /// The server answered with a 5xx status.
    #[error("Server Error {status}: {url}")]
    Server {
        status: u16,
        url: String,
        body: String,
    },

    /// The server's TLS certificate could not be verified.
    #[error("Could not verify the server's SSL certificate")]
    CouldNotVerifyServer(#[source] reqwest::Error),

    /// Transport failure (connect, timeout, body read).
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),
}

fn client_message(status: u16, url: &str, body: &str) -> String {
    if status == 400 && !body.is_empty() {
        format!("Client Error {status}: {url} ({body})")
    } else {
        format!("Client Error {status}: {url}")
    }
}

impl ApiError {
    /// Maps a non-success status to its error, or `None` for anything below 400.
    pub(crate) fn from_status(status: u16, url: &str, body: String) -> Option<Self> {
        let url = url.to_string();
        match status {
            404 => Some(Self::NotFound { url, body }),
            400..=499 => Some(Self::Client { status, url, body }),
            500..=599 => Some(Self::Server { status, url, body }),
            _ => None,
        }
    }

    /// Returns the HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Client { status, .. } | Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true for any 4xx answer, 404 included.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Client { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Server { .. })
    }

    /// Returns true if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network(err) if err.is_timeout())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if is_certificate_error(&err) {
            Self::CouldNotVerifyServer(err)
        } else {
            Self::Network(err)
        }
    }
}

/// Walks the source chain looking for a TLS certificate failure.
fn is_certificate_error(err: &reqwest::Error) -> bool {
    let mut source = StdError::source(err);
    while let Some(inner) = source {
        if inner.to_string().to_ascii_lowercase().contains("certificate") {
            return true;
        }
        source = inner.source();
    }
    false
}
