//! Report error types.

use archfx_api::ApiError;
use archfx_slug::SlugError;
use thiserror::Error;

/// Errors raised while building, decoding, saving or uploading reports.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Report or reading content is invalid.
    #[error("invalid report data: {0}")]
    Data(String),

    #[error(transparent)]
    Slug(#[from] SlugError),

    #[error("failed to encode report: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("failed to decode report: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("upload failed: {0}")]
    Api(#[from] ApiError),
}

impl ReportError {
    pub(crate) fn data(message: impl Into<String>) -> Self {
        Self::Data(message.into())
    }

    pub fn is_data_error(&self) -> bool {
        matches!(self, Self::Data(_))
    }
}
