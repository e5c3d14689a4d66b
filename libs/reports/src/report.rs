//! Common interface of report formats.

use std::path::Path;

use archfx_slug::DeviceIdentifier;
use chrono::{DateTime, Utc};

use crate::{DataPoint, ReportError};

/// Data a device streamed to the cloud in one encoded blob.
pub trait Report {
    /// The encoded report as received or built.
    fn raw_report(&self) -> &[u8];

    /// When the report was received from the device.
    fn received_time(&self) -> DateTime<Utc>;

    /// The device the report came from.
    fn origin(&self) -> DeviceIdentifier;

    /// Readings that could be decoded from the report.
    fn visible_data(&self) -> &[DataPoint];

    fn is_signed(&self) -> bool {
        false
    }

    fn is_encrypted(&self) -> bool {
        false
    }

    fn is_verified(&self) -> bool {
        false
    }

    /// Returns the bytes `decode` would accept.
    fn encode(&self) -> Vec<u8> {
        self.raw_report().to_vec()
    }

    /// Writes the encoded report to `path`.
    fn write(&self, path: &Path) -> Result<(), ReportError> {
        std::fs::write(path, self.encode())?;
        tracing::debug!(path = %path.display(), size = self.raw_report().len(), "report written");
        Ok(())
    }

    /// One-line description.
    fn summary(&self) -> String {
        let verified = if self.is_verified() { "verified" } else { "not verified" };
        let encrypted = if self.is_encrypted() { "encrypted" } else { "not encrypted" };
        format!(
            "ArchFX Report (length: {}, visible data: {}, {verified} and {encrypted})",
            self.raw_report().len(),
            self.visible_data().len()
        )
    }
}
