//! Streamer identifiers: the upload channels of a device.

use std::fmt;

use crate::codec::{checked_groups, decode, encode, split_typed, GroupWidth, TYPE_DELIMITER};
use crate::macros::{impl_deserialize_str, impl_slug_text};
use crate::{DeviceIdentifier, Slug, SlugError};

/// Tag of streamer slugs.
pub const STREAMER_TAG: &str = "t";

/// A streamer identifier: `t--0000-0000-0000-0001--0002`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StreamerIdentifier {
    device: DeviceIdentifier,
    index: u16,
}

impl StreamerIdentifier {
    /// Identifier kind used in error messages.
    pub const KIND: &'static str = "streamer identifier";

    /// Creates the streamer `index` of `device`.
    ///
    /// Only the low 16 bits of `index` are kept.
    #[must_use]
    pub fn new(device: impl Into<DeviceIdentifier>, index: u64) -> Self {
        Self {
            device: device.into(),
            index: (index & GroupWidth::Bits16.max_value()) as u16,
        }
    }

    /// Parses a streamer slug.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        let parts = split_typed(s);
        let [tag, device, index] = parts.as_slice() else {
            return Err(SlugError::format(
                Self::KIND,
                format!("'{s}' must look like t--<device>--<index>"),
            ));
        };

        if !tag.eq_ignore_ascii_case(STREAMER_TAG) {
            return Err(SlugError::format(
                Self::KIND,
                format!("must start with t, got '{tag}'"),
            ));
        }

        let device = DeviceIdentifier::parse(device)?;
        let index = decode(&checked_groups(index, GroupWidth::Bits16.groups(), Self::KIND)?)?;
        let index = u16::try_from(index).map_err(|_| {
            SlugError::range(
                Self::KIND,
                format!("index {index} must be less than 16^4"),
            )
        })?;

        Ok(Self { device, index })
    }

    /// Returns the device.
    pub const fn device(&self) -> DeviceIdentifier {
        self.device
    }

    /// Returns the streamer index.
    pub const fn index(&self) -> u16 {
        self.index
    }

    /// Returns the device slug, `d--...`.
    pub fn device_slug(&self) -> String {
        self.device.text()
    }

    /// Returns the index as four hex digits.
    pub fn index_hex(&self) -> String {
        encode(self.index, GroupWidth::Bits16)
    }
}

impl fmt::Display for StreamerIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{STREAMER_TAG}{TYPE_DELIMITER}{}{TYPE_DELIMITER}{}",
            self.device.formatted_id(),
            self.index_hex()
        )
    }
}

impl Slug for StreamerIdentifier {}

impl_slug_text!(StreamerIdentifier);
impl_deserialize_str!(StreamerIdentifier);
