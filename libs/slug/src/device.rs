//! Device and data block identifiers.

use std::fmt;

use crate::codec::{
    checked_groups, decode, encode, split_typed, validate_groups, GroupWidth, GROUP_DELIMITER,
    TYPE_DELIMITER,
};
use crate::macros::{impl_deserialize_int_or_str, impl_slug_from_int, impl_slug_text};
use crate::{Slug, SlugError};

/// Tag of the canonical device form.
pub const DEVICE_TAG: &str = "d";

/// Tag of an archived data block.
pub const BLOCK_TAG: &str = "b";

/// Tag of a machine, sharing the device id space.
pub const MACHINE_TAG: &str = "m";

/// A device identifier: `d--0000-0000-0000-0001`.
///
/// The top 16 bits hold the data block id and the low 48 bits the device
/// id. Block (`b--`) and machine (`m--`) slugs are accepted on input and
/// collapse to the same `d--` canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DeviceIdentifier {
    value: u64,
}

impl DeviceIdentifier {
    /// Identifier kind used in error messages.
    pub const KIND: &'static str = "device identifier";

    const WIDTH: GroupWidth = GroupWidth::Bits64;

    const DEVICE_WIDTH: GroupWidth = GroupWidth::Bits48;

    /// Creates a device identifier from its full 64-bit value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self { value }
    }

    /// Creates a device identifier inside a data block.
    ///
    /// Only the low 48 bits of `device` are kept.
    #[must_use]
    pub const fn with_block(block: u16, device: u64) -> Self {
        let device = device & Self::DEVICE_WIDTH.max_value();
        Self::new(((block as u64) << 48) | device)
    }

    /// Creates a device identifier from an integer, allowing 64-bit values.
    pub fn from_int(value: i128) -> Result<Self, SlugError> {
        Self::from_int_with_width(value, true)
    }

    /// Creates a device identifier from an integer.
    ///
    /// When `allow_64bits` is false the value must fit in 48 bits.
    pub fn from_int_with_width(value: i128, allow_64bits: bool) -> Result<Self, SlugError> {
        let width = Self::value_width(allow_64bits);
        match u64::try_from(value) {
            Ok(v) if v <= width.max_value() => Ok(Self::new(v)),
            _ => Err(SlugError::range(
                Self::KIND,
                format!(
                    "{value} must be at least zero and less than 16^{}",
                    width.digits()
                ),
            )),
        }
    }

    /// Parses a device slug, allowing 64-bit values.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        Self::parse_with_width(s, true)
    }

    /// Parses a device, block or machine slug, or a bare hex id.
    ///
    /// Fewer than four groups are left-padded with zero groups; more than
    /// four keep only the rightmost four.
    pub fn parse_with_width(s: &str, allow_64bits: bool) -> Result<Self, SlugError> {
        let parts = split_typed(s);

        let id = match parts.as_slice() {
            [id] => *id,
            [tag, id] if is_device_tag(tag) => *id,
            [tag, _] => {
                return Err(SlugError::format(
                    Self::KIND,
                    format!("must start with d, b or m, got '{tag}'"),
                ))
            }
            _ => {
                return Err(SlugError::format(
                    Self::KIND,
                    format!("expected a single id after the type tag in '{s}'"),
                ))
            }
        };

        let id = checked_groups(id, Self::WIDTH.groups(), Self::KIND)?;
        let value = i128::from(decode(&id)?);
        Self::from_int_with_width(value, allow_64bits)
    }

    /// Parses a device slug, mapping empty input to `None`.
    pub fn parse_optional(s: &str) -> Result<Option<Self>, SlugError> {
        if s.is_empty() {
            return Ok(None);
        }
        Self::parse(s).map(Some)
    }

    /// Returns the full 64-bit value.
    pub const fn value(&self) -> u64 {
        self.value
    }

    /// Returns the data block id (top 16 bits).
    pub const fn block(&self) -> u16 {
        (self.value >> 48) as u16
    }

    /// Returns the device id without its block (low 48 bits).
    pub const fn device_id(&self) -> u64 {
        self.value & Self::DEVICE_WIDTH.max_value()
    }

    /// Renders the data block form: `b--0001-0000-0000-0123`.
    pub fn block_slug(&self) -> String {
        format!(
            "{BLOCK_TAG}{TYPE_DELIMITER}{}{GROUP_DELIMITER}{}",
            encode(self.block(), GroupWidth::Bits16),
            encode(self.device_id(), Self::DEVICE_WIDTH)
        )
    }

    fn value_width(allow_64bits: bool) -> GroupWidth {
        if allow_64bits {
            GroupWidth::Bits64
        } else {
            GroupWidth::Bits48
        }
    }
}

fn is_device_tag(tag: &str) -> bool {
    [DEVICE_TAG, BLOCK_TAG, MACHINE_TAG]
        .iter()
        .any(|t| t.eq_ignore_ascii_case(tag))
}

/// Splits a `d--` or `b--` slug into its block id and device id.
///
/// Returns `None` for any other tag or for malformed ids.
pub fn block_and_device(slug: &str) -> Option<(u16, u64)> {
    let parts = split_typed(slug);
    let [tag, id] = parts.as_slice() else {
        return None;
    };

    if !tag.eq_ignore_ascii_case(DEVICE_TAG) && !tag.eq_ignore_ascii_case(BLOCK_TAG) {
        return None;
    }

    validate_groups(id, DeviceIdentifier::KIND).ok()?;
    let (block, device) = id.split_once(GROUP_DELIMITER)?;
    let block = u16::try_from(decode(block).ok()?).ok()?;
    let device = decode(device).ok()?;
    Some((block, device))
}

impl fmt::Display for DeviceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{DEVICE_TAG}{TYPE_DELIMITER}{}",
            encode(self.value, Self::WIDTH)
        )
    }
}

impl Slug for DeviceIdentifier {}

impl From<u64> for DeviceIdentifier {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl_slug_text!(DeviceIdentifier);
impl_slug_from_int!(DeviceIdentifier; i32, i64, i128, u32);
impl_deserialize_int_or_str!(DeviceIdentifier);
