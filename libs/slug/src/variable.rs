//! Device-local variable identifiers.

use std::fmt;

use crate::codec::{checked_groups, decode, encode, validate_groups, GroupWidth, TYPE_DELIMITER};
use crate::macros::{impl_deserialize_int_or_str, impl_slug_from_int, impl_slug_text};
use crate::{Slug, SlugError};

/// A 32-bit local variable id: `0001-5051`.
///
/// The high 16 bits are the scope and the low 16 bits the variable id.
/// Variable ids are only unique within a device, so they carry no type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct VariableIdentifier {
    value: u32,
}

impl VariableIdentifier {
    /// Identifier kind used in error messages.
    pub const KIND: &'static str = "variable identifier";

    const WIDTH: GroupWidth = GroupWidth::Bits32;

    /// Creates a variable identifier from its packed value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self { value }
    }

    /// Packs a scope and variable id.
    #[must_use]
    pub const fn from_scope_and_id(scope: u16, id: u16) -> Self {
        Self::new(((scope as u32) << 16) | id as u32)
    }

    /// Creates a variable identifier from an integer, checking it fits 32 bits.
    pub fn from_int(value: i128) -> Result<Self, SlugError> {
        let value = u32::try_from(value).map_err(|_| {
            SlugError::range(
                Self::KIND,
                format!("{value} must be at least zero and less than 16^8"),
            )
        })?;
        Ok(Self::new(value))
    }

    /// Creates a variable identifier from a `(scope, id)` pair of integers.
    pub fn from_pair(scope: i128, id: i128) -> Result<Self, SlugError> {
        let scope = Self::half("scope", scope)?;
        let id = Self::half("variable id", id)?;
        Ok(Self::from_scope_and_id(scope, id))
    }

    /// Creates a variable identifier from a `(scope, id)` pair of hex groups.
    ///
    /// Each half is decoded and range checked on its own.
    pub fn from_hex_pair(scope: &str, id: &str) -> Result<Self, SlugError> {
        let scope = Self::half("scope", Self::decode_half(scope)?)?;
        let id = Self::half("variable id", Self::decode_half(id)?)?;
        Ok(Self::from_scope_and_id(scope, id))
    }

    /// Parses a variable id such as `5051` or `0001-5051`.
    ///
    /// A single group is taken as the variable id in scope zero.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.contains(TYPE_DELIMITER) {
            return Err(SlugError::format(
                Self::KIND,
                format!("variable ids carry no type tag, got '{s}'"),
            ));
        }

        let id = checked_groups(s, Self::WIDTH.groups(), Self::KIND)?;
        Self::from_int(i128::from(decode(&id)?))
    }

    /// Returns the packed 32-bit value.
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Returns the variable id (low 16 bits).
    pub const fn var_id(&self) -> u16 {
        (self.value & 0xFFFF) as u16
    }

    /// Returns the scope (high 16 bits).
    pub const fn scope(&self) -> u16 {
        (self.value >> 16) as u16
    }

    /// Returns the variable id as four hex digits.
    pub fn var_hex(&self) -> String {
        encode(self.var_id(), GroupWidth::Bits16)
    }

    /// Returns the scope as four hex digits.
    pub fn scope_hex(&self) -> String {
        encode(self.scope(), GroupWidth::Bits16)
    }

    fn decode_half(s: &str) -> Result<i128, SlugError> {
        validate_groups(s, Self::KIND)?;
        Ok(i128::from(decode(s)?))
    }

    fn half(what: &str, value: i128) -> Result<u16, SlugError> {
        u16::try_from(value).map_err(|_| {
            SlugError::range(
                Self::KIND,
                format!("{what} {value} must be at least zero and less than 16^4"),
            )
        })
    }
}

impl fmt::Display for VariableIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self.value, Self::WIDTH))
    }
}

impl Slug for VariableIdentifier {
    fn formatted_id(&self) -> String {
        self.text()
    }

    fn single_id(&self) -> Result<u64, SlugError> {
        Ok(u64::from(self.value))
    }
}

impl From<u32> for VariableIdentifier {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl TryFrom<(i64, i64)> for VariableIdentifier {
    type Error = SlugError;

    fn try_from((scope, id): (i64, i64)) -> Result<Self, Self::Error> {
        Self::from_pair(i128::from(scope), i128::from(id))
    }
}

impl TryFrom<(&str, &str)> for VariableIdentifier {
    type Error = SlugError;

    fn try_from((scope, id): (&str, &str)) -> Result<Self, Self::Error> {
        Self::from_hex_pair(scope, id)
    }
}

impl_slug_text!(VariableIdentifier);
impl_slug_from_int!(VariableIdentifier; i32, i64, i128, u64);
impl_deserialize_int_or_str!(VariableIdentifier);
