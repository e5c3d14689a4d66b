//! Site, Area and Line identifiers.

use std::fmt;

use crate::codec::{checked_groups, decode, encode, split_typed, GroupWidth, TYPE_DELIMITER};
use crate::macros::{impl_deserialize_str, impl_slug_from_int, impl_slug_text};
use crate::{Slug, SlugError};

/// The level of a parent in the organizational hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ParentType {
    /// `ps`
    Site,
    /// `pa`
    Area,
    /// `pl`
    #[default]
    Line,
}

impl ParentType {
    /// All parent types.
    pub const ALL: [ParentType; 3] = [ParentType::Site, ParentType::Area, ParentType::Line];

    /// Returns the slug type tag.
    pub const fn tag(self) -> &'static str {
        match self {
            ParentType::Site => "ps",
            ParentType::Area => "pa",
            ParentType::Line => "pl",
        }
    }

    /// Looks up a parent type by its tag, ignoring ASCII case.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.tag().eq_ignore_ascii_case(tag))
    }
}

impl fmt::Display for ParentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A 32-bit Site, Area or Line identifier: `pl--0000-0001`.
///
/// The zero value is valid and stands for "no parent".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParentIdentifier {
    parent_type: ParentType,
    value: u32,
}

impl ParentIdentifier {
    /// Identifier kind used in error messages.
    pub const KIND: &'static str = "parent identifier";

    const WIDTH: GroupWidth = GroupWidth::Bits32;

    /// Creates a Line identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self::with_type(value, ParentType::Line)
    }

    /// Creates an identifier of the given parent type.
    #[must_use]
    pub const fn with_type(value: u32, parent_type: ParentType) -> Self {
        Self { parent_type, value }
    }

    /// Creates a Line identifier from an integer, checking it fits 32 bits.
    pub fn from_int(value: i128) -> Result<Self, SlugError> {
        Self::from_int_with_type(value, ParentType::Line)
    }

    /// Creates an identifier from an integer, checking it fits 32 bits.
    pub fn from_int_with_type(value: i128, parent_type: ParentType) -> Result<Self, SlugError> {
        let value = u32::try_from(value).map_err(|_| {
            SlugError::range(
                Self::KIND,
                format!("{value} must be at least zero and less than 16^8"),
            )
        })?;
        Ok(Self::with_type(value, parent_type))
    }

    /// Parses a parent slug, treating untagged input as a Line.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        Self::parse_with_default(s, ParentType::Line)
    }

    /// Parses a parent slug, treating untagged input as `default_type`.
    ///
    /// Accepts `pl--0000-1234`, `pl--1234` and bare `1234`.
    pub fn parse_with_default(s: &str, default_type: ParentType) -> Result<Self, SlugError> {
        let parts = split_typed(s);

        let (parent_type, id) = match parts.as_slice() {
            [id] => (default_type, *id),
            [tag, id] => {
                let parent_type = ParentType::from_tag(tag).ok_or_else(|| {
                    SlugError::format(
                        Self::KIND,
                        format!("must start with pl, pa or ps, got '{tag}'"),
                    )
                })?;
                (parent_type, *id)
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
        Self::from_int_with_type(value, parent_type)
    }

    /// Parses a parent slug, mapping empty input to `None`.
    pub fn parse_optional(s: &str) -> Result<Option<Self>, SlugError> {
        if s.is_empty() {
            return Ok(None);
        }
        Self::parse(s).map(Some)
    }

    /// Returns the parent type.
    pub const fn parent_type(&self) -> ParentType {
        self.parent_type
    }

    /// Returns the integer value.
    pub const fn value(&self) -> u32 {
        self.value
    }
}

impl fmt::Display for ParentIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.parent_type,
            TYPE_DELIMITER,
            encode(self.value, Self::WIDTH)
        )
    }
}

impl Slug for ParentIdentifier {}

impl From<u32> for ParentIdentifier {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl_slug_text!(ParentIdentifier);
impl_slug_from_int!(ParentIdentifier; i32, i64, i128, u64);
impl_deserialize_str!(ParentIdentifier);
