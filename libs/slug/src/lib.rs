//! # archfx-slug
//!
//! Compact hierarchical identifiers ("slugs") used across ArchFX Cloud.
//!
//! ## Slug Format
//!
//! Values are fixed-width hex split into 4-digit groups joined by `-`. Typed
//! slugs prefix a type tag and join segments with `--`:
//!
//! ```text
//! parent    ps--0000-0001 | pa--0000-0001 | pl--0000-0001
//! device    d--0000-0000-0000-0001
//! variable  0001-5051
//! stream    sl--0000-0001--0000-0000-0000-0002--0000-5051[--1612829726628904]
//! streamer  t--0000-0000-0000-0001--0002
//! ```
//!
//! Every identifier:
//! - is validated and normalized when constructed and never mutated after
//! - round-trips through its canonical text (`Display` / `FromStr`)
//! - exposes its integer value where it has one
//!
//! Input is case-insensitive; output is always lowercase.

pub mod codec;
mod device;
mod error;
mod macros;
mod parent;
mod slug;
mod stream;
mod streamer;
mod variable;

pub use device::{block_and_device, DeviceIdentifier, BLOCK_TAG, DEVICE_TAG, MACHINE_TAG};
pub use error::SlugError;
pub use parent::{ParentIdentifier, ParentType};
pub use slug::Slug;
pub use stream::{StreamIdentifier, StreamParts, StreamStart, StreamType, START_DIGITS};
pub use streamer::{StreamerIdentifier, STREAMER_TAG};
pub use variable::VariableIdentifier;

/// Any identifier, parsed by its type tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnySlug {
    Parent(ParentIdentifier),
    Device(DeviceIdentifier),
    Variable(VariableIdentifier),
    Stream(StreamIdentifier),
    Streamer(StreamerIdentifier),
}

impl AnySlug {
    /// Parses a slug, choosing the identifier kind from its leading tag.
    ///
    /// Untagged input is read as a variable id.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        let tag = codec::split_typed(s);
        if tag.len() == 1 {
            return VariableIdentifier::parse(s).map(AnySlug::Variable);
        }

        let tag = tag[0].to_ascii_lowercase();
        match tag.as_str() {
            "ps" | "pa" | "pl" => ParentIdentifier::parse(s).map(AnySlug::Parent),
            "d" | "b" | "m" => DeviceIdentifier::parse(s).map(AnySlug::Device),
            STREAMER_TAG => StreamerIdentifier::parse(s).map(AnySlug::Streamer),
            t if t.starts_with('s') => StreamIdentifier::parse(s).map(AnySlug::Stream),
            t => Err(SlugError::Format {
                kind: "slug",
                message: format!("unknown type tag '{t}'"),
            }),
        }
    }

    /// Returns the identifier kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AnySlug::Parent(_) => ParentIdentifier::KIND,
            AnySlug::Device(_) => DeviceIdentifier::KIND,
            AnySlug::Variable(_) => VariableIdentifier::KIND,
            AnySlug::Stream(_) => StreamIdentifier::KIND,
            AnySlug::Streamer(_) => StreamerIdentifier::KIND,
        }
    }
}

impl std::fmt::Display for AnySlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnySlug::Parent(id) => std::fmt::Display::fmt(id, f),
            AnySlug::Device(id) => std::fmt::Display::fmt(id, f),
            AnySlug::Variable(id) => std::fmt::Display::fmt(id, f),
            AnySlug::Stream(id) => std::fmt::Display::fmt(id, f),
            AnySlug::Streamer(id) => std::fmt::Display::fmt(id, f),
        }
    }
}

impl Slug for AnySlug {
    fn formatted_id(&self) -> String {
        match self {
            AnySlug::Parent(id) => id.formatted_id(),
            AnySlug::Device(id) => id.formatted_id(),
            AnySlug::Variable(id) => id.formatted_id(),
            AnySlug::Stream(id) => id.formatted_id(),
            AnySlug::Streamer(id) => id.formatted_id(),
        }
    }

    fn single_id(&self) -> Result<u64, SlugError> {
        match self {
            AnySlug::Parent(id) => id.single_id(),
            AnySlug::Device(id) => id.single_id(),
            AnySlug::Variable(id) => id.single_id(),
            AnySlug::Stream(id) => id.single_id(),
            AnySlug::Streamer(id) => id.single_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_slug_dispatch() {
        let cases = [
            ("pa--0001", "parent identifier", "pa--0000-0001"),
            ("b--0001-0000-0000-0002", "device identifier", "d--0001-0000-0000-0002"),
            ("5051", "variable identifier", "0000-5051"),
            (
                "sl--0001--0002--5051",
                "stream identifier",
                "sl--0000-0001--0000-0000-0000-0002--0000-5051",
            ),
            ("t--0001--0002", "streamer identifier", "t--0000-0000-0000-0001--0002"),
        ];

        for (input, kind, canonical) in cases {
            let slug = AnySlug::parse(input).unwrap();
            assert_eq!(slug.kind(), kind, "input {input}");
            assert_eq!(slug.text(), canonical, "input {input}");
        }
    }

    #[test]
    fn test_any_slug_unknown_tag() {
        assert!(AnySlug::parse("x--0001").unwrap_err().is_format_error());
    }

    #[test]
    fn test_variable_single_id_is_packed_value() {
        let slug = AnySlug::parse("0001-5051").unwrap();
        assert_eq!(slug.single_id().unwrap(), 0x15051);
    }
}
