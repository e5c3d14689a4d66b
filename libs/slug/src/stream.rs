//! Stream identifiers: a parent, a device and a variable, with an optional
//! start time.
//!
//! ```text
//! <stype>--<parent>--<device>--<variable>[--<start>]
//! sl--0000-0001--0000-0000-0000-0002--0000-5051--1612829726628904
//! ```
//!
//! The stream type follows the parent type (`pl/sl`, `pa/sa`, `ps/ss`).
//! Streams with no parent use `sd`.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::codec::{join_typed, split_typed, GROUP_DELIMITER};
use crate::macros::{impl_deserialize_str, impl_slug_text};
use crate::{DeviceIdentifier, ParentIdentifier, ParentType, Slug, SlugError, VariableIdentifier};

/// Maximum number of decimal digits in a stream start timestamp.
pub const START_DIGITS: usize = 16;

/// Parent segment used when a stream slug leaves it empty.
const EMPTY_PARENT: &str = "0000-0000";

/// The stream type tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StreamType {
    /// `sl`, belongs to a Line.
    Line,
    /// `sa`, belongs to an Area.
    Area,
    /// `ss`, belongs to a Site.
    Site,
    /// `sd`, device-only stream with no parent.
    Device,
    /// Any other tag found while parsing, kept verbatim.
    Other(String),
}

impl StreamType {
    /// Returns the slug type tag.
    pub fn tag(&self) -> &str {
        match self {
            StreamType::Line => "sl",
            StreamType::Area => "sa",
            StreamType::Site => "ss",
            StreamType::Device => "sd",
            StreamType::Other(tag) => tag,
        }
    }

    /// Maps a tag to a stream type without validating it.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "sl" => StreamType::Line,
            "sa" => StreamType::Area,
            "ss" => StreamType::Site,
            "sd" => StreamType::Device,
            other => StreamType::Other(other.to_string()),
        }
    }

    /// Returns the stream type of a stream owned by `parent`.
    pub const fn from_parent(parent: ParentType) -> Self {
        match parent {
            ParentType::Line => StreamType::Line,
            ParentType::Area => StreamType::Area,
            ParentType::Site => StreamType::Site,
        }
    }

    /// Returns the parent type owning this kind of stream, if any.
    pub const fn parent_type(&self) -> Option<ParentType> {
        match self {
            StreamType::Line => Some(ParentType::Line),
            StreamType::Area => Some(ParentType::Area),
            StreamType::Site => Some(ParentType::Site),
            StreamType::Device | StreamType::Other(_) => None,
        }
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The start of a stream, in microseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamStart {
    /// A calendar instant.
    At(DateTime<Utc>),
    /// Microseconds since the epoch.
    Micros(u64),
    /// Microseconds since the epoch as decimal digits.
    Digits(String),
}

impl StreamStart {
    /// Renders the start as a zero-padded 16 digit field.
    fn to_field(&self) -> Result<String, SlugError> {
        let digits = match self {
            StreamStart::At(at) => {
                let micros = u64::try_from(at.timestamp_micros()).map_err(|_| {
                    SlugError::range(StreamIdentifier::KIND, format!("{at} is before the epoch"))
                })?;
                micros.to_string()
            }
            StreamStart::Micros(micros) => micros.to_string(),
            StreamStart::Digits(digits) => {
                validate_digits(digits)?;
                let significant = digits.trim_start_matches('0');
                if significant.is_empty() {
                    "0".to_string()
                } else {
                    significant.to_string()
                }
            }
        };

        if digits.len() > START_DIGITS {
            return Err(SlugError::range(
                StreamIdentifier::KIND,
                format!("timestamp too big: {digits} has more than {START_DIGITS} digits"),
            ));
        }

        Ok(format!("{digits:0>width$}", width = START_DIGITS))
    }
}

impl From<DateTime<Utc>> for StreamStart {
    fn from(at: DateTime<Utc>) -> Self {
        StreamStart::At(at)
    }
}

impl From<u64> for StreamStart {
    fn from(micros: u64) -> Self {
        StreamStart::Micros(micros)
    }
}

impl From<&str> for StreamStart {
    fn from(digits: &str) -> Self {
        StreamStart::Digits(digits.to_string())
    }
}

impl From<String> for StreamStart {
    fn from(digits: String) -> Self {
        StreamStart::Digits(digits)
    }
}

fn validate_digits(digits: &str) -> Result<(), SlugError> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SlugError::format(
            StreamIdentifier::KIND,
            format!("start must be decimal digits, got '{digits}'"),
        ));
    }
    Ok(())
}

/// A stream identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamIdentifier {
    stream_type: StreamType,
    parent: ParentIdentifier,
    device: DeviceIdentifier,
    variable: VariableIdentifier,
    start: Option<String>,
}

/// The components of a stream slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamParts {
    /// The owning Site, Area or Line (zero when there is none).
    pub parent: ParentIdentifier,
    /// Data block group of the device segment.
    pub block: String,
    /// Scope group of the device segment; `0000` for devices.
    pub scope: String,
    /// Device or machine id, the last two groups of the device segment.
    pub device: String,
    /// The variable id.
    pub variable: VariableIdentifier,
    /// The start segment, verbatim.
    pub start: Option<String>,
}

impl StreamIdentifier {
    /// Identifier kind used in error messages.
    pub const KIND: &'static str = "stream identifier";

    /// Parses a stream slug with four or five segments.
    ///
    /// An empty parent segment stands for the zero parent. The start
    /// segment must be decimal digits but its length is not checked.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        let parts = split_typed(s);
        if !(4..=5).contains(&parts.len()) {
            return Err(SlugError::format(
                Self::KIND,
                format!(
                    "'{s}' must have between four and five terms: \
                     <stype>--<parent>--<device>--<variable>[--<start>]"
                ),
            ));
        }

        if parts[0].is_empty() {
            return Err(SlugError::format(
                Self::KIND,
                format!("'{s}' is missing its stream type"),
            ));
        }

        let stream_type = StreamType::from_tag(parts[0]);
        let parent_segment = if parts[1].is_empty() {
            EMPTY_PARENT
        } else {
            parts[1]
        };
        let parent = ParentIdentifier::parse_with_default(
            parent_segment,
            stream_type.parent_type().unwrap_or_default(),
        )?;
        let device = DeviceIdentifier::parse(parts[2])?;
        let variable = VariableIdentifier::parse(parts[3])?;

        let start = match parts.get(4) {
            Some(start) => {
                validate_digits(start)?;
                Some((*start).to_string())
            }
            None => None,
        };

        Ok(Self {
            stream_type,
            parent,
            device,
            variable,
            start,
        })
    }

    /// Builds a stream identifier from its components.
    ///
    /// Without a parent the stream type is `sd` and the zero parent is used.
    /// Without a device the zero (virtual) device is used. The start must
    /// fit in 16 decimal digits.
    pub fn from_parts(
        parent: Option<ParentIdentifier>,
        device: Option<DeviceIdentifier>,
        variable: VariableIdentifier,
        start: Option<StreamStart>,
    ) -> Result<Self, SlugError> {
        let (stream_type, parent) = match parent {
            Some(parent) => (StreamType::from_parent(parent.parent_type()), parent),
            None => (StreamType::Device, ParentIdentifier::new(0)),
        };

        let start = start.as_ref().map(StreamStart::to_field).transpose()?;

        Ok(Self {
            stream_type,
            parent,
            device: device.unwrap_or_default(),
            variable,
            start,
        })
    }

    /// Returns the stream type.
    pub fn stream_type(&self) -> &StreamType {
        &self.stream_type
    }

    /// Returns the parent, typed after the stream type.
    pub const fn parent(&self) -> ParentIdentifier {
        self.parent
    }

    /// Returns the device.
    pub const fn device(&self) -> DeviceIdentifier {
        self.device
    }

    /// Returns the variable.
    pub const fn variable(&self) -> VariableIdentifier {
        self.variable
    }

    /// Returns the start segment, if any.
    pub fn start(&self) -> Option<&str> {
        self.start.as_deref()
    }

    /// Splits the slug into its structured components.
    pub fn parts(&self) -> StreamParts {
        let device = self.device.formatted_id();
        let groups: Vec<&str> = device.split(GROUP_DELIMITER).collect();

        StreamParts {
            parent: self.parent,
            block: groups[0].to_string(),
            scope: groups[1].to_string(),
            device: groups[2..].join(GROUP_DELIMITER),
            variable: self.variable,
            start: self.start.clone(),
        }
    }
}

impl fmt::Display for StreamIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut segments = vec![
            self.stream_type.tag().to_string(),
            self.parent.formatted_id(),
            self.device.formatted_id(),
            self.variable.to_string(),
        ];
        if let Some(start) = &self.start {
            segments.push(start.clone());
        }
        f.write_str(&join_typed(&segments))
    }
}

impl Slug for StreamIdentifier {}

impl_slug_text!(StreamIdentifier);
impl_deserialize_str!(StreamIdentifier);

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn parent(s: &str) -> Option<ParentIdentifier> {
        Some(ParentIdentifier::parse(s).unwrap())
    }

    fn device(s: &str) -> Option<DeviceIdentifier> {
        Some(DeviceIdentifier::parse(s).unwrap())
    }

    fn variable(s: &str) -> VariableIdentifier {
        VariableIdentifier::parse(s).unwrap()
    }

    #[test]
    fn test_stream_parts() {
        let stream = StreamIdentifier::parse("sl--0000-0001--0000-0000-0000-0002--5051").unwrap();
        let parts = stream.parts();
        assert_eq!(parts.parent.text(), "pl--0000-0001");
        assert_eq!(parts.block, "0000");
        assert_eq!(parts.scope, "0000");
        assert_eq!(parts.device, "0000-0002");
        assert_eq!(parts.variable.text(), "0000-5051");
        assert_eq!(parts.start, None);
    }

    #[test]
    fn test_stream_parent_follows_stream_type() {
        let cases = [
            ("sa--0000-0001--0000-0001-0000-0123--0001-5051", "pa--0000-0001"),
            ("sl--0000-0001--0000-0001-0000-0123--0001-5051", "pl--0000-0001"),
            ("ss--0000-0001--0000-0001-0000-0123--0001-5051", "ps--0000-0001"),
        ];

        for (input, expected_parent) in cases {
            let parts = StreamIdentifier::parse(input).unwrap().parts();
            assert_eq!(parts.block, "0000");
            assert_eq!(parts.scope, "0001");
            assert_eq!(parts.device, "0000-0123");
            assert_eq!(parts.variable.text(), "0001-5051");
            assert_eq!(parts.parent.text(), expected_parent);
            assert_eq!(parts.start, None);
        }
    }

    #[test]
    fn test_stream_expands_short_segments() {
        let stream = StreamIdentifier::parse("sa--0001--0000-0123--5051").unwrap();
        assert_eq!(
            stream.text(),
            "sa--0000-0001--0000-0000-0000-0123--0000-5051"
        );
        let parts = stream.parts();
        assert_eq!(parts.scope, "0000");
        assert_eq!(parts.device, "0000-0123");
        assert_eq!(parts.parent.text(), "pa--0000-0001");
    }

    #[test]
    fn test_stream_with_start() {
        let stream = StreamIdentifier::parse(
            "sl--0000-0001--0000-0001-0000-0123--0001-5051--1612829726628904",
        )
        .unwrap();
        assert_eq!(stream.start(), Some("1612829726628904"));
        assert_eq!(stream.parts().start.as_deref(), Some("1612829726628904"));
    }

    #[test]
    fn test_stream_parse_keeps_long_start() {
        // Length is only enforced when building from parts
        let stream =
            StreamIdentifier::parse("sl--0000-0001--0000-0001--5051--16128297266289040").unwrap();
        assert_eq!(stream.start(), Some("16128297266289040"));
    }

    #[test]
    fn test_stream_empty_parent_segment() {
        let stream = StreamIdentifier::parse("sd----0000-0123--5051").unwrap();
        assert_eq!(
            stream.text(),
            "sd--0000-0000--0000-0000-0000-0123--0000-5051"
        );
        let parts = stream.parts();
        assert_eq!(parts.parent, ParentIdentifier::new(0));
        assert_eq!(parts.parent.text(), "pl--0000-0000");
    }

    #[test]
    fn test_stream_parse_rejects_bad_input() {
        assert!(StreamIdentifier::parse("sl--0000-0001--0000-0002")
            .unwrap_err()
            .is_format_error());
        assert!(
            StreamIdentifier::parse("sl--0000-0001--0000-0002--5051--1--2")
                .unwrap_err()
                .is_format_error()
        );
        assert!(StreamIdentifier::parse("sl--0000-0001--0000-0002--5051--12ab")
            .unwrap_err()
            .is_format_error());
        assert!(StreamIdentifier::parse("--0000-0001--0000-0002--5051")
            .unwrap_err()
            .is_format_error());
    }

    #[test]
    fn test_stream_from_parts() {
        let stream = StreamIdentifier::from_parts(
            parent("pa--0000-0001"),
            device("d--0000-0001-0000-0123"),
            variable("5051"),
            None,
        )
        .unwrap();
        assert_eq!(
            stream.text(),
            "sa--0000-0001--0000-0001-0000-0123--0000-5051"
        );

        let stream = StreamIdentifier::from_parts(
            parent("ps--0000-0001"),
            device("d--0000-0001-0000-0123"),
            VariableIdentifier::new(0x5051),
            None,
        )
        .unwrap();
        assert_eq!(
            stream.text(),
            "ss--0000-0001--0000-0001-0000-0123--0000-5051"
        );

        let stream = StreamIdentifier::from_parts(
            parent("pa--0000-0001"),
            device("d--0000-0001-0000-0123"),
            VariableIdentifier::new(0x10000 | 0x5051),
            None,
        )
        .unwrap();
        assert_eq!(
            stream.text(),
            "sa--0000-0001--0000-0001-0000-0123--0001-5051"
        );
    }

    #[test]
    fn test_stream_from_parts_without_parent() {
        let stream = StreamIdentifier::from_parts(
            None,
            device("d--0000-0001-0000-0123"),
            variable("0001-5051"),
            None,
        )
        .unwrap();
        assert_eq!(stream.stream_type(), &StreamType::Device);
        assert_eq!(
            stream.text(),
            "sd--0000-0000--0000-0001-0000-0123--0001-5051"
        );

        let reparsed = StreamIdentifier::parse(&stream.text()).unwrap();
        assert_eq!(reparsed.parts().parent, ParentIdentifier::new(0));
    }

    #[test]
    fn test_stream_from_parts_with_empty_strings() {
        let stream = StreamIdentifier::from_parts(
            ParentIdentifier::parse_optional("").unwrap(),
            DeviceIdentifier::parse_optional("").unwrap(),
            variable("5051"),
            None,
        )
        .unwrap();
        assert_eq!(stream.stream_type(), &StreamType::Device);
        assert_eq!(
            stream.text(),
            "sd--0000-0000--0000-0000-0000-0000--0000-5051"
        );
    }

    #[test]
    fn test_stream_rejects_empty_segments() {
        // Only the parent segment may be empty
        assert!(StreamIdentifier::parse("sl----0000-0002--5051").is_ok());
        for input in ["sl--0001----5051", "sl--0001--0002--", "sl--0001--0002--5051--"] {
            assert!(
                StreamIdentifier::parse(input).unwrap_err().is_format_error(),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_stream_from_parts_without_device() {
        let stream =
            StreamIdentifier::from_parts(parent("pl--0001"), None, variable("5051"), None).unwrap();
        assert_eq!(
            stream.text(),
            "sl--0000-0001--0000-0000-0000-0000--0000-5051"
        );
    }

    #[test]
    fn test_stream_from_parts_with_start() {
        let stream = StreamIdentifier::from_parts(
            parent("pa--0000-0001"),
            device("d--0000-0001-0000-0123"),
            variable("5051"),
            Some("1612829726628904".into()),
        )
        .unwrap();
        assert_eq!(
            stream.text(),
            "sa--0000-0001--0000-0001-0000-0123--0000-5051--1612829726628904"
        );

        let stream = StreamIdentifier::from_parts(
            parent("pa--0000-0001"),
            device("d--0000-0001-0000-0123"),
            variable("5051"),
            Some(StreamStart::Micros(42)),
        )
        .unwrap();
        assert_eq!(stream.start(), Some("0000000000000042"));
    }

    #[test]
    fn test_stream_from_parts_with_instant() {
        let now = Utc.with_ymd_and_hms(2021, 2, 9, 0, 15, 26).unwrap()
            + chrono::Duration::microseconds(628_904);
        let stream = StreamIdentifier::from_parts(
            parent("pa--0000-0001"),
            device("d--0000-0001-0000-0133"),
            variable("5051"),
            Some(now.into()),
        )
        .unwrap();
        assert_eq!(
            stream.text(),
            format!(
                "sa--0000-0001--0000-0001-0000-0133--0000-5051--{:016}",
                now.timestamp_micros()
            )
        );
    }

    #[test]
    fn test_stream_from_parts_rejects_long_start() {
        let err = StreamIdentifier::from_parts(
            parent("pa--0000-0001"),
            device("d--0000-0001-0000-0123"),
            variable("5051"),
            Some("16128297266289040".into()),
        )
        .unwrap_err();
        assert!(err.is_range_error());

        let err = StreamIdentifier::from_parts(
            parent("pa--0000-0001"),
            None,
            variable("5051"),
            Some(StreamStart::Micros(10u64.pow(16))),
        )
        .unwrap_err();
        assert!(err.is_range_error());
    }

    #[test]
    fn test_stream_type_mapping_is_bijective() {
        for parent_type in ParentType::ALL {
            let stream_type = StreamType::from_parent(parent_type);
            assert_eq!(stream_type.parent_type(), Some(parent_type));
            assert_eq!(StreamType::from_tag(stream_type.tag()), stream_type);
        }
        assert_eq!(StreamType::Device.parent_type(), None);
    }

    #[test]
    fn test_stream_has_no_single_id() {
        let stream = StreamIdentifier::parse("sl--0000-0001--0000-0002--5051").unwrap();
        assert!(stream.single_id().unwrap_err().is_invalid_operation());
    }

    #[test]
    fn test_stream_text_roundtrip() {
        let text = "ss--0000-0001--0000-0001-0000-0123--0001-5051--1612829726628904";
        let stream: StreamIdentifier = text.parse().unwrap();
        assert_eq!(stream.text(), text);
        assert_eq!(
            stream.formatted_id(),
            "0000-0001--0000-0001-0000-0123--0001-5051--1612829726628904"
        );
    }
}
