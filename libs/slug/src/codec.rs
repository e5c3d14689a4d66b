//! Fixed-width hex group encoding.
//!
//! Integers are rendered as lowercase hex, left-padded with zeros to the
//! full width and split into groups of four digits joined by `-`:
//!
//! ```text
//! 16 bits  000f
//! 32 bits  0000-000f
//! 48 bits  0000-0000-000f
//! 64 bits  0000-0000-0000-000f
//! ```
//!
//! Typed slugs join a type tag and one or more hex group runs with `--`.

use crate::SlugError;

/// Delimiter between typed slug segments.
pub const TYPE_DELIMITER: &str = "--";

/// Delimiter between hex groups.
pub const GROUP_DELIMITER: &str = "-";

/// A group of all-zero digits, used for left padding.
pub const ZERO_GROUP: &str = "0000";

const DIGITS_PER_GROUP: usize = 4;

const KIND: &str = "hex group";

/// Bit width of a hex group encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupWidth {
    Bits16,
    Bits32,
    Bits48,
    Bits64,
}

impl GroupWidth {
    /// Number of bits covered by this width.
    pub const fn bits(self) -> u32 {
        match self {
            GroupWidth::Bits16 => 16,
            GroupWidth::Bits32 => 32,
            GroupWidth::Bits48 => 48,
            GroupWidth::Bits64 => 64,
        }
    }

    /// Number of four digit groups in the rendered form.
    pub const fn groups(self) -> usize {
        (self.bits() / 16) as usize
    }

    /// Number of hex digits in the rendered form.
    pub const fn digits(self) -> usize {
        self.groups() * DIGITS_PER_GROUP
    }

    /// Largest value representable at this width.
    pub const fn max_value(self) -> u64 {
        match self {
            GroupWidth::Bits64 => u64::MAX,
            other => (1u64 << other.bits()) - 1,
        }
    }
}

/// Encodes `n` as hex groups, keeping only the low `width` bits.
///
/// Higher bits are dropped silently: `encode(n, w) == encode(n + 2^w, w)`.
pub fn encode(n: impl Into<u128>, width: GroupWidth) -> String {
    let masked = n.into() & u128::from(width.max_value());
    let digits = format!("{:0w$x}", masked, w = width.digits());

    let mut out = String::with_capacity(width.digits() + width.groups() - 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && i % DIGITS_PER_GROUP == 0 {
            out.push_str(GROUP_DELIMITER);
        }
        out.push(c);
    }
    out
}

/// Decodes hex groups back into an integer.
///
/// Group delimiters are ignored, so `"0001-0000"` and `"00010000"` decode to
/// the same value. Upper case digits are accepted.
pub fn decode(s: &str) -> Result<u64, SlugError> {
    let hex: String = s.split(GROUP_DELIMITER).collect();

    if hex.is_empty() {
        return Err(SlugError::format(KIND, format!("no hex digits in '{s}'")));
    }

    if let Some(c) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(SlugError::format(
            KIND,
            format!("unexpected character '{c}' in '{s}'"),
        ));
    }

    let significant = hex.trim_start_matches('0');
    if significant.len() > GroupWidth::Bits64.digits() {
        return Err(SlugError::range(
            KIND,
            format!("'{s}' does not fit in 64 bits"),
        ));
    }

    if significant.is_empty() {
        return Ok(0);
    }

    u64::from_str_radix(significant, 16).map_err(|e| SlugError::format(KIND, e.to_string()))
}

/// Pads or truncates a hex group id after checking that it has no empty groups.
///
/// `""`, `"0001-"` and `"-0001"` are format errors rather than zero.
pub fn checked_groups(
    s: &str,
    term_count: usize,
    kind: &'static str,
) -> Result<String, SlugError> {
    validate_groups(s, kind)?;
    Ok(normalize_groups(s, term_count))
}

/// Rejects input that is empty or has an empty hex group.
pub fn validate_groups(s: &str, kind: &'static str) -> Result<(), SlugError> {
    if s.split(GROUP_DELIMITER).any(str::is_empty) {
        return Err(SlugError::format(
            kind,
            format!("'{s}' has an empty hex group"),
        ));
    }
    Ok(())
}

/// Pads or truncates hex groups to exactly `term_count` groups.
///
/// Missing groups are prepended as `0000`. Extra groups are dropped from the
/// left so the rightmost `term_count` groups survive.
pub fn normalize_groups(s: &str, term_count: usize) -> String {
    let groups: Vec<&str> = s.split(GROUP_DELIMITER).collect();

    let kept: Vec<&str> = if groups.len() < term_count {
        std::iter::repeat(ZERO_GROUP)
            .take(term_count - groups.len())
            .chain(groups)
            .collect()
    } else {
        groups[groups.len() - term_count..].to_vec()
    };

    kept.join(GROUP_DELIMITER)
}

/// Splits a typed slug into its `--` delimited segments.
pub fn split_typed(s: &str) -> Vec<&str> {
    s.split(TYPE_DELIMITER).collect()
}

/// Joins segments into a typed slug.
pub fn join_typed<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(TYPE_DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_16() {
        assert_eq!(encode(15u64, GroupWidth::Bits16), "000f");
        assert_eq!(encode(1030u64, GroupWidth::Bits16), "0406");
        assert_eq!(encode(40960u64, GroupWidth::Bits16), "a000");
        assert_eq!(encode(65536u64, GroupWidth::Bits16), "0000");
        assert_eq!(encode((0xff5bu64 << 32) + 1024, GroupWidth::Bits16), "0400");
    }

    #[test]
    fn test_encode_32() {
        assert_eq!(encode(15u64, GroupWidth::Bits32), "0000-000f");
        assert_eq!(encode(1030u64, GroupWidth::Bits32), "0000-0406");
        assert_eq!(encode(40960u64, GroupWidth::Bits32), "0000-a000");
        assert_eq!(encode(65536u64, GroupWidth::Bits32), "0001-0000");
        assert_eq!(
            encode((0xff5bu64 << 32) + 1024, GroupWidth::Bits32),
            "0000-0400"
        );
    }

    #[test]
    fn test_encode_48_and_64() {
        assert_eq!(encode(15u64, GroupWidth::Bits48), "0000-0000-000f");
        assert_eq!(encode(15u64, GroupWidth::Bits64), "0000-0000-0000-000f");
        assert_eq!(
            encode(65536u64, GroupWidth::Bits64),
            "0000-0000-0001-0000"
        );
        assert_eq!(
            encode((0xff5bu64 << 32) + 1024, GroupWidth::Bits64),
            "0000-ff5b-0000-0400"
        );
    }

    #[test]
    fn test_encode_masks_above_64_bits() {
        let wide = (1u128 << 64) | 0x2a;
        assert_eq!(encode(wide, GroupWidth::Bits64), "0000-0000-0000-002a");
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode("0000-000f").unwrap(), 15);
        assert_eq!(decode("0001-0000").unwrap(), 0x10000);
        assert_eq!(decode("FFFF").unwrap(), 0xffff);
        assert_eq!(decode("f5051").unwrap(), 0xf5051);
        assert_eq!(decode("0000-0000-0000-0000-0000-0001").unwrap(), 1);
    }

    #[test]
    fn test_decode_rejects_non_hex() {
        assert!(decode("string").unwrap_err().is_format_error());
        assert!(decode("+1").unwrap_err().is_format_error());
        assert!(decode("").unwrap_err().is_format_error());
        assert!(decode("-").unwrap_err().is_format_error());
    }

    #[test]
    fn test_decode_rejects_overflow() {
        let err = decode("1-0000-0000-0000-0000").unwrap_err();
        assert!(err.is_range_error());
    }

    #[test]
    fn test_normalize_groups() {
        assert_eq!(normalize_groups("00ff", 3), "0000-0000-00ff");
        assert_eq!(normalize_groups("ff00-ff00-0000-0000", 2), "0000-0000");
        assert_eq!(normalize_groups("0001-5051", 2), "0001-5051");
        assert_eq!(normalize_groups("f5051", 2), "0000-f5051");
    }

    #[test]
    fn test_checked_groups_rejects_empty_groups() {
        assert_eq!(checked_groups("00ff", 2, KIND).unwrap(), "0000-00ff");
        for input in ["", "-", "0001-", "-0001", "0001--0002"] {
            assert!(
                checked_groups(input, 2, KIND).unwrap_err().is_format_error(),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_split_and_join_typed() {
        assert_eq!(
            split_typed("sl--0000-0001--0000-0002--5051"),
            vec!["sl", "0000-0001", "0000-0002", "5051"]
        );
        assert_eq!(split_typed("s----1234"), vec!["s", "", "1234"]);
        assert_eq!(split_typed("0005"), vec!["0005"]);
        assert_eq!(join_typed(&["d", "0000-0001"]), "d--0000-0001");
    }
}
