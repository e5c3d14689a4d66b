//! Macros for the conversion boilerplate shared by identifier types.
//!
//! Every identifier type provides:
//! - an inherent `parse(&str)` and, for integer-backed kinds, `from_int(i128)`
//! - a `KIND` constant used in error messages
//!
//! The macros below derive `FromStr`, `TryFrom` and serde impls from those.

/// Implements `FromStr`, `TryFrom<&str>`, `TryFrom<String>` and a
/// `Serialize` that writes the canonical slug text.
macro_rules! impl_slug_text {
    ($name:ident) => {
        impl std::str::FromStr for $name {
            type Err = $crate::SlugError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = $crate::SlugError;

            fn try_from(s: &str) -> Result<Self, Self::Error> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::SlugError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::parse(&s)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.collect_str(self)
            }
        }
    };
}

/// Implements range-checked `TryFrom` for the listed integer types by
/// widening to `i128` and calling `from_int`.
macro_rules! impl_slug_from_int {
    ($name:ident; $($int:ty),+ $(,)?) => {
        $(
            impl TryFrom<$int> for $name {
                type Error = $crate::SlugError;

                fn try_from(value: $int) -> Result<Self, Self::Error> {
                    Self::from_int(i128::from(value))
                }
            }
        )+
    };
}

/// Implements `Deserialize` from the canonical slug text only.
macro_rules! impl_deserialize_str {
    ($name:ident) => {
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::parse(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Implements `Deserialize` from either an integer value or slug text.
///
/// Any other input kind (bytes, floats, booleans, sequences, maps, unit) is
/// rejected with `SlugError::UnsupportedInput`; bytes are never reinterpreted
/// as text.
macro_rules! impl_deserialize_int_or_str {
    ($name:ident) => {
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                fn unsupported<E: serde::de::Error>(found: &'static str) -> E {
                    E::custom($crate::SlugError::UnsupportedInput {
                        kind: $name::KIND,
                        found,
                    })
                }

                struct SlugVisitor;

                impl<'de> serde::de::Visitor<'de> for SlugVisitor {
                    type Value = $name;

                    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                        write!(f, "a {} as an integer or a slug string", $name::KIND)
                    }

                    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<$name, E> {
                        $name::from_int(i128::from(v)).map_err(E::custom)
                    }

                    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<$name, E> {
                        $name::from_int(i128::from(v)).map_err(E::custom)
                    }

                    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<$name, E> {
                        $name::parse(v).map_err(E::custom)
                    }

                    fn visit_bytes<E: serde::de::Error>(self, _v: &[u8]) -> Result<$name, E> {
                        Err(unsupported("bytes"))
                    }

                    fn visit_f64<E: serde::de::Error>(self, _v: f64) -> Result<$name, E> {
                        Err(unsupported("float"))
                    }

                    fn visit_bool<E: serde::de::Error>(self, _v: bool) -> Result<$name, E> {
                        Err(unsupported("boolean"))
                    }

                    fn visit_unit<E: serde::de::Error>(self) -> Result<$name, E> {
                        Err(unsupported("null"))
                    }

                    fn visit_seq<A: serde::de::SeqAccess<'de>>(
                        self,
                        _seq: A,
                    ) -> Result<$name, A::Error> {
                        Err(unsupported("sequence"))
                    }

                    fn visit_map<A: serde::de::MapAccess<'de>>(
                        self,
                        _map: A,
                    ) -> Result<$name, A::Error> {
                        Err(unsupported("map"))
                    }
                }

                deserializer.deserialize_any(SlugVisitor)
            }
        }
    };
}

pub(crate) use impl_deserialize_int_or_str;
pub(crate) use impl_deserialize_str;
pub(crate) use impl_slug_from_int;
pub(crate) use impl_slug_text;
