//! The capability set shared by every identifier kind.

use std::fmt;

use crate::codec::{decode, join_typed, split_typed};
use crate::SlugError;

/// Type tags whose slugs carry exactly one integer id.
const SINGLE_ID_TAGS: [&str; 4] = ["ps", "pa", "pl", "d"];

/// Common operations on a canonical slug.
///
/// Implementors only need `Display` to render the canonical text; the
/// default methods work on that text.
pub trait Slug: fmt::Display {
    /// Returns the canonical slug.
    fn text(&self) -> String {
        self.to_string()
    }

    /// Returns the slug without its leading type tag.
    fn formatted_id(&self) -> String {
        let text = self.text();
        let parts = split_typed(&text);
        join_typed(&parts[1..])
    }

    /// Returns the integer id of a single-id slug (parents and devices).
    fn single_id(&self) -> Result<u64, SlugError> {
        let text = self.text();
        let parts = split_typed(&text);

        let [tag, id] = parts.as_slice() else {
            return Err(SlugError::invalid_operation(format!(
                "'{text}' has more than one id term"
            )));
        };

        if !SINGLE_ID_TAGS.contains(tag) {
            return Err(SlugError::invalid_operation(format!(
                "only parents and devices have single ids, got '{tag}'"
            )));
        }

        decode(id)
    }
}
