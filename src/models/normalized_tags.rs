use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered, de-duplicated sequence of canonical tag tokens.
///
/// Produced by [`TagNormalizer`](crate::classifier::TagNormalizer). Tokens are
/// lowercase, never empty, never a single character, and appear in the order
/// they were first seen across all sources.
///
/// The display form joins tokens with `", "`; [`NormalizedTags::parse`]
/// reverses it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedTags(Vec<String>);

impl NormalizedTags {
    /// Wraps tokens that are already normalized.
    pub(crate) fn from_tokens(tokens: Vec<String>) -> Self {
        Self(tokens)
    }

    /// Reconstructs a sequence from its comma-joined display form.
    ///
    /// # Examples
    ///
    /// ```
    /// use appenergy::NormalizedTags;
    ///
    /// let tags = NormalizedTags::parse("photo, editor, raster");
    /// assert_eq!(tags.as_slice(), ["photo", "editor", "raster"]);
    /// assert_eq!(tags.to_string(), "photo, editor, raster");
    /// ```
    pub fn parse(joined: &str) -> Self {
        Self(
            joined
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        )
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for NormalizedTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}
