//! Product categories.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A free-form product category.
///
/// Categories are stored as given and matched exactly, including case and
/// surrounding whitespace. A blank category is replaced with
/// [`Category::DEFAULT`].
///
/// ```
/// use catalog_core::Category;
///
/// assert_eq!(Category::new("  ").as_str(), "general");
/// assert_eq!(Category::new("Kitchen").as_str(), "Kitchen");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Category assigned when none is given.
    pub const DEFAULT: &'static str = "general";

    /// Create a category, defaulting blanks.
    #[must_use]
    pub fn new(s: &str) -> Self {
        if s.trim().is_empty() {
            Self(Self::DEFAULT.to_owned())
        } else {
            Self(s.to_owned())
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Default for Category {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
