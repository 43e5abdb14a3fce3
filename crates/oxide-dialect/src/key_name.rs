//! Deterministic names for derived database objects (indexes, foreign keys,
//! triggers, generators).

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static NON_KEY_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^a-zA-Z0-9]+").expect("Invalid key name regex"));

/// A sanitized identifier containing only `[A-Za-z0-9_]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyName(String);

impl KeyName {
    /// Joins the parts with `_` and collapses every run of other characters
    /// (underscores included) into a single `_`.
    #[must_use]
    pub fn sanitize<S: AsRef<str>>(parts: &[S]) -> Self {
        let joined = parts
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("_");
        Self(NON_KEY_CHARS.replace_all(&joined, "_").into_owned())
    }

    /// Returns the upper-cased name.
    #[must_use]
    pub fn to_uppercase(&self) -> Self {
        Self(self.0.to_uppercase())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key name and returns the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for KeyName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for KeyName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
