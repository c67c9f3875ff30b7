//! A cheaply cloneable string shared between parsed messages.

use std::fmt::Display;

#[derive(Debug, Clone, PartialOrd, Ord, PartialEq, Eq, Default, Hash)]
#[repr(transparent)]
/// A thread-safe reference-counted string type.
///
/// Parsed header values are stored as `ArcStr` so that a completed message can
/// be handed across threads and cloned without copying its text.
pub struct ArcStr(std::sync::Arc<str>);

impl ArcStr {
    /// Returns the string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a new `ArcStr` with ASCII letters lowercased.
    pub fn to_ascii_lowercase(&self) -> Self {
        Self::from(self.0.to_ascii_lowercase())
    }
}

impl std::ops::Deref for ArcStr {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for ArcStr {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for ArcStr {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ArcStr {
    fn eq(&self, other: &str) -> bool {
        &self[..] == other
    }
}

impl PartialEq<&str> for ArcStr {
    fn eq(&self, other: &&str) -> bool {
        &self[..] == *other
    }
}

impl Display for ArcStr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl From<&str> for ArcStr {
    fn from(s: &str) -> Self {
        Self(std::sync::Arc::from(s))
    }
}

impl From<String> for ArcStr {
    fn from(s: String) -> Self {
        Self(std::sync::Arc::from(s))
    }
}

impl From<std::borrow::Cow<'_, str>> for ArcStr {
    fn from(s: std::borrow::Cow<'_, str>) -> Self {
        Self(std::sync::Arc::from(s.as_ref()))
    }
}
