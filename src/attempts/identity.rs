//! Normalized identity used as the attempt-tracking key.

use std::fmt;

/// A trimmed, lower-cased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(String);

impl Identity {
    /// Normalizes `raw`. Returns `None` when nothing is left after trimming.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_case_and_whitespace() {
        let id = Identity::parse("  A@X.Com \n").unwrap();
        assert_eq!(id.as_str(), "a@x.com");
        assert_eq!(id, Identity::parse("a@x.com").unwrap());
    }

    #[test]
    fn test_blank_is_none() {
        assert!(Identity::parse("   ").is_none());
        assert!(Identity::parse("").is_none());
    }
}
