//! One-way digest of passcodes for storage

use constant_time_eq::constant_time_eq;
use sha2::{Digest, Sha256};

/// Hex encoded SHA-256 digest of a passcode
///
/// The same input always yields the same digest, so a candidate is checked
/// by digesting it and comparing. Comparison runs in constant time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeDigest(String);

impl CodeDigest {
    pub fn of(code: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(code.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Wrap a digest read back from storage
    pub fn from_stored(hex_digest: impl Into<String>) -> Self {
        Self(hex_digest.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether `candidate` digests to this value
    pub fn matches(&self, candidate: &str) -> bool {
        let other = Self::of(candidate);
        constant_time_eq(self.0.as_bytes(), other.0.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_deterministic_and_hides_code() {
        let a = CodeDigest::of("482913");
        let b = CodeDigest::of("482913");

        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert!(!a.as_str().contains("482913"));
    }

    #[test]
    fn test_matches() {
        let stored = CodeDigest::from_stored(CodeDigest::of("482913").into_string());

        assert!(stored.matches("482913"));
        assert!(!stored.matches("482914"));
        assert!(!stored.matches(""));
    }
}
