//! Normalized subject identity.

use std::fmt;

use otp_shared::utils::{mask_destination, normalize_phone_number};

use crate::errors::{DomainError, DomainResult};

/// Identity a passcode is bound to, also the row store partition key
///
/// Normalization lowercases and strips every whitespace character, so
/// `" A@X.com "` and `"a@x.com"` share state. Input made only of digits and
/// phone punctuation is reduced to digits and `+`, so `"+61 412-345-678"`
/// and `"+61412345678"` share state too. Normalizing twice is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubjectKey(String);

impl SubjectKey {
    /// Normalize raw caller input into a subject key
    ///
    /// `field` names the input in the error raised when nothing is left
    /// after normalization.
    pub fn parse(raw: &str, field: &'static str) -> DomainResult<Self> {
        let normalized = normalize(raw);
        if normalized.is_empty() {
            return Err(DomainError::missing(field));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Masked form for logs
    pub fn masked(&self) -> String {
        mask_destination(&self.0)
    }
}

impl fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SubjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn normalize(raw: &str) -> String {
    if looks_like_phone(raw) {
        return normalize_phone_number(raw);
    }
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn looks_like_phone(raw: &str) -> bool {
    raw.chars().any(|c| c.is_ascii_digit())
        && raw
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_whitespace() || matches!(c, '+' | '-' | '(' | ')' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::OtpError;

    #[test]
    fn test_normalization() {
        let key = SubjectKey::parse("  Alice.Smith@Example.COM ", "destination").unwrap();
        assert_eq!(key.as_str(), "alice.smith@example.com");

        let phone = SubjectKey::parse("+61 412 345 678", "destination").unwrap();
        assert_eq!(phone.as_str(), "+61412345678");
    }

    #[test]
    fn test_formatted_phone_matches_e164() {
        let formatted = SubjectKey::parse("+61 (412) 345-678", "subject").unwrap();
        let plain = SubjectKey::parse("+61412345678", "subject").unwrap();
        assert_eq!(formatted, plain);

        // Punctuation inside an email is kept
        let email = SubjectKey::parse("first.last-1@x.com", "subject").unwrap();
        assert_eq!(email.as_str(), "first.last-1@x.com");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let once = SubjectKey::parse(" Bob@X.com\t", "subject").unwrap();
        let twice = SubjectKey::parse(once.as_str(), "subject").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_blank_input_is_missing() {
        for raw in ["", "   ", "\t\n"] {
            let err = SubjectKey::parse(raw, "subject").unwrap_err();
            assert!(matches!(
                err,
                DomainError::Otp(OtpError::MissingInput { field: "subject" })
            ));
        }
    }

    #[test]
    fn test_masked_hides_identity() {
        let key = SubjectKey::parse("alice@example.com", "subject").unwrap();
        assert!(!key.masked().contains("alice"));
    }
}
