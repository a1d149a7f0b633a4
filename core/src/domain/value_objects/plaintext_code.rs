//! Plaintext passcode, only held in memory.

use std::fmt;

/// Number of digits in a passcode
pub const CODE_LENGTH: usize = 6;

/// A freshly generated code on its way to the notifier
///
/// `Debug` and `Display` are redacted so the code cannot leak through
/// logging by accident. Use [`PlaintextCode::expose`] at the delivery
/// boundary.
#[derive(Clone, PartialEq, Eq)]
pub struct PlaintextCode(String);

impl PlaintextCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Exactly six ASCII digits
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == CODE_LENGTH && self.0.chars().all(|c| c.is_ascii_digit())
    }
}

impl fmt::Debug for PlaintextCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlaintextCode(******)")
    }
}

impl fmt::Display for PlaintextCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("******")
    }
}
