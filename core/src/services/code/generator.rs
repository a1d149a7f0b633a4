//! Cryptographically secure passcode generation

use rand::{rngs::OsRng, Rng};

use crate::domain::value_objects::PlaintextCode;

/// Smallest code ever issued
pub const CODE_MIN: u32 = 100_000;

/// Largest code ever issued
pub const CODE_MAX: u32 = 999_999;

/// Source of new passcodes
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> PlaintextCode;
}

/// Uniform six digit codes drawn from the operating system CSPRNG
///
/// Codes never start with zero, giving 900,000 possible values.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureCodeGenerator;

impl CodeGenerator for SecureCodeGenerator {
    fn generate(&self) -> PlaintextCode {
        let code: u32 = OsRng.gen_range(CODE_MIN..=CODE_MAX);
        PlaintextCode::new(code.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_codes_are_six_digits_in_range() {
        let generator = SecureCodeGenerator;
        for _ in 0..1000 {
            let code = generator.generate();
            assert!(code.is_well_formed());
            let value: u32 = code.expose().parse().unwrap();
            assert!((CODE_MIN..=CODE_MAX).contains(&value));
        }
    }

    #[test]
    fn test_generated_codes_vary() {
        let generator = SecureCodeGenerator;
        let codes: HashSet<String> = (0..100)
            .map(|_| generator.generate().expose().to_string())
            .collect();

        // 100 draws from 900,000 values should almost never collide much
        assert!(codes.len() > 90);
    }
}
