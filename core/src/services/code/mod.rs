//! Passcode generation and digesting.

pub mod generator;
pub mod hasher;

pub use generator::{CodeGenerator, SecureCodeGenerator};
pub use hasher::CodeDigest;
