//! Storage and verification of the outstanding passcode per subject.

pub mod store;

pub use store::{CredentialStore, IssuedCode, VerifyOutcome};

#[cfg(test)]
mod tests;
