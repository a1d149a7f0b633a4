//! Value objects representing immutable domain concepts.

pub mod channel;
pub mod plaintext_code;
pub mod subject_key;

// Re-export commonly used types
pub use channel::Channel;
pub use plaintext_code::{PlaintextCode, CODE_LENGTH};
pub use subject_key::SubjectKey;
