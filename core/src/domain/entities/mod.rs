//! Domain entities persisted in the row store.

pub mod generation_event;
pub mod otp_record;

// Re-export commonly used types
pub use generation_event::{
    GenerationEvent, GEN_ROW_END, GEN_ROW_PREFIX, MAX_GENERATIONS, RATE_WINDOW_SECONDS,
};
pub use otp_record::{OtpRecord, CODE_TTL_SECONDS, CURRENT_ROW, MAX_ATTEMPTS};
