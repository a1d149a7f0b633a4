//! Business services containing passcode logic.

pub mod clock;
pub mod code;
pub mod credential;
pub mod otp;
pub mod rate_limit;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use code::{CodeDigest, CodeGenerator, SecureCodeGenerator};
pub use credential::{CredentialStore, IssuedCode, VerifyOutcome};
pub use otp::{
    AccessPolicy, CodeDelivery, IssueReceipt, NoBypassPolicy, Notifier, OtpService,
    OtpServiceConfig, StaticPolicy,
};
pub use rate_limit::{EventSweeper, RateLimiter, SweepReport};
