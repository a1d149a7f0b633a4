//! Dispatch service: the public entry point for issuing, verifying and
//! clearing passcodes.

pub mod config;
pub mod policy;
pub mod service;
pub mod traits;
pub mod types;

pub use config::OtpServiceConfig;
pub use policy::{AccessPolicy, NoBypassPolicy, StaticPolicy};
pub use service::OtpService;
pub use traits::Notifier;
pub use types::{CodeDelivery, IssueReceipt};
