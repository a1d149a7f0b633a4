//! Passcode route handlers
//!
//! - `send` issues a code and hands it to the notifier
//! - `verify` checks a submitted code
//! - `clear` invalidates any outstanding code

pub mod clear;
pub mod send;
pub mod verify;
