//! HTTP boundary for the passcode service
//!
//! Thin actix-web adapter over `otp_core::OtpService`. Handlers translate
//! JSON bodies into service calls and domain errors into `ErrorResponse`s.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod telemetry;

pub use app::{create_app, AppState};
