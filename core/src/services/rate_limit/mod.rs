//! Sliding window issuance limit and cleanup of its bookkeeping rows.

pub mod limiter;
pub mod sweeper;

pub use limiter::RateLimiter;
pub use sweeper::{EventSweeper, SweepReport};

#[cfg(test)]
mod tests;
