pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
pub mod rate_limit;

pub use error::{AppError, ErrorBody, ErrorCategory, ErrorCode};
pub use rate_limit::{FixedWindowLimiter, RateDecision};
