//! Authentication: email/password accounts, JWT bearer sessions and
//! password reset by email.

pub mod extractor;
pub mod handlers;
mod rate_limit;
mod service;

pub use extractor::{bearer_token, AdminUser, AuthenticatedUser};
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use service::{
    normalize_email, validate_email, validate_name, validate_password, AuthService, Claims,
    LoginSession,
};
