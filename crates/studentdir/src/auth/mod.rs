//! Authentication module.
//!
//! Provides:
//! - HS256 session token issue/verify
//! - Blacklist-based token revocation with expiry sweeping
//! - Advisory bearer-token middleware and per-route extractors

mod claims;
mod config;
mod error;
mod middleware;
mod revocation;
mod token;

pub use claims::{Claims, Role};
pub use config::{AuthConfig, ConfigValidationError};
pub use error::AuthError;
pub use middleware::{AuthState, CurrentUser, MaybeUser, RequireAdmin, auth_middleware};
pub use revocation::RevocationRegistry;
pub use token::{TokenCodec, TokenError};
