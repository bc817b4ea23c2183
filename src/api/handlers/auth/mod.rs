//! Admin authentication: credentials, sessions, rate limiting and the route guard.
//!
//! ## Login Rate Limiting
//!
//! `POST /api/admin/login` is limited per client IP (taken from `X-Forwarded-For`
//! or `X-Real-IP`, `"unknown"` otherwise).
//!
//! - **Attempt Limit:** 5 attempts per 15 minutes, successful or not.
//! - **Rejection:** `429 Too Many Requests` with `Retry-After` in seconds.
//!
//! ## Session Secret
//!
//! Tokens are signed with `STOREFRONT_JWT_SECRET`. Every instance must share it;
//! rotating it logs out every admin.

mod error;
pub(crate) mod guard;
pub(crate) mod login;
mod password;
mod rate_limit;
pub(crate) mod session;
mod state;
mod storage;
mod token;
pub(crate) mod types;
mod utils;

pub use error::AuthError;
pub use guard::{ADMIN_HOME_PATH, ADMIN_LOGIN_PATH, limit_api, require_admin};
pub use password::{BCRYPT_COST, hash_password, verify_password};
pub use rate_limit::{
    MAX_WINDOW_SECS, MemoryRateLimitStore, RateLimitPolicy, RateLimitStore, SWEEP_INTERVAL,
    spawn_sweeper,
};
pub use session::SESSION_COOKIE_NAME;
pub use state::{AuthConfig, AuthState, Environment};
pub use storage::{AdminRecord, CredentialStore, PgCredentialStore};
pub use token::{AdminIdentity, SessionSigner};
