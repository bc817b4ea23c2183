//! # Storefront (admin back-office authentication)
//!
//! `storefront` guards the back-office of the tools shop. It verifies admin
//! credentials, issues stateless signed sessions and throttles login attempts.
//!
//! ## Sessions
//!
//! A successful login mints an HS256 JWT carrying `{id, email, name}` with a
//! 7-day expiry and stores it in the `admin_session` cookie (`HttpOnly`,
//! `SameSite=Lax`, `Secure` in production). Nothing is persisted server-side:
//! a token is valid iff its signature matches the server secret and it has not
//! expired. There is no revocation list, so a leaked token stays valid until it
//! expires.
//!
//! ## Rate Limiting
//!
//! Login attempts are counted per client IP in a fixed window (5 per 15 minutes).
//! Counters live in process memory behind a `RateLimitStore`
//! and are swept once per minute. Limits are per instance.
//!
//! ## Route Guard
//!
//! Everything under `/admin` except `/admin/login` requires a valid session;
//! callers without one are redirected to the login page. `/api/admin/*` answers
//! `401` instead of redirecting.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
