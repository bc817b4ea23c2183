//! Auth configuration and shared state.

use anyhow::{Result, anyhow};
use secrecy::SecretString;
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

use super::{
    rate_limit::{RateLimitPolicy, RateLimitStore, RateLimiter},
    storage::CredentialStore,
    token::SessionSigner,
};

const DEFAULT_SESSION_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;
// Only ever used outside production, where a missing secret is tolerated.
const DEVELOPMENT_SECRET: &str = "storefront-development-secret";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
}

impl Environment {
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            other => Err(format!("unknown environment: {other}")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    environment: Environment,
    frontend_base_url: String,
    session_ttl_seconds: u64,
    login_policy: RateLimitPolicy,
    api_policy: RateLimitPolicy,
    api_rate_limit_enabled: bool,
}

impl AuthConfig {
    #[must_use]
    pub fn new(environment: Environment, frontend_base_url: String) -> Self {
        Self {
            environment,
            frontend_base_url,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            login_policy: RateLimitPolicy::login(),
            api_policy: RateLimitPolicy::api(),
            api_rate_limit_enabled: false,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: u64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_login_policy(mut self, policy: RateLimitPolicy) -> Self {
        self.login_policy = policy;
        self
    }

    #[must_use]
    pub fn with_api_policy(mut self, policy: RateLimitPolicy) -> Self {
        self.api_policy = policy;
        self
    }

    #[must_use]
    pub fn with_api_rate_limit(mut self, enabled: bool) -> Self {
        self.api_rate_limit_enabled = enabled;
        self
    }

    #[must_use]
    pub fn environment(&self) -> Environment {
        self.environment
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> u64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn login_policy(&self) -> RateLimitPolicy {
        self.login_policy
    }

    #[must_use]
    pub fn api_policy(&self) -> RateLimitPolicy {
        self.api_policy
    }

    #[must_use]
    pub fn api_rate_limit_enabled(&self) -> bool {
        self.api_rate_limit_enabled
    }

    pub(crate) fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    pub(super) fn session_cookie_secure(&self) -> bool {
        self.environment.is_production()
    }

    /// Resolve the session signing secret.
    ///
    /// # Errors
    /// Returns an error in production when no secret is configured.
    pub fn resolve_secret(&self, secret: Option<SecretString>) -> Result<SecretString> {
        match secret {
            Some(secret) => Ok(secret),
            None if self.environment.is_production() => Err(anyhow!(
                "STOREFRONT_JWT_SECRET must be set in production"
            )),
            None => {
                warn!("No session secret configured; using the development secret");
                Ok(SecretString::from(DEVELOPMENT_SECRET.to_string()))
            }
        }
    }
}

pub struct AuthState {
    config: AuthConfig,
    signer: SessionSigner,
    credentials: Arc<dyn CredentialStore>,
    login_limiter: RateLimiter,
    api_limiter: RateLimiter,
}

impl AuthState {
    /// The signer takes its TTL from `config`, so the cookie `Max-Age` and the
    /// token `exp` always describe the same lifetime.
    ///
    /// # Errors
    /// Returns an error if the secret is empty or the session TTL is zero.
    pub fn new(
        config: AuthConfig,
        secret: &SecretString,
        credentials: Arc<dyn CredentialStore>,
        rate_limit_store: Arc<dyn RateLimitStore>,
    ) -> Result<Self> {
        let signer = SessionSigner::new(secret, config.session_ttl_seconds())?;
        let login_limiter = RateLimiter::new(rate_limit_store.clone(), config.login_policy(), "login");
        let api_limiter = RateLimiter::new(rate_limit_store, config.api_policy(), "api");
        Ok(Self {
            config,
            signer,
            credentials,
            login_limiter,
            api_limiter,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn signer(&self) -> &SessionSigner {
        &self.signer
    }

    pub(super) fn credentials(&self) -> &dyn CredentialStore {
        self.credentials.as_ref()
    }

    pub(super) fn login_limiter(&self) -> &RateLimiter {
        &self.login_limiter
    }

    pub(super) fn api_limiter(&self) -> &RateLimiter {
        &self.api_limiter
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("config", &self.config)
            .field("signer", &self.signer)
            .field("login_limiter", &self.login_limiter)
            .field("api_limiter", &self.api_limiter)
            .finish_non_exhaustive()
    }
}
