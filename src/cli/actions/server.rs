use crate::api::{
    self,
    handlers::auth::{AuthConfig, Environment, RateLimitPolicy},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub jwt_secret: Option<SecretString>,
    pub environment: Environment,
    pub frontend_base_url: String,
    pub session_ttl_seconds: u64,
    pub login_policy: RateLimitPolicy,
    pub api_rate_limit: bool,
    pub api_policy: RateLimitPolicy,
}

impl Args {
    fn auth_config(&self) -> AuthConfig {
        AuthConfig::new(self.environment, self.frontend_base_url.clone())
            .with_session_ttl_seconds(self.session_ttl_seconds)
            .with_login_policy(self.login_policy)
            .with_api_policy(self.api_policy)
            .with_api_rate_limit(self.api_rate_limit)
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the signing secret is missing in production, the
/// database is unreachable, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config = args.auth_config();

    let secret = auth_config
        .resolve_secret(args.jwt_secret)
        .context("Refusing to start without a session secret")?;

    debug!("Auth config: {:?}", auth_config);
    info!(
        environment = ?auth_config.environment(),
        api_rate_limit = auth_config.api_rate_limit_enabled(),
        "Starting storefront admin API"
    );

    api::new(args.port, args.dsn, auth_config, secret).await
}
