use crate::api::handlers::auth::{Environment, MAX_WINDOW_SECS, RateLimitPolicy};
use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;
use std::time::Duration;

pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_ENVIRONMENT: &str = "environment";
pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_LOGIN_RATE_LIMIT_MAX: &str = "login-rate-limit-max";
pub const ARG_LOGIN_RATE_LIMIT_WINDOW_SECONDS: &str = "login-rate-limit-window-seconds";
pub const ARG_API_RATE_LIMIT: &str = "api-rate-limit";
pub const ARG_API_RATE_LIMIT_MAX: &str = "api-rate-limit-max";
pub const ARG_API_RATE_LIMIT_WINDOW_SECONDS: &str = "api-rate-limit-window-seconds";

#[derive(Debug)]
pub struct Options {
    pub jwt_secret: Option<SecretString>,
    pub environment: Environment,
    pub frontend_base_url: String,
    pub session_ttl_seconds: u64,
    pub login_policy: RateLimitPolicy,
    pub api_rate_limit: bool,
    pub api_policy: RateLimitPolicy,
}

impl Options {
    /// # Errors
    /// Returns an error if an argument with a default is somehow absent.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let jwt_secret = matches
            .get_one::<String>(ARG_JWT_SECRET)
            .filter(|secret| !secret.is_empty())
            .map(|secret| SecretString::from(secret.clone()));
        let environment = matches
            .get_one::<Environment>(ARG_ENVIRONMENT)
            .copied()
            .context("missing required argument: --environment")?;
        let frontend_base_url = matches
            .get_one::<String>(ARG_FRONTEND_BASE_URL)
            .cloned()
            .context("missing required argument: --frontend-base-url")?;
        let session_ttl_seconds = u64_arg(matches, ARG_SESSION_TTL_SECONDS)?;

        let login_policy = RateLimitPolicy::new(
            Duration::from_secs(u64_arg(matches, ARG_LOGIN_RATE_LIMIT_WINDOW_SECONDS)?),
            u32_arg(matches, ARG_LOGIN_RATE_LIMIT_MAX)?,
        );
        let api_policy = RateLimitPolicy::new(
            Duration::from_secs(u64_arg(matches, ARG_API_RATE_LIMIT_WINDOW_SECONDS)?),
            u32_arg(matches, ARG_API_RATE_LIMIT_MAX)?,
        );

        Ok(Self {
            jwt_secret,
            environment,
            frontend_base_url,
            session_ttl_seconds,
            login_policy,
            api_rate_limit: matches.get_flag(ARG_API_RATE_LIMIT),
            api_policy,
        })
    }
}

fn u64_arg(matches: &ArgMatches, name: &str) -> Result<u64> {
    matches
        .get_one::<u64>(name)
        .copied()
        .with_context(|| format!("missing required argument: --{name}"))
}

fn u32_arg(matches: &ArgMatches, name: &str) -> Result<u32> {
    matches
        .get_one::<u32>(name)
        .copied()
        .with_context(|| format!("missing required argument: --{name}"))
}

pub fn with_args(command: Command) -> Command {
    let command = with_session_args(command);
    with_rate_limit_args(command)
}

fn with_session_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("Secret used to sign admin session tokens (required in production)")
                .env("STOREFRONT_JWT_SECRET")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_ENVIRONMENT)
                .long(ARG_ENVIRONMENT)
                .help("Deployment environment: production or development")
                .env("STOREFRONT_ENV")
                .default_value("production")
                .value_parser(|value: &str| value.parse::<Environment>()),
        )
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Storefront base URL, allowed as CORS origin")
                .env("STOREFRONT_FRONTEND_BASE_URL")
                .default_value("http://localhost:3000"),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Admin session lifetime in seconds")
                .env("STOREFRONT_SESSION_TTL_SECONDS")
                .default_value("604800")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}

fn with_rate_limit_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_LOGIN_RATE_LIMIT_MAX)
                .long(ARG_LOGIN_RATE_LIMIT_MAX)
                .help("Login attempts allowed per client within the window")
                .env("STOREFRONT_LOGIN_RATE_LIMIT_MAX")
                .default_value("5")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new(ARG_LOGIN_RATE_LIMIT_WINDOW_SECONDS)
                .long(ARG_LOGIN_RATE_LIMIT_WINDOW_SECONDS)
                .help("Login rate limit window in seconds")
                .env("STOREFRONT_LOGIN_RATE_LIMIT_WINDOW_SECONDS")
                .default_value("900")
                .value_parser(clap::value_parser!(u64).range(1..=MAX_WINDOW_SECS)),
        )
        .arg(
            Arg::new(ARG_API_RATE_LIMIT)
                .long(ARG_API_RATE_LIMIT)
                .help("Apply the generic rate limit to /api requests")
                .env("STOREFRONT_API_RATE_LIMIT")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_API_RATE_LIMIT_MAX)
                .long(ARG_API_RATE_LIMIT_MAX)
                .help("API requests allowed per client within the window")
                .env("STOREFRONT_API_RATE_LIMIT_MAX")
                .default_value("60")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new(ARG_API_RATE_LIMIT_WINDOW_SECONDS)
                .long(ARG_API_RATE_LIMIT_WINDOW_SECONDS)
                .help("API rate limit window in seconds")
                .env("STOREFRONT_API_RATE_LIMIT_WINDOW_SECONDS")
                .default_value("60")
                .value_parser(clap::value_parser!(u64).range(1..=MAX_WINDOW_SECS)),
        )
}
