//! Maps parsed CLI arguments to an [`Action`].

use crate::cli::actions::{Action, hash_password, server::Args};
use crate::cli::commands::{ARG_DSN, ARG_PORT, auth, password};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    if let Some(sub_m) = matches.subcommand_matches(password::CMD_HASH_PASSWORD) {
        let password = sub_m
            .get_one::<String>(password::ARG_PASSWORD)
            .map(|password| SecretString::from(password.clone()));
        return Ok(Action::HashPassword(hash_password::Args { password }));
    }

    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .context("missing required argument: --dsn")?;

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        jwt_secret: auth_opts.jwt_secret,
        environment: auth_opts.environment,
        frontend_base_url: auth_opts.frontend_base_url,
        session_ttl_seconds: auth_opts.session_ttl_seconds,
        login_policy: auth_opts.login_policy,
        api_rate_limit: auth_opts.api_rate_limit,
        api_policy: auth_opts.api_policy,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::Environment;
    use secrecy::ExposeSecret;

    #[test]
    fn server_action_from_env() {
        temp_env::with_vars(
            [
                ("STOREFRONT_DSN", Some("postgres://storefront@localhost:5432/storefront")),
                ("STOREFRONT_PORT", Some("8443")),
                ("STOREFRONT_ENV", Some("dev")),
                ("STOREFRONT_JWT_SECRET", None),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(vec!["storefront"]);
                let action = handler(&matches);
                assert!(action.is_ok());
                if let Ok(Action::Server(args)) = action {
                    assert_eq!(args.port, 8443);
                    assert_eq!(args.environment, Environment::Development);
                    assert!(args.jwt_secret.is_none());
                } else {
                    panic!("expected server action");
                }
            },
        );
    }

    #[test]
    fn hash_password_action_takes_flag() {
        temp_env::with_vars([("STOREFRONT_ADMIN_PASSWORD", None::<&str>)], || {
            let matches = crate::cli::commands::new().get_matches_from(vec![
                "storefront",
                "hash-password",
                "--password",
                "парола",
            ]);
            match handler(&matches) {
                Ok(Action::HashPassword(args)) => {
                    let password = args.password.map(|p| p.expose_secret().to_string());
                    assert_eq!(password.as_deref(), Some("парола"));
                }
                _ => panic!("expected hash-password action"),
            }
        });
    }
}
