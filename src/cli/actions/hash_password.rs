use crate::api::handlers::auth::hash_password;
use anyhow::{Context, Result, anyhow};
use secrecy::{ExposeSecret, SecretString};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug)]
pub struct Args {
    pub password: Option<SecretString>,
}

/// Print a bcrypt hash of the password given on the command line or stdin.
/// # Errors
/// Returns an error if no password is provided or hashing fails.
pub async fn execute(args: Args) -> Result<()> {
    let password = match args.password {
        Some(password) => password,
        None => read_stdin_password().await?,
    };

    let hash = hash(password).await?;
    println!("{hash}");

    Ok(())
}

async fn hash(password: SecretString) -> Result<String> {
    if password.expose_secret().is_empty() {
        return Err(anyhow!("Password must not be empty"));
    }
    tokio::task::spawn_blocking(move || hash_password(password.expose_secret()))
        .await
        .context("Hashing task failed")?
}

async fn read_stdin_password() -> Result<SecretString> {
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("Failed to read password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    Ok(SecretString::from(password))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::{BCRYPT_COST, verify_password};

    #[tokio::test]
    async fn hash_verifies_against_password() -> Result<()> {
        let hashed = hash(SecretString::from("Секретна-парола-1".to_string())).await?;
        assert!(hashed.starts_with(&format!("$2b${BCRYPT_COST}$")));
        assert!(verify_password("Секретна-парола-1", &hashed));
        Ok(())
    }

    #[tokio::test]
    async fn empty_password_is_rejected() {
        let result = hash(SecretString::from(String::new())).await;
        assert!(result.is_err());
    }
}
