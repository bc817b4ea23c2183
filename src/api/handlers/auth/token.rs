//! HS256 session tokens for the admin cookie.
//!
//! Flow Overview:
//! 1) Login succeeds and the admin identity is wrapped in claims with `iat`/`exp`.
//! 2) Claims are signed with the server secret and returned as a compact JWT.
//! 3) Every guarded request verifies signature and expiry; nothing is stored server-side.

use anyhow::{Context, Result, anyhow};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, get_current_timestamp,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

/// Identity claims carried by an admin session.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AdminIdentity {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    #[serde(flatten)]
    identity: AdminIdentity,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Clone)]
pub struct SessionToken {
    pub token: String,
    pub expires_at_unix: u64,
}

pub struct SessionSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
}

impl SessionSigner {
    /// Build a signer from the server secret.
    ///
    /// # Errors
    /// Returns an error if the secret is empty or the TTL is zero.
    pub fn new(secret: &SecretString, ttl_seconds: u64) -> Result<Self> {
        let secret = secret.expose_secret().as_bytes();
        if secret.is_empty() {
            return Err(anyhow!("session signing secret must not be empty"));
        }
        if ttl_seconds == 0 {
            return Err(anyhow!("session ttl must be positive"));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_seconds,
        })
    }

    /// Issue a session token valid for the configured TTL.
    ///
    /// # Errors
    /// Returns an error if signing fails.
    pub fn issue(&self, identity: &AdminIdentity) -> Result<SessionToken> {
        self.issue_at(identity, get_current_timestamp())
    }

    /// Issue a session token as if the current time were `now_unix`.
    ///
    /// # Errors
    /// Returns an error if signing fails.
    pub fn issue_at(&self, identity: &AdminIdentity, now_unix: u64) -> Result<SessionToken> {
        let exp = now_unix.saturating_add(self.ttl_seconds);
        let claims = SessionClaims {
            identity: identity.clone(),
            iat: now_unix,
            exp,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("failed to sign session token")?;

        Ok(SessionToken {
            token,
            expires_at_unix: exp,
        })
    }

    /// Verify signature and expiry, returning the identity claims.
    ///
    /// Any failure (bad signature, malformed token, expired) yields `None`.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<AdminIdentity> {
        match decode::<SessionClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims.identity),
            Err(err) => {
                debug!("Session token rejected: {err}");
                None
            }
        }
    }
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner")
            .field("keys", &"***")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}
